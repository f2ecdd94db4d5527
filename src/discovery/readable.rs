use scraper::{ElementRef, Html, Node};

enum Piece {
    Text(String),
    Break,
}

/// Readable body text of an HTML page, one block per line.
///
/// Scripts, styles, hidden elements and page chrome (navigation, headers,
/// footers, sidebars, forms) are dropped.
pub fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces = Vec::new();
    collect_pieces(&document.root_element(), &mut pieces);

    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => current.push(text),
            Piece::Break => flush(&mut current, &mut lines),
        }
    }
    flush(&mut current, &mut lines);

    lines.join("\n")
}

fn flush(current: &mut Vec<String>, lines: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let merged = current.join(" ").trim().to_string();
    if !merged.is_empty() {
        lines.push(merged);
    }
    current.clear();
}

fn collect_pieces(element: &ElementRef, pieces: &mut Vec<Piece>) {
    if is_hidden(element) || should_skip_element(element) {
        return;
    }

    let tag_name = element.value().name().to_lowercase();
    if tag_name == "br" {
        pieces.push(Piece::Break);
        return;
    }

    let block = is_block_element(&tag_name);
    if block {
        pieces.push(Piece::Break);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    pieces.push(Piece::Text(normalized));
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_pieces(&child_ref, pieces);
                }
            }
            _ => {}
        }
    }

    if block {
        pieces.push(Piece::Break);
    }
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element.value().attr("aria-hidden") == Some("true")
        || element
            .value()
            .attr("style")
            .map(|s| {
                let s = s.replace(' ', "");
                s.contains("display:none") || s.contains("visibility:hidden")
            })
            .unwrap_or(false)
}

fn should_skip_element(element: &ElementRef) -> bool {
    let tag_name = element.value().name().to_lowercase();
    matches!(
        tag_name.as_str(),
        "script"
            | "style"
            | "noscript"
            | "iframe"
            | "canvas"
            | "svg"
            | "template"
            | "head"
            | "nav"
            | "header"
            | "footer"
            | "aside"
            | "form"
    )
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "li"
            | "main"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "tr"
            | "ul"
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_text_keeps_recipe_blocks() {
        let html = r#"
            <html>
            <head><title>Best Lasagna</title><style>body { color: red; }</style></head>
            <body>
                <nav><a href="/">Home</a> <a href="/recipes">Recipes</a></nav>
                <header>Subscribe to our newsletter!</header>
                <article>
                    <h1>Best   Lasagna</h1>
                    <ul>
                        <li>2 cloves <b>garlic</b></li>
                        <li>12 lasagna sheets</li>
                    </ul>
                    <p>Bake at 180C.<br>Serve hot.</p>
                </article>
                <script>trackVisitor();</script>
                <div style="display: none">hidden ad</div>
                <aside>Related recipes</aside>
                <footer>Copyright</footer>
            </body>
            </html>
        "#;

        let text = readable_text(html);
        assert_eq!(
            text,
            "Best Lasagna\n2 cloves garlic\n12 lasagna sheets\nBake at 180C.\nServe hot."
        );
    }

    #[test]
    fn test_readable_text_decodes_entities() {
        let text = readable_text("<p>Salt &amp; pepper</p>");
        assert_eq!(text, "Salt & pepper");
    }

    #[test]
    fn test_readable_text_of_empty_page() {
        assert_eq!(readable_text("<html><body><script>x()</script></body></html>"), "");
    }
}
