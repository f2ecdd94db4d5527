/// The instruction block sent to the language model for every normalization.
///
/// Loaded from `prompt.txt` at compile time. `{source}` and `{text}` are
/// substituted by [`build_normalizer_prompt`].
pub const NORMALIZER_PROMPT: &str = include_str!("prompt.txt");

/// Fill the template with the extracted text and optional source URL.
pub fn build_normalizer_prompt(text: &str, source_url: Option<&str>) -> String {
    let source = source_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("None");

    // Text goes in last so braces inside the recipe are never treated as placeholders
    NORMALIZER_PROMPT
        .replace("{source}", source)
        .replace("{text}", text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(NORMALIZER_PROMPT.contains("Title:"));
        assert!(NORMALIZER_PROMPT.contains("Ingredients:"));
        assert!(NORMALIZER_PROMPT.contains("Instructions:"));
        assert!(NORMALIZER_PROMPT.contains("{text}"));
        assert!(NORMALIZER_PROMPT.contains("{source}"));
    }

    #[test]
    fn test_build_prompt_embeds_text_and_source() {
        let prompt = build_normalizer_prompt(
            "  2 eggs, fry them  ",
            Some("https://youtu.be/abc123"),
        );
        assert!(prompt.contains("Source: https://youtu.be/abc123"));
        assert!(prompt.ends_with("2 eggs, fry them\n"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn test_build_prompt_without_source() {
        let prompt = build_normalizer_prompt("toast", Some("   "));
        assert!(prompt.contains("Source: None"));
    }

    #[test]
    fn test_braces_in_text_are_kept() {
        let prompt = build_normalizer_prompt("use {source} sauce", None);
        assert!(prompt.contains("use {source} sauce"));
    }
}
