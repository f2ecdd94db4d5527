//! Parser for the fixed recipe layout the normalizer prompt asks for:
//!
//! ```text
//! Title: Lasagna
//! Source: None
//! Ingredients:
//! - Sauce:
//!   - 2 cloves garlic
//! Instructions:
//! 1. Make the sauce.
//! ```
//!
//! Models drift from the layout in small ways (bold labels, `*` bullets,
//! `1)` numbering, blank lines), so matching is lenient on decoration and
//! strict on structure.

use url::Url;

use crate::error::{ChefError, Result};
use crate::model::{IngredientCategory, NewRecipe};

/// Category used for ingredients listed before any category line
pub const DEFAULT_CATEGORY: &str = "Ingredients";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Ingredients,
    Instructions,
    Trailer,
}

/// Parse a model reply into an unvalidated recipe.
///
/// Fails with [`ChefError::MalformedResponse`] when the title, every
/// non-empty ingredient category, or every instruction step is missing.
pub fn parse_reply(reply: &str) -> Result<NewRecipe> {
    let mut title: Option<String> = None;
    let mut source: Option<String> = None;
    let mut ingredient_lines: Vec<(usize, String)> = Vec::new();
    let mut instructions: Vec<String> = Vec::new();
    let mut section = Section::Preamble;

    for line in reply.lines() {
        let body = line.trim();
        if body.is_empty() || body.starts_with("```") {
            continue;
        }
        let indent = indentation(line);

        if !has_list_marker(body) {
            if let Some((key, value)) = labelled(body) {
                match key.as_str() {
                    "title" if title.is_none() && !value.is_empty() => {
                        title = Some(value);
                        continue;
                    }
                    "source" if section == Section::Preamble => {
                        source = parse_source(&value);
                        continue;
                    }
                    "ingredients" if value.is_empty() => {
                        section = Section::Ingredients;
                        continue;
                    }
                    "instructions" | "directions" | "method" | "steps" if value.is_empty() => {
                        section = Section::Instructions;
                        continue;
                    }
                    _ => {}
                }
            }
        }

        match section {
            Section::Ingredients => {
                let item = strip_decoration(strip_bullet(body));
                if !item.is_empty() {
                    ingredient_lines.push((indent, item.to_string()));
                }
            }
            Section::Instructions => match strip_step_marker(body) {
                Some(step) => {
                    if !step.is_empty() {
                        instructions.push(step.to_string());
                    }
                }
                None if indent > 0 && !instructions.is_empty() => {
                    if let Some(last) = instructions.last_mut() {
                        last.push(' ');
                        last.push_str(body);
                    }
                }
                // An unnumbered label such as "Notes:" ends the step list
                None if body.ends_with(':') => section = Section::Trailer,
                None => instructions.push(strip_decoration(body).to_string()),
            },
            Section::Preamble | Section::Trailer => {}
        }
    }

    let title = title.ok_or_else(|| missing("title"))?;

    let mut categories = group_ingredients(&ingredient_lines);
    categories.retain(|c| !c.items.is_empty() && !c.name.is_empty());
    if categories.is_empty() {
        return Err(missing("ingredients"));
    }
    if instructions.is_empty() {
        return Err(missing("instructions"));
    }

    Ok(NewRecipe {
        title,
        source_url: source,
        ingredients: categories,
        instructions,
    })
}

/// Group `(indent, text)` ingredient lines into categories.
///
/// An outermost line followed by deeper lines names a category and every
/// deeper line is an item. Without nesting, a trailing `:` marks a category.
/// Outermost items after a nested category go to [`DEFAULT_CATEGORY`].
fn group_ingredients(lines: &[(usize, String)]) -> Vec<IngredientCategory> {
    let base = lines.iter().map(|(indent, _)| *indent).min().unwrap_or(0);
    let mut categories: Vec<IngredientCategory> = Vec::new();
    let mut current: Option<usize> = None;
    let mut current_nested = false;

    for (i, (indent, text)) in lines.iter().enumerate() {
        if *indent > base {
            let index = match current {
                Some(index) => index,
                None => default_category(&mut categories),
            };
            categories[index].items.push(text.clone());
            continue;
        }

        let nests = lines
            .get(i + 1)
            .map_or(false, |(next, _)| *next > base);
        let name = text.strip_suffix(':').map(strip_decoration);
        match name {
            _ if nests => {
                let name = name.unwrap_or(text.as_str());
                categories.push(IngredientCategory::new(name, Vec::new()));
                current = Some(categories.len() - 1);
                current_nested = true;
            }
            Some(name) => {
                categories.push(IngredientCategory::new(name, Vec::new()));
                current = Some(categories.len() - 1);
                current_nested = false;
            }
            None => {
                let index = match current {
                    Some(index) if !current_nested => index,
                    _ => {
                        let index = default_category(&mut categories);
                        current = Some(index);
                        current_nested = false;
                        index
                    }
                };
                categories[index].items.push(text.clone());
            }
        }
    }
    categories
}

/// Index of the default category, appending it if absent
fn default_category(categories: &mut Vec<IngredientCategory>) -> usize {
    match categories.iter().position(|c| c.name == DEFAULT_CATEGORY) {
        Some(index) => index,
        None => {
            categories.push(IngredientCategory::new(DEFAULT_CATEGORY, Vec::new()));
            categories.len() - 1
        }
    }
}

fn missing(section: &str) -> ChefError {
    ChefError::MalformedResponse(format!("reply has no {section} section"))
}

/// Leading whitespace width, counting a tab as four spaces
fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Split `**Title:** Lasagna` or `## Ingredients:` into a lowercase key and value
fn labelled(body: &str) -> Option<(String, String)> {
    let undecorated = body.trim_start_matches('#').replace("**", "");
    let (key, value) = undecorated.split_once(':')?;
    let key = key.trim().to_lowercase();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, strip_decoration(value).to_string()))
}

fn has_list_marker(body: &str) -> bool {
    strip_bullet(body).len() != body.len() || strip_step_marker(body).is_some()
}

fn strip_bullet(body: &str) -> &str {
    for marker in ['-', '*', '•', '+'] {
        if let Some(rest) = body.strip_prefix(marker) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    body
}

fn strip_decoration(text: &str) -> &str {
    text.trim().trim_matches('*').trim_matches('_').trim()
}

/// `1. Boil`, `2) Drain`, `Step 3: Serve` or a bulleted step
fn strip_step_marker(body: &str) -> Option<&str> {
    let lowered = body.to_ascii_lowercase();
    let numbered = if lowered.starts_with("step ") {
        &body[5..]
    } else {
        body
    };

    let digits = numbered.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &numbered[digits..];
        for separator in ['.', ')', ':'] {
            if let Some(step) = rest.strip_prefix(separator) {
                return Some(strip_decoration(step));
            }
        }
    }

    let unbulleted = strip_bullet(body);
    if unbulleted.len() != body.len() {
        return Some(strip_decoration(unbulleted));
    }
    None
}

fn parse_source(value: &str) -> Option<String> {
    let value = value.trim().trim_matches(|c| c == '<' || c == '>');
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(value.to_string()),
        _ => None,
    }
}
