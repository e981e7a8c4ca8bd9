//! Selector text normalization and grouping-aware comma splitting.
//!
//! Normalization collapses whitespace runs outside quoted strings, strips
//! spacing around `+`/`-` inside pseudo-class argument lists, and trims the
//! ends. Splitting only honors top-level commas: commas inside `[...]`,
//! `(...)`, or quoted strings never split an expression.

use core::mem;

use crate::error::{Error, Result};

/// Collapse insignificant whitespace in raw selector text.
pub(crate) fn normalize(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut paren_depth = 0usize;
    let mut index = 0usize;

    while index < chars.len() {
        let character = chars[index];

        if let Some(quote_char) = quote {
            output.push(character);
            if character == '\\' {
                if let Some(&escaped) = chars.get(index.saturating_add(1)) {
                    output.push(escaped);
                    index = index.saturating_add(1);
                }
            } else if character == quote_char {
                quote = None;
            }
            index = index.saturating_add(1);
            continue;
        }

        match character {
            '"' | '\'' => {
                quote = Some(character);
                output.push(character);
            }
            '(' => {
                paren_depth = paren_depth.saturating_add(1);
                output.push(character);
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                output.push(character);
            }
            ' ' | '\t' | '\r' | '\n' => {
                // Swallow the whole run, then decide whether one space
                // survives.
                while chars
                    .get(index.saturating_add(1))
                    .is_some_and(|next| matches!(next, ' ' | '\t' | '\r' | '\n'))
                {
                    index = index.saturating_add(1);
                }
                let next = chars.get(index.saturating_add(1)).copied();
                let previous = output.chars().last();
                let droppable_here = paren_depth > 0
                    && (matches!(previous, Some('+' | '-' | '('))
                        || matches!(next, Some('+' | '-' | ')')));
                let redundant = previous.is_none()
                    || previous == Some(' ')
                    || next.is_none()
                    || matches!(previous, Some(','))
                    || matches!(next, Some(','));
                if !droppable_here && !redundant {
                    output.push(' ');
                }
            }
            _ => output.push(character),
        }
        index = index.saturating_add(1);
    }

    while output.ends_with(' ') {
        output.pop();
    }
    output
}

/// Split normalized selector text on top-level commas.
///
/// Fails with [`Error::MissingArgument`] on empty input and with
/// [`Error::InvalidSelector`] on empty sub-expressions (including a
/// trailing comma).
pub(crate) fn split_expressions(input: &str) -> Result<Vec<String>> {
    if input.trim().is_empty() {
        return Err(Error::MissingArgument);
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;

    for character in input.chars() {
        if let Some(quote_char) = quote {
            current.push(character);
            if escaped {
                escaped = false;
            } else if character == '\\' {
                escaped = true;
            } else if character == quote_char {
                quote = None;
            }
            continue;
        }
        match character {
            '"' | '\'' => {
                quote = Some(character);
                current.push(character);
            }
            '[' => {
                bracket_depth = bracket_depth.saturating_add(1);
                current.push(character);
            }
            ']' => {
                bracket_depth = bracket_depth.saturating_sub(1);
                current.push(character);
            }
            '(' => {
                paren_depth = paren_depth.saturating_add(1);
                current.push(character);
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                current.push(character);
            }
            ',' if bracket_depth == 0 && paren_depth == 0 => {
                parts.push(mem::take(&mut current));
            }
            _ => current.push(character),
        }
    }
    parts.push(current);

    let mut expressions = Vec::with_capacity(parts.len());
    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidSelector {
                selector: input.to_owned(),
            });
        }
        expressions.push(trimmed.to_owned());
    }
    Ok(expressions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("  div \t>\n p  "), "div > p");
    }

    #[test]
    fn preserves_quoted_whitespace() {
        assert_eq!(normalize("[data-x=\"a  b\"]"), "[data-x=\"a  b\"]");
    }

    #[test]
    fn strips_spacing_around_signs_in_arguments() {
        assert_eq!(normalize(":nth-child( 2n + 1 )"), ":nth-child(2n+1)");
        assert_eq!(normalize(":nth-child( -n + 3 )"), ":nth-child(-n+3)");
    }

    #[test]
    fn splits_top_level_commas_only() {
        let parts = split_expressions("div, :is(a, b), [data-x=\"1,2\"]").unwrap();
        assert_eq!(parts, vec!["div", ":is(a, b)", "[data-x=\"1,2\"]"]);
    }

    #[test]
    fn escaped_quotes_do_not_desynchronize_strings() {
        // The escaped quote must not close the string early, or the later
        // real closing quote would reopen one and swallow the comma.
        let parts = split_expressions("[title=\"a\\\"b\"], p").unwrap();
        assert_eq!(parts, vec!["[title=\"a\\\"b\"]", "p"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(split_expressions("   "), Err(Error::MissingArgument));
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(matches!(
            split_expressions("div,"),
            Err(Error::InvalidSelector { .. })
        ));
    }
}
