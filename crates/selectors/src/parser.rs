//! Recursive-descent selector parser.
//!
//! Consumes tokens from the front of the remaining selector text, trying
//! productions in a fixed priority order: universal, id, class, type and
//! namespace forms, attribute selectors, combinators (built-in before
//! registered customs), then pseudo-classes. Validation is structural:
//! any unconsumed remainder fails compilation, so a selector that parses
//! is fully validated before anything executes against the tree.

use core::mem;

use crate::ast::{
    AttributeOperation, AttributeOperator, AttributeSelector, CaseSensitivity, Combinator,
    ComplexSelector, CompoundSelector, NamespacePrefix, Nth, PseudoClass, SelectorList,
    SimpleSelector,
};
use crate::error::{Error, Result};
use crate::lexer;
use crate::registry::Grammar;

/// Parse a full selector list (comma-separated) from normalized text.
pub(crate) fn parse_selector_list(text: &str, grammar: &Grammar) -> Result<SelectorList> {
    let expressions = lexer::split_expressions(text)?;
    let mut list = SelectorList::default();
    for expression in &expressions {
        list.selectors.push(parse_complex(expression, grammar)?);
    }
    Ok(list)
}

/// Parse one comma-free selector expression.
pub(crate) fn parse_complex(text: &str, grammar: &Grammar) -> Result<ComplexSelector> {
    let mut cursor = Cursor::new(text);
    cursor.skip_spaces();
    if cursor.is_done() {
        return Err(Error::InvalidSelector {
            selector: text.to_owned(),
        });
    }

    let mut first: Option<CompoundSelector> = None;
    let mut rest: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut pending: Option<Combinator> = None;

    loop {
        if cursor.peek().is_some_and(|symbol| is_combinator_symbol(symbol, grammar)) {
            // A combinator with no compound on its left (leading or
            // doubled combinator).
            return Err(Error::InvalidSelector {
                selector: cursor.remainder(),
            });
        }

        let compound = parse_compound(&mut cursor, grammar)?;
        if first.is_none() {
            first = Some(compound);
        } else {
            rest.push((pending.take().unwrap_or(Combinator::Descendant), compound));
        }

        let saw_space = cursor.skip_spaces();
        let Some(symbol) = cursor.peek() else {
            break;
        };

        let combinator = if is_combinator_symbol(symbol, grammar) {
            cursor.bump();
            cursor.skip_spaces();
            match symbol {
                '>' => Combinator::Child,
                '+' => Combinator::AdjacentSibling,
                '~' => Combinator::GeneralSibling,
                custom => Combinator::Custom(custom),
            }
        } else if saw_space {
            Combinator::Descendant
        } else {
            return Err(Error::InvalidSelector {
                selector: cursor.remainder(),
            });
        };

        if cursor.is_done() {
            // Trailing combinator.
            return Err(Error::InvalidSelector {
                selector: text.to_owned(),
            });
        }
        pending = Some(combinator);
    }

    Ok(ComplexSelector {
        first: first.unwrap_or_default(),
        rest,
    })
}

/// Parse a compound selector (a run of simple selectors with no
/// combinators).
fn parse_compound(cursor: &mut Cursor, grammar: &Grammar) -> Result<CompoundSelector> {
    let mut compound = CompoundSelector::default();

    loop {
        let Some(character) = cursor.peek() else {
            break;
        };
        if character.is_whitespace() || is_combinator_symbol(character, grammar) {
            break;
        }
        let simple = match character {
            '*' => {
                cursor.bump();
                if cursor.peek() == Some('|') && cursor.peek_at(1) != Some('=') {
                    cursor.bump();
                    parse_namespaced_name(cursor, NamespacePrefix::AnyNamespace)?
                } else {
                    SimpleSelector::Universal(NamespacePrefix::Unprefixed)
                }
            }
            '#' => {
                cursor.bump();
                let name = cursor.consume_ident();
                if name.is_empty() {
                    return Err(Error::InvalidSelector {
                        selector: cursor.remainder(),
                    });
                }
                SimpleSelector::Id(name)
            }
            '.' => {
                cursor.bump();
                let name = cursor.consume_ident();
                if name.is_empty() {
                    return Err(Error::InvalidSelector {
                        selector: cursor.remainder(),
                    });
                }
                SimpleSelector::Class(name)
            }
            '[' => {
                cursor.bump();
                SimpleSelector::Attribute(parse_attribute(cursor, grammar)?)
            }
            ':' => {
                cursor.bump();
                parse_pseudo(cursor, grammar)?
            }
            '|' => {
                cursor.bump();
                parse_namespaced_name(cursor, NamespacePrefix::NoNamespace)?
            }
            _ if cursor.at_ident_start() => {
                let name = cursor.consume_ident();
                if cursor.peek() == Some('|') && cursor.peek_at(1) != Some('=') {
                    cursor.bump();
                    parse_namespaced_name(cursor, NamespacePrefix::Named(name))?
                } else {
                    SimpleSelector::Type {
                        prefix: NamespacePrefix::Unprefixed,
                        name,
                    }
                }
            }
            _ => {
                return Err(Error::UnknownToken {
                    token: cursor.remainder(),
                });
            }
        };
        compound.simples.push(simple);
    }

    if compound.simples.is_empty() {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }
    Ok(compound)
}

/// Parse the name part following a namespace prefix: an identifier or the
/// universal `*`.
fn parse_namespaced_name(cursor: &mut Cursor, prefix: NamespacePrefix) -> Result<SimpleSelector> {
    if cursor.peek() == Some('*') {
        cursor.bump();
        return Ok(SimpleSelector::Universal(prefix));
    }
    let name = cursor.consume_ident();
    if name.is_empty() {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }
    Ok(SimpleSelector::Type { prefix, name })
}

/// Parse an attribute selector. The opening `[` is already consumed.
fn parse_attribute(cursor: &mut Cursor, grammar: &Grammar) -> Result<AttributeSelector> {
    cursor.skip_spaces();

    let mut prefix = NamespacePrefix::Unprefixed;
    if cursor.peek() == Some('*') && cursor.peek_at(1) == Some('|') {
        cursor.bump();
        cursor.bump();
        prefix = NamespacePrefix::AnyNamespace;
    } else if cursor.peek() == Some('|') && cursor.peek_at(1) != Some('=') {
        cursor.bump();
        prefix = NamespacePrefix::NoNamespace;
    }

    let mut name = cursor.consume_ident();
    if name.is_empty() {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }
    if cursor.peek() == Some('|') && cursor.peek_at(1) != Some('=') {
        cursor.bump();
        prefix = NamespacePrefix::Named(mem::take(&mut name));
        name = cursor.consume_ident();
        if name.is_empty() {
            return Err(Error::InvalidSelector {
                selector: cursor.remainder(),
            });
        }
    }
    cursor.skip_spaces();

    if cursor.eat(']') {
        return Ok(AttributeSelector {
            prefix,
            name,
            operation: None,
            case_sensitivity: CaseSensitivity::Auto,
        });
    }

    let operator = parse_attribute_operator(cursor, grammar)?;
    cursor.skip_spaces();

    let value = match cursor.peek() {
        Some(quote @ ('"' | '\'')) => {
            cursor.bump();
            cursor.consume_string(quote)?
        }
        _ => cursor.consume_unquoted_value(),
    };
    cursor.skip_spaces();

    let mut case_sensitivity = CaseSensitivity::Auto;
    if cursor.at_ident_start() {
        let flag = cursor.consume_ident();
        if flag.eq_ignore_ascii_case("i") {
            case_sensitivity = CaseSensitivity::Insensitive;
        } else if flag.eq_ignore_ascii_case("s") {
            case_sensitivity = CaseSensitivity::Sensitive;
        } else {
            return Err(Error::InvalidSelector {
                selector: flag,
            });
        }
        cursor.skip_spaces();
    }

    if !cursor.eat(']') {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }

    Ok(AttributeSelector {
        prefix,
        name,
        operation: Some(AttributeOperation { operator, value }),
        case_sensitivity,
    })
}

/// Parse the operator of a comparing attribute selector. Registered
/// custom symbols are tried first (longest first), then the built-ins.
fn parse_attribute_operator(cursor: &mut Cursor, grammar: &Grammar) -> Result<AttributeOperator> {
    for symbol in &grammar.operator_symbols {
        if cursor.matches_str(symbol) {
            cursor.advance_by(symbol.chars().count());
            return Ok(AttributeOperator::Custom(symbol.clone()));
        }
    }
    match cursor.peek() {
        Some('=') => {
            cursor.bump();
            Ok(AttributeOperator::Equals)
        }
        Some(sigil @ ('~' | '|' | '^' | '$' | '*')) if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            Ok(match sigil {
                '~' => AttributeOperator::Includes,
                '|' => AttributeOperator::DashMatch,
                '^' => AttributeOperator::Prefix,
                '$' => AttributeOperator::Suffix,
                _ => AttributeOperator::Substring,
            })
        }
        _ => Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        }),
    }
}

/// Parse a pseudo-class or pseudo-element. The leading `:` is already
/// consumed.
fn parse_pseudo(cursor: &mut Cursor, grammar: &Grammar) -> Result<SimpleSelector> {
    if cursor.eat(':') {
        let name = cursor.consume_ident();
        if name.is_empty() {
            return Err(Error::InvalidSelector {
                selector: cursor.remainder(),
            });
        }
        return Ok(SimpleSelector::PseudoElement(name.to_ascii_lowercase()));
    }

    let name = cursor.consume_ident();
    if name.is_empty() {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }
    let lowered = name.to_ascii_lowercase();

    let pseudo = match lowered.as_str() {
        // Legacy single-colon pseudo-elements: no-op pass-through.
        "before" | "after" | "first-line" | "first-letter" => {
            return Ok(SimpleSelector::PseudoElement(lowered));
        }

        "root" => PseudoClass::Root,
        "empty" => PseudoClass::Empty,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,

        "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
            let argument = parse_argument(cursor)?;
            let Some(nth) = parse_nth(&argument) else {
                return Err(Error::InvalidSelector { selector: argument });
            };
            match lowered.as_str() {
                "nth-child" => PseudoClass::NthChild(nth),
                "nth-last-child" => PseudoClass::NthLastChild(nth),
                "nth-of-type" => PseudoClass::NthOfType(nth),
                _ => PseudoClass::NthLastOfType(nth),
            }
        }

        "is" | "matches" | "where" | "not" | "has" => {
            let argument = parse_argument(cursor)?;
            let inner = parse_selector_list(&argument, grammar)?;
            match lowered.as_str() {
                "is" | "matches" => PseudoClass::Is(inner),
                "where" => PseudoClass::Where(inner),
                "not" => PseudoClass::Not(inner),
                _ => PseudoClass::Has(inner),
            }
        }

        "lang" | "dir" => {
            let argument = strip_quotes(&parse_argument(cursor)?);
            if argument.is_empty() {
                return Err(Error::InvalidSelector { selector: lowered });
            }
            if lowered == "lang" {
                PseudoClass::Lang(argument)
            } else {
                PseudoClass::Dir(argument)
            }
        }

        "link" => PseudoClass::Link,
        "visited" => PseudoClass::Visited,
        "any-link" => PseudoClass::AnyLink,
        "target" => PseudoClass::Target,

        "hover" => PseudoClass::Hover,
        "active" => PseudoClass::Active,
        "focus" => PseudoClass::Focus,
        "focus-within" => PseudoClass::FocusWithin,
        "focus-visible" => PseudoClass::FocusVisible,

        "enabled" => PseudoClass::Enabled,
        "disabled" => PseudoClass::Disabled,
        "read-only" => PseudoClass::ReadOnly,
        "read-write" => PseudoClass::ReadWrite,
        "placeholder-shown" => PseudoClass::PlaceholderShown,
        "default" => PseudoClass::Default,

        "checked" => PseudoClass::Checked,
        "indeterminate" => PseudoClass::Indeterminate,
        "required" => PseudoClass::Required,
        "optional" => PseudoClass::Optional,
        "valid" => PseudoClass::Valid,
        "invalid" => PseudoClass::Invalid,
        "in-range" => PseudoClass::InRange,
        "out-of-range" => PseudoClass::OutOfRange,

        _ => {
            let Some(&takes_argument) = grammar.pseudo_names.get(&lowered) else {
                return Err(Error::UnknownPseudoClass { name: lowered });
            };
            let argument = if takes_argument {
                Some(parse_argument(cursor)?)
            } else {
                None
            };
            PseudoClass::Custom {
                name: lowered,
                argument,
            }
        }
    };

    Ok(SimpleSelector::PseudoClass(pseudo))
}

/// Capture a balanced parenthesized argument, honoring nested parentheses
/// and quoted strings. The cursor must sit on `(`.
fn parse_argument(cursor: &mut Cursor) -> Result<String> {
    if !cursor.eat('(') {
        return Err(Error::InvalidSelector {
            selector: cursor.remainder(),
        });
    }
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut argument = String::new();

    while let Some(character) = cursor.bump() {
        if let Some(quote_char) = quote {
            if character == quote_char {
                quote = None;
            }
            argument.push(character);
            continue;
        }
        match character {
            '"' | '\'' => {
                quote = Some(character);
                argument.push(character);
            }
            '(' => {
                depth = depth.saturating_add(1);
                argument.push(character);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(argument.trim().to_owned());
                }
                argument.push(character);
            }
            _ => argument.push(character),
        }
    }

    // Ran out of input with the parenthesis still open.
    Err(Error::InvalidSelector { selector: argument })
}

/// Parse an `An+B` argument: `even`, `odd`, `An+B`, a bare integer, or a
/// bare `n`.
pub(crate) fn parse_nth(text: &str) -> Option<Nth> {
    let cleaned: String = text
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match cleaned.as_str() {
        "" => return None,
        "even" => return Some(Nth { step: 2, offset: 0 }),
        "odd" => return Some(Nth { step: 2, offset: 1 }),
        _ => {}
    }

    if let Some(n_position) = cleaned.find('n') {
        let step_text = &cleaned[..n_position];
        let offset_text = &cleaned[n_position.saturating_add(1)..];
        let step = match step_text {
            "" | "+" => 1,
            "-" => -1,
            _ => step_text.parse::<i32>().ok()?,
        };
        let offset = if offset_text.is_empty() {
            0
        } else {
            if !offset_text.starts_with('+') && !offset_text.starts_with('-') {
                return None;
            }
            offset_text.parse::<i32>().ok()?
        };
        Some(Nth { step, offset })
    } else {
        cleaned
            .parse::<i32>()
            .ok()
            .map(|offset| Nth { step: 0, offset })
    }
}

/// Whether a pseudo-class name is part of the built-in grammar (used to
/// reject colliding registrations).
pub(crate) fn is_builtin_pseudo_name(name: &str) -> bool {
    matches!(
        name,
        "before"
            | "after"
            | "first-line"
            | "first-letter"
            | "root"
            | "empty"
            | "first-child"
            | "last-child"
            | "only-child"
            | "first-of-type"
            | "last-of-type"
            | "only-of-type"
            | "nth-child"
            | "nth-last-child"
            | "nth-of-type"
            | "nth-last-of-type"
            | "is"
            | "matches"
            | "where"
            | "not"
            | "has"
            | "lang"
            | "dir"
            | "link"
            | "visited"
            | "any-link"
            | "target"
            | "hover"
            | "active"
            | "focus"
            | "focus-within"
            | "focus-visible"
            | "enabled"
            | "disabled"
            | "read-only"
            | "read-write"
            | "placeholder-shown"
            | "default"
            | "checked"
            | "indeterminate"
            | "required"
            | "optional"
            | "valid"
            | "invalid"
            | "in-range"
            | "out-of-range"
            | "scope"
    )
}

fn is_combinator_symbol(symbol: char, grammar: &Grammar) -> bool {
    matches!(symbol, '>' | '+' | '~') || grammar.combinator_symbols.contains(&symbol)
}

/// Strip one layer of matching quotes off a pseudo-class argument.
fn strip_quotes(text: &str) -> String {
    let trimmed = text.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed
                .get(1..trimmed.len().saturating_sub(1))
                .unwrap_or_default()
                .to_owned();
        }
    }
    trimmed.to_owned()
}

/// Character cursor over one selector expression.
struct Cursor {
    chars: Vec<char>,
    index: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index.saturating_add(offset)).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let character = self.peek();
        if character.is_some() {
            self.index = self.index.saturating_add(1);
        }
        character
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.index = self.index.saturating_add(1);
            return true;
        }
        false
    }

    fn advance_by(&mut self, count: usize) {
        self.index = self.index.saturating_add(count);
    }

    fn is_done(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn remainder(&self) -> String {
        self.chars.get(self.index..).unwrap_or_default().iter().collect()
    }

    /// Whether the upcoming characters equal `text` exactly.
    fn matches_str(&self, text: &str) -> bool {
        let mut offset = 0usize;
        for expected in text.chars() {
            if self.peek_at(offset) != Some(expected) {
                return false;
            }
            offset = offset.saturating_add(1);
        }
        offset > 0
    }

    fn skip_spaces(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.index = self.index.saturating_add(1);
            skipped = true;
        }
        skipped
    }

    fn at_ident_start(&self) -> bool {
        self.peek().is_some_and(|character| {
            character.is_alphanumeric()
                || character == '-'
                || character == '_'
                || character == '\\'
                || !character.is_ascii()
        })
    }

    /// Consume an identifier. Backslash escapes take the next character
    /// literally.
    fn consume_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(character) = self.peek() {
            if character == '\\' {
                self.bump();
                if let Some(escaped) = self.bump() {
                    ident.push(escaped);
                }
                continue;
            }
            let acceptable = character.is_alphanumeric()
                || character == '-'
                || character == '_'
                || !character.is_ascii();
            if !acceptable {
                break;
            }
            ident.push(character);
            self.bump();
        }
        ident
    }

    /// Consume a quoted string. The opening quote is already consumed.
    fn consume_string(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        while let Some(character) = self.bump() {
            if character == quote {
                return Ok(value);
            }
            if character == '\\' {
                if let Some(escaped) = self.bump() {
                    value.push(escaped);
                }
                continue;
            }
            value.push(character);
        }
        Err(Error::InvalidSelector { selector: value })
    }

    /// Consume an unquoted attribute value: everything up to whitespace or
    /// the closing bracket.
    fn consume_unquoted_value(&mut self) -> String {
        let mut value = String::new();
        while let Some(character) = self.peek() {
            if character.is_whitespace() || character == ']' {
                break;
            }
            value.push(character);
            self.bump();
        }
        value
    }
}
