//! AST interpretation: testing elements against compiled selectors.
//!
//! Complex selectors are evaluated right to left: the candidate element
//! must match the rightmost compound directly, then each combinator walks
//! the tree toward the left. Descendant and general-sibling combinators
//! backtrack: every ancestor (or preceding sibling) is a fresh attempt at
//! satisfying the remaining prefix.

use core::cell::RefCell;

use crate::ElementAdapter;
use crate::ast::{
    AttributeOperator, AttributeSelector, CaseSensitivity, Combinator, ComplexSelector,
    CompoundSelector, NamespacePrefix, PseudoClass, SelectorList, SimpleSelector,
};
use crate::collect::Descendants;
use crate::nth::NthCache;
use crate::registry::Registry;

/// HTML attributes whose values compare case-insensitively in HTML
/// documents. Sorted for binary search.
const CASE_INSENSITIVE_ATTRIBUTES: [&str; 45] = [
    "accept",
    "accept-charset",
    "align",
    "alink",
    "axis",
    "bgcolor",
    "charset",
    "checked",
    "clear",
    "codetype",
    "color",
    "compact",
    "declare",
    "defer",
    "dir",
    "direction",
    "disabled",
    "enctype",
    "face",
    "frame",
    "hreflang",
    "http-equiv",
    "lang",
    "language",
    "link",
    "media",
    "method",
    "multiple",
    "nohref",
    "noresize",
    "noshade",
    "nowrap",
    "readonly",
    "rel",
    "rev",
    "rules",
    "scope",
    "scrolling",
    "selected",
    "shape",
    "target",
    "text",
    "type",
    "valign",
    "valuetype",
];

/// Elements participating in the disabled/enabled state machine.
const FORM_CONTROL_TAGS: [&str; 7] = [
    "button",
    "fieldset",
    "input",
    "optgroup",
    "option",
    "select",
    "textarea",
];

/// Elements that can carry the `required` attribute.
const REQUIRABLE_TAGS: [&str; 3] = ["input", "select", "textarea"];

/// Everything one match run needs: the host tree, the custom productions,
/// the shared sibling-position cache, and the active document flags.
pub(crate) struct MatchContext<'a, A: ElementAdapter> {
    pub(crate) adapter: &'a A,
    pub(crate) registry: &'a Registry<A>,
    pub(crate) nth: &'a RefCell<NthCache<A::Handle>>,
    pub(crate) is_html: bool,
    pub(crate) quirks: bool,
}

/// Whether `element` matches any expression in the list.
pub(crate) fn matches_selector_list<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    list: &SelectorList,
    element: A::Handle,
) -> bool {
    list.selectors
        .iter()
        .any(|complex| matches_complex(context, complex, element))
}

/// Whether `element` matches one comma-free selector expression.
pub(crate) fn matches_complex<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    complex: &ComplexSelector,
    element: A::Handle,
) -> bool {
    matches_upto(
        context,
        complex,
        complex.compound_count().saturating_sub(1),
        element,
    )
}

/// Whether `element` matches compound `index` and some tree walk toward
/// the left satisfies compounds `0..index`.
fn matches_upto<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    complex: &ComplexSelector,
    index: usize,
    element: A::Handle,
) -> bool {
    if !matches_compound(context, complex.compound(index), element) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let previous = index.saturating_sub(1);
    match complex.combinator(index) {
        Combinator::Descendant => {
            let mut cursor = context.adapter.parent(element);
            while let Some(ancestor) = cursor {
                if matches_upto(context, complex, previous, ancestor) {
                    return true;
                }
                cursor = context.adapter.parent(ancestor);
            }
            false
        }
        Combinator::Child => context
            .adapter
            .parent(element)
            .is_some_and(|parent| matches_upto(context, complex, previous, parent)),
        Combinator::AdjacentSibling => context
            .adapter
            .previous_element_sibling(element)
            .is_some_and(|sibling| matches_upto(context, complex, previous, sibling)),
        Combinator::GeneralSibling => {
            let mut cursor = context.adapter.previous_element_sibling(element);
            while let Some(sibling) = cursor {
                if matches_upto(context, complex, previous, sibling) {
                    return true;
                }
                cursor = context.adapter.previous_element_sibling(sibling);
            }
            false
        }
        Combinator::Custom(symbol) => context.registry.combinator(*symbol).is_some_and(|resolve| {
            resolve(context.adapter, element)
                .into_iter()
                .any(|candidate| matches_upto(context, complex, previous, candidate))
        }),
    }
}

/// Whether `element` matches every simple selector of a compound.
pub(crate) fn matches_compound<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    compound: &CompoundSelector,
    element: A::Handle,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(context, simple, element))
}

fn matches_simple<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    simple: &SimpleSelector,
    element: A::Handle,
) -> bool {
    match simple {
        SimpleSelector::Universal(prefix) => matches_namespace(context, prefix, element),
        SimpleSelector::Type { prefix, name } => {
            matches_namespace(context, prefix, element)
                && matches_tag_name(context, element, name)
        }
        SimpleSelector::Id(id) => {
            let actual = context.adapter.attribute(element, "id");
            if context.quirks {
                actual.is_some_and(|value| value.eq_ignore_ascii_case(id))
            } else {
                actual == Some(id.as_str())
            }
        }
        SimpleSelector::Class(class) => has_class(context, element, class),
        SimpleSelector::Attribute(attribute) => matches_attribute(context, attribute, element),
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo(context, pseudo, element),
        // Pseudo-elements restrict rendering, not matching.
        SimpleSelector::PseudoElement(_) => true,
    }
}

fn matches_namespace<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    prefix: &NamespacePrefix,
    element: A::Handle,
) -> bool {
    match prefix {
        NamespacePrefix::Unprefixed | NamespacePrefix::AnyNamespace => true,
        NamespacePrefix::NoNamespace => context.adapter.namespace(element).is_none(),
        NamespacePrefix::Named(namespace) => {
            context.adapter.namespace(element) == Some(namespace.as_str())
        }
    }
}

fn matches_tag_name<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    name: &str,
) -> bool {
    let actual = context.adapter.tag_name(element);
    if context.is_html {
        actual.eq_ignore_ascii_case(name)
    } else {
        actual == name
    }
}

/// Whitespace-delimited token membership in the `class` attribute.
fn has_class<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    class: &str,
) -> bool {
    context
        .adapter
        .attribute(element, "class")
        .is_some_and(|value| {
            value.split_ascii_whitespace().any(|token| {
                if context.quirks {
                    token.eq_ignore_ascii_case(class)
                } else {
                    token == class
                }
            })
        })
}

fn matches_attribute<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    attribute: &AttributeSelector,
    element: A::Handle,
) -> bool {
    let name = if context.is_html {
        attribute.name.to_ascii_lowercase()
    } else {
        attribute.name.clone()
    };

    let actual = match &attribute.prefix {
        NamespacePrefix::Unprefixed | NamespacePrefix::AnyNamespace => {
            context.adapter.attribute(element, &name)
        }
        NamespacePrefix::NoNamespace => context.adapter.attribute_ns(element, None, &name),
        NamespacePrefix::Named(namespace) => {
            context
                .adapter
                .attribute_ns(element, Some(namespace.as_str()), &name)
        }
    };

    let Some(actual) = actual else {
        return false;
    };
    let Some(operation) = &attribute.operation else {
        return true;
    };

    let case_insensitive = match attribute.case_sensitivity {
        CaseSensitivity::Insensitive => true,
        CaseSensitivity::Sensitive => false,
        CaseSensitivity::Auto => {
            context.is_html
                && CASE_INSENSITIVE_ATTRIBUTES
                    .binary_search(&name.as_str())
                    .is_ok()
        }
    };

    if let AttributeOperator::Custom(symbol) = &operation.operator {
        return context
            .registry
            .operator(symbol)
            .is_some_and(|eval| eval(actual, &operation.value, case_insensitive));
    }

    let (actual, expected) = if case_insensitive {
        (
            actual.to_ascii_lowercase(),
            operation.value.to_ascii_lowercase(),
        )
    } else {
        (actual.to_owned(), operation.value.clone())
    };
    evaluate_operator(&operation.operator, &actual, &expected)
}

fn evaluate_operator(operator: &AttributeOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttributeOperator::Equals => actual == expected,
        AttributeOperator::Includes => {
            if expected.is_empty() {
                // Legacy quirk: an empty token never exists, but the
                // historic engines reduce this to an edge-whitespace
                // test on the value.
                return actual.is_empty()
                    || actual.starts_with(char::is_whitespace)
                    || actual.ends_with(char::is_whitespace);
            }
            if expected.contains(char::is_whitespace) {
                return false;
            }
            actual.split_ascii_whitespace().any(|token| token == expected)
        }
        AttributeOperator::DashMatch => {
            actual == expected
                || (actual.len() > expected.len()
                    && actual.starts_with(expected)
                    && actual[expected.len()..].starts_with('-'))
        }
        AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttributeOperator::Substring => !expected.is_empty() && actual.contains(expected),
        // Handled before case folding.
        AttributeOperator::Custom(_) => false,
    }
}

#[expect(clippy::too_many_lines, reason = "one arm per pseudo-class")]
fn matches_pseudo<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    pseudo: &PseudoClass,
    element: A::Handle,
) -> bool {
    let adapter = context.adapter;
    match pseudo {
        PseudoClass::Root => adapter.parent(element).is_none(),
        PseudoClass::Empty => {
            adapter.first_element_child(element).is_none()
                && !adapter.has_non_empty_text_child(element)
        }
        PseudoClass::FirstChild => adapter.previous_element_sibling(element).is_none(),
        PseudoClass::LastChild => adapter.next_element_sibling(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_element_sibling(element).is_none()
                && adapter.next_element_sibling(element).is_none()
        }
        PseudoClass::FirstOfType => !has_same_type_sibling(context, element, false),
        PseudoClass::LastOfType => !has_same_type_sibling(context, element, true),
        PseudoClass::OnlyOfType => {
            !has_same_type_sibling(context, element, false)
                && !has_same_type_sibling(context, element, true)
        }

        PseudoClass::NthChild(nth) => {
            nth.matches(context.nth.borrow_mut().position(adapter, element, false))
        }
        PseudoClass::NthLastChild(nth) => {
            nth.matches(context.nth.borrow_mut().position(adapter, element, true))
        }
        PseudoClass::NthOfType(nth) => nth.matches(
            context
                .nth
                .borrow_mut()
                .position_of_type(adapter, element, false),
        ),
        PseudoClass::NthLastOfType(nth) => nth.matches(
            context
                .nth
                .borrow_mut()
                .position_of_type(adapter, element, true),
        ),

        PseudoClass::Is(list) | PseudoClass::Where(list) => {
            matches_selector_list(context, list, element)
        }
        PseudoClass::Not(list) => !matches_selector_list(context, list, element),
        PseudoClass::Has(list) => Descendants::new(adapter, element, false)
            .any(|descendant| matches_selector_list(context, list, descendant)),

        PseudoClass::Lang(code) => matches_lang(context, element, code),
        PseudoClass::Dir(direction) => matches_dir(context, element, direction),

        PseudoClass::Link => is_link(context, element) && !adapter.is_visited(element),
        PseudoClass::Visited => is_link(context, element) && adapter.is_visited(element),
        PseudoClass::AnyLink => is_link(context, element),
        PseudoClass::Target => adapter.target_element() == Some(element),

        PseudoClass::Hover => is_ancestor_or_self(adapter, element, adapter.hovered_element()),
        PseudoClass::Active => is_ancestor_or_self(adapter, element, adapter.pressed_element()),
        PseudoClass::Focus | PseudoClass::FocusVisible => {
            adapter.document_has_focus() && adapter.focused_element() == Some(element)
        }
        PseudoClass::FocusWithin => {
            adapter.document_has_focus()
                && is_ancestor_or_self(adapter, element, adapter.focused_element())
        }

        PseudoClass::Enabled => {
            is_form_control(context, element) && adapter.attribute(element, "disabled").is_none()
        }
        PseudoClass::Disabled => {
            is_form_control(context, element) && adapter.attribute(element, "disabled").is_some()
        }
        PseudoClass::ReadOnly => !is_read_write(context, element),
        PseudoClass::ReadWrite => is_read_write(context, element),
        PseudoClass::PlaceholderShown => {
            has_tag(context, element, &["input", "textarea"])
                && adapter
                    .attribute(element, "placeholder")
                    .is_some_and(|value| !value.is_empty())
                && adapter
                    .attribute(element, "value")
                    .is_none_or(str::is_empty)
        }
        PseudoClass::Default => {
            (has_tag(context, element, &["input"])
                && adapter.attribute(element, "checked").is_some())
                || (has_tag(context, element, &["option"])
                    && adapter.attribute(element, "selected").is_some())
        }

        PseudoClass::Checked => {
            adapter.is_checked(element)
                || (has_tag(context, element, &["option"])
                    && adapter.attribute(element, "selected").is_some())
        }
        PseudoClass::Indeterminate => adapter.is_indeterminate(element),
        PseudoClass::Required => {
            has_tag(context, element, &REQUIRABLE_TAGS)
                && adapter.attribute(element, "required").is_some()
        }
        PseudoClass::Optional => {
            has_tag(context, element, &REQUIRABLE_TAGS)
                && adapter.attribute(element, "required").is_none()
        }
        PseudoClass::Valid => adapter.validity(element) == Some(true),
        PseudoClass::Invalid => adapter.validity(element) == Some(false),
        PseudoClass::InRange => adapter.in_range(element) == Some(true),
        PseudoClass::OutOfRange => adapter.in_range(element) == Some(false),

        PseudoClass::Custom { name, argument } => context
            .registry
            .selector(name)
            .is_some_and(|eval| eval(adapter, element, argument.as_deref())),
    }
}

/// Whether a sibling on the given side shares this element's tag name.
fn has_same_type_sibling<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    forward: bool,
) -> bool {
    let tag = context.adapter.tag_name(element).to_owned();
    let mut cursor = if forward {
        context.adapter.next_element_sibling(element)
    } else {
        context.adapter.previous_element_sibling(element)
    };
    while let Some(sibling) = cursor {
        if matches_tag_name(context, sibling, &tag) {
            return true;
        }
        cursor = if forward {
            context.adapter.next_element_sibling(sibling)
        } else {
            context.adapter.previous_element_sibling(sibling)
        };
    }
    false
}

/// Subtag-prefix language match against the nearest ancestor-or-self
/// `lang` attribute: `:lang(en)` matches `en` and `en-US`, not `enu`.
fn matches_lang<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    code: &str,
) -> bool {
    if code.is_empty() {
        return false;
    }
    let mut cursor = Some(element);
    while let Some(current) = cursor {
        if let Some(value) = context.adapter.attribute(current, "lang") {
            if let Some(head) = value.get(..code.len())
                && head.eq_ignore_ascii_case(code)
            {
                return value.len() == code.len() || value[code.len()..].starts_with('-');
            }
            return false;
        }
        cursor = context.adapter.parent(current);
    }
    false
}

/// Directionality from the nearest ancestor-or-self `dir` attribute,
/// defaulting to left-to-right in HTML documents.
fn matches_dir<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    direction: &str,
) -> bool {
    let mut cursor = Some(element);
    while let Some(current) = cursor {
        if let Some(value) = context.adapter.attribute(current, "dir")
            && (value.eq_ignore_ascii_case("ltr") || value.eq_ignore_ascii_case("rtl"))
        {
            return value.eq_ignore_ascii_case(direction);
        }
        cursor = context.adapter.parent(current);
    }
    context.is_html && direction.eq_ignore_ascii_case("ltr")
}

fn is_link<A: ElementAdapter>(context: &MatchContext<'_, A>, element: A::Handle) -> bool {
    has_tag(context, element, &["a", "area"])
        && context.adapter.attribute(element, "href").is_some()
}

fn is_form_control<A: ElementAdapter>(context: &MatchContext<'_, A>, element: A::Handle) -> bool {
    has_tag(context, element, &FORM_CONTROL_TAGS)
}

/// Editable per the mutability rules: an enabled, non-readonly text
/// control, or anything carrying `contenteditable`.
fn is_read_write<A: ElementAdapter>(context: &MatchContext<'_, A>, element: A::Handle) -> bool {
    if context.adapter.attribute(element, "contenteditable").is_some() {
        return true;
    }
    has_tag(context, element, &["input", "textarea"])
        && context.adapter.attribute(element, "readonly").is_none()
        && context.adapter.attribute(element, "disabled").is_none()
}

fn has_tag<A: ElementAdapter>(
    context: &MatchContext<'_, A>,
    element: A::Handle,
    tags: &[&str],
) -> bool {
    let actual = context.adapter.tag_name(element);
    tags.iter().any(|tag| {
        if context.is_html {
            actual.eq_ignore_ascii_case(tag)
        } else {
            actual == *tag
        }
    })
}

/// Whether `element` is `descendant` itself or one of its ancestors.
fn is_ancestor_or_self<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    descendant: Option<A::Handle>,
) -> bool {
    let mut cursor = descendant;
    while let Some(current) = cursor {
        if current == element {
            return true;
        }
        cursor = adapter.parent(current);
    }
    false
}
