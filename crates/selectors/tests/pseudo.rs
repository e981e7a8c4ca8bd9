//! Logical, linguistic, location, user-action, and input pseudo-classes.

mod common;

use common::{init_logging, page};
use css_selectors::Engine;

#[test]
fn is_and_not_compose() {
    init_logging();
    let (mut doc, _, body) = page();
    let a = doc.0.append_element_with(body, "div", &[("class", "a")]);
    let b = doc.0.append_element_with(body, "div", &[("class", "b")]);
    let neither = doc.0.append_element_with(body, "div", &[("class", "c")]);

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, "div:is(.a, .b)", None, None).unwrap(),
        vec![a, b]
    );
    assert_eq!(
        engine.select(&doc, "div:not(.a, .b)", None, None).unwrap(),
        vec![neither]
    );
    assert_eq!(
        engine.select(&doc, "div:where(.a)", None, None).unwrap(),
        vec![a]
    );
    // `:matches` is the historic alias of `:is`.
    assert_eq!(
        engine.select(&doc, "div:matches(.b)", None, None).unwrap(),
        vec![b]
    );
}

#[test]
fn has_tests_descendants() {
    init_logging();
    let (mut doc, _, body) = page();
    let with = doc.0.append_element(body, "section");
    let wrapper = doc.0.append_element(with, "div");
    doc.0
        .append_element_with(wrapper, "img", &[("src", "x.png")]);
    let without = doc.0.append_element(body, "section");
    doc.0.append_element(without, "p");

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, "section:has(img)", None, None).unwrap(),
        vec![with]
    );
}

#[test]
fn root_and_empty() {
    init_logging();
    let (mut doc, html, body) = page();
    let blank = doc.0.append_element(body, "div");
    let with_text = doc.0.append_element(body, "div");
    doc.0.append_text(with_text, "hi");

    let engine = Engine::new();
    assert_eq!(engine.select(&doc, ":root", None, None).unwrap(), vec![html]);
    assert_eq!(
        engine.select(&doc, "div:empty", None, None).unwrap(),
        vec![blank]
    );
}

#[test]
fn lang_walks_ancestors_with_subtag_match() {
    init_logging();
    let (mut doc, html, body) = page();
    doc.0.set_attr(html, "lang", "en-US");
    let inherited = doc.0.append_element(body, "p");
    let french = doc.0.append_element_with(body, "p", &[("lang", "fr")]);

    let engine = Engine::new();
    assert!(engine.matches(&doc, ":lang(en)", inherited, None).unwrap());
    assert!(engine.matches(&doc, ":lang(en-US)", inherited, None).unwrap());
    assert!(!engine.matches(&doc, ":lang(e)", inherited, None).unwrap());
    assert!(engine.matches(&doc, ":lang(fr)", french, None).unwrap());
    assert!(!engine.matches(&doc, ":lang(en)", french, None).unwrap());
}

#[test]
fn dir_defaults_to_ltr_in_html() {
    init_logging();
    let (mut doc, _, body) = page();
    let plain = doc.0.append_element(body, "p");
    let rtl_block = doc.0.append_element_with(body, "div", &[("dir", "rtl")]);
    let nested = doc.0.append_element(rtl_block, "p");

    let engine = Engine::new();
    assert!(engine.matches(&doc, ":dir(ltr)", plain, None).unwrap());
    assert!(engine.matches(&doc, ":dir(rtl)", nested, None).unwrap());
    assert!(!engine.matches(&doc, ":dir(ltr)", nested, None).unwrap());
}

#[test]
fn link_states() {
    init_logging();
    let (mut doc, _, body) = page();
    let fresh = doc
        .0
        .append_element_with(body, "a", &[("href", "/about")]);
    let seen = doc.0.append_element_with(body, "a", &[("href", "/old")]);
    doc.0.element_mut(seen).unwrap().visited = true;
    let anchor_only = doc.0.append_element(body, "a");

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, ":any-link", None, None).unwrap(),
        vec![fresh, seen]
    );
    assert_eq!(engine.select(&doc, ":link", None, None).unwrap(), vec![fresh]);
    assert_eq!(
        engine.select(&doc, ":visited", None, None).unwrap(),
        vec![seen]
    );
    assert!(!engine.matches(&doc, ":any-link", anchor_only, None).unwrap());
}

#[test]
fn target_and_focus() {
    init_logging();
    let (mut doc, _, body) = page();
    let section = doc
        .0
        .append_element_with(body, "section", &[("id", "here")]);
    let input = doc.0.append_element(section, "input");
    doc.0.fragment_target = Some(section);
    doc.0.focused = Some(input);
    doc.0.has_focus = true;

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, ":target", None, None).unwrap(),
        vec![section]
    );
    assert_eq!(
        engine.select(&doc, ":focus", None, None).unwrap(),
        vec![input]
    );
    // `:focus-within` also matches ancestors of the focused element.
    let within = engine.select(&doc, "section:focus-within", None, None).unwrap();
    assert_eq!(within, vec![section]);

    doc.0.has_focus = false;
    assert!(engine
        .select(&doc, ":focus", None, None)
        .unwrap()
        .is_empty());
}

#[test]
fn hover_and_active_extend_to_ancestors() {
    init_logging();
    let (mut doc, _, body) = page();
    let card = doc.0.append_element_with(body, "div", &[("class", "card")]);
    let button = doc.0.append_element(card, "button");
    doc.0.hovered = Some(button);
    doc.0.pressed = Some(button);

    let engine = Engine::new();
    assert!(engine.matches(&doc, ":hover", button, None).unwrap());
    assert!(engine.matches(&doc, ".card:hover", card, None).unwrap());
    assert!(engine.matches(&doc, "button:active", button, None).unwrap());
    // Activation propagates to ancestors the same way hover does.
    assert!(engine.matches(&doc, "body:active", body, None).unwrap());
}

#[test]
fn input_state_pseudo_classes() {
    init_logging();
    let (mut doc, _, body) = page();
    let enabled = doc.0.append_element(body, "input");
    let disabled = doc
        .0
        .append_element_with(body, "input", &[("disabled", "")]);
    let readonly = doc
        .0
        .append_element_with(body, "input", &[("readonly", "")]);
    let span = doc.0.append_element(body, "span");

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, "input:enabled", None, None).unwrap(),
        vec![enabled, readonly]
    );
    assert_eq!(
        engine.select(&doc, "input:disabled", None, None).unwrap(),
        vec![disabled]
    );
    assert_eq!(
        engine.select(&doc, "input:read-write", None, None).unwrap(),
        vec![enabled]
    );
    // Non-controls are read-only by definition.
    assert!(engine.matches(&doc, ":read-only", span, None).unwrap());
    assert!(!engine.matches(&doc, ":read-write", span, None).unwrap());
}

#[test]
fn placeholder_and_default() {
    init_logging();
    let (mut doc, _, body) = page();
    let empty_field = doc
        .0
        .append_element_with(body, "input", &[("placeholder", "name")]);
    let filled_field = doc.0.append_element_with(
        body,
        "input",
        &[("placeholder", "name"), ("value", "Ada")],
    );
    let preset = doc
        .0
        .append_element_with(body, "input", &[("type", "radio"), ("checked", "")]);

    let engine = Engine::new();
    assert_eq!(
        engine
            .select(&doc, "input:placeholder-shown", None, None)
            .unwrap(),
        vec![empty_field]
    );
    assert!(!engine
        .matches(&doc, ":placeholder-shown", filled_field, None)
        .unwrap());
    assert_eq!(
        engine.select(&doc, "input:default", None, None).unwrap(),
        vec![preset]
    );
}

#[test]
fn input_value_pseudo_classes() {
    init_logging();
    let (mut doc, _, body) = page();
    let checkbox = doc
        .0
        .append_element_with(body, "input", &[("type", "checkbox")]);
    doc.0.element_mut(checkbox).unwrap().checked = true;
    let maybe = doc
        .0
        .append_element_with(body, "input", &[("type", "checkbox")]);
    doc.0.element_mut(maybe).unwrap().indeterminate = true;
    let required = doc
        .0
        .append_element_with(body, "input", &[("required", "")]);
    let optional = doc.0.append_element(body, "input");
    let valid = doc.0.append_element(body, "input");
    doc.0.element_mut(valid).unwrap().validity = Some(true);
    let invalid = doc.0.append_element(body, "input");
    doc.0.element_mut(invalid).unwrap().validity = Some(false);
    let in_range = doc
        .0
        .append_element_with(body, "input", &[("type", "number")]);
    doc.0.element_mut(in_range).unwrap().in_range = Some(true);
    let out_of_range = doc
        .0
        .append_element_with(body, "input", &[("type", "number")]);
    doc.0.element_mut(out_of_range).unwrap().in_range = Some(false);

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, ":checked", None, None).unwrap(),
        vec![checkbox]
    );
    assert_eq!(
        engine.select(&doc, ":indeterminate", None, None).unwrap(),
        vec![maybe]
    );
    assert_eq!(
        engine.select(&doc, ":required", None, None).unwrap(),
        vec![required]
    );
    assert!(engine.matches(&doc, ":optional", optional, None).unwrap());
    assert!(!engine.matches(&doc, ":optional", required, None).unwrap());
    assert_eq!(
        engine.select(&doc, ":valid", None, None).unwrap(),
        vec![valid]
    );
    assert_eq!(
        engine.select(&doc, ":invalid", None, None).unwrap(),
        vec![invalid]
    );
    assert_eq!(
        engine.select(&doc, ":in-range", None, None).unwrap(),
        vec![in_range]
    );
    assert_eq!(
        engine.select(&doc, ":out-of-range", None, None).unwrap(),
        vec![out_of_range]
    );
}

#[test]
fn selected_option_is_checked() {
    init_logging();
    let (mut doc, _, body) = page();
    let select = doc.0.append_element(body, "select");
    doc.0.append_element(select, "option");
    let chosen = doc
        .0
        .append_element_with(select, "option", &[("selected", "")]);

    let engine = Engine::new();
    assert_eq!(
        engine.select(&doc, "option:checked", None, None).unwrap(),
        vec![chosen]
    );
    assert_eq!(
        engine.select(&doc, "option:default", None, None).unwrap(),
        vec![chosen]
    );
}

#[test]
fn pseudo_elements_pass_through() {
    init_logging();
    let (mut doc, _, body) = page();
    let p = doc.0.append_element(body, "p");

    let engine = Engine::new();
    assert!(engine.matches(&doc, "p::before", p, None).unwrap());
    assert!(engine.matches(&doc, "p:first-line", p, None).unwrap());
    assert!(engine.matches(&doc, "p::marker", p, None).unwrap());
}
