//! Attribute selector semantics.

mod common;

use common::{init_logging, page};
use css_selectors::Engine;

#[test]
fn operator_table_against_a_token_list() {
    init_logging();
    let (mut doc, _, body) = page();
    let div = doc
        .0
        .append_element_with(body, "div", &[("data-x", "foo bar baz")]);

    let engine = Engine::new();
    let hits = |selector: &str| engine.matches(&doc, selector, div, None).unwrap();

    assert!(hits("[data-x]"));
    assert!(hits("[data-x=\"foo bar baz\"]"));
    assert!(!hits("[data-x=\"foo\"]"));
    assert!(hits("[data-x~=\"bar\"]"));
    assert!(!hits("[data-x~=\"ba\"]"));
    assert!(hits("[data-x^=\"foo\"]"));
    assert!(!hits("[data-x^=\"bar\"]"));
    assert!(hits("[data-x$=\"baz\"]"));
    assert!(!hits("[data-x$=\"bar\"]"));
    assert!(hits("[data-x*=\"r b\"]"));
    assert!(!hits("[data-x*=\"zzz\"]"));
}

#[test]
fn dash_match_has_subtag_semantics() {
    init_logging();
    let (mut doc, _, body) = page();
    let exact = doc.0.append_element_with(body, "p", &[("lang", "en")]);
    let subtag = doc.0.append_element_with(body, "p", &[("lang", "en-US")]);
    let other = doc.0.append_element_with(body, "p", &[("lang", "enu")]);

    let engine = Engine::new();
    let results = engine.select(&doc, "[lang|=\"en\"]", None, None).unwrap();
    assert_eq!(results, vec![exact, subtag]);
    assert!(!results.contains(&other));
}

#[test]
fn explicit_i_flag_ignores_case() {
    init_logging();
    let (mut doc, _, body) = page();
    let div = doc
        .0
        .append_element_with(body, "div", &[("data-mode", "Dark")]);

    let engine = Engine::new();
    assert!(!engine.matches(&doc, "[data-mode=\"dark\"]", div, None).unwrap());
    assert!(engine
        .matches(&doc, "[data-mode=\"dark\" i]", div, None)
        .unwrap());
    assert!(engine
        .matches(&doc, "[data-mode^=\"DA\" i]", div, None)
        .unwrap());
}

#[test]
fn legacy_html_attributes_compare_case_insensitively() {
    init_logging();
    let (mut doc, _, body) = page();
    let input = doc
        .0
        .append_element_with(body, "input", &[("type", "CHECKBOX"), ("data-k", "V")]);

    let engine = Engine::new();
    // `type` is in the legacy case-insensitive table for HTML documents.
    assert!(engine
        .matches(&doc, "input[type=\"checkbox\"]", input, None)
        .unwrap());
    // Arbitrary data attributes are not.
    assert!(!engine.matches(&doc, "[data-k=\"v\"]", input, None).unwrap());
}

#[test]
fn explicit_s_flag_overrides_the_legacy_table() {
    init_logging();
    let (mut doc, _, body) = page();
    let input = doc
        .0
        .append_element_with(body, "input", &[("type", "CHECKBOX")]);

    let engine = Engine::new();
    assert!(engine
        .matches(&doc, "input[type=\"checkbox\"]", input, None)
        .unwrap());
    // `s` forces an exact comparison even where the legacy table would
    // ignore case.
    assert!(!engine
        .matches(&doc, "input[type=\"checkbox\" s]", input, None)
        .unwrap());
    assert!(engine
        .matches(&doc, "input[type=\"CHECKBOX\" s]", input, None)
        .unwrap());
}

#[test]
fn empty_value_quirks() {
    init_logging();
    let (mut doc, _, body) = page();
    let padded = doc
        .0
        .append_element_with(body, "div", &[("data-a", "x ")]);
    let blank = doc.0.append_element_with(body, "div", &[("data-a", "")]);
    let plain = doc.0.append_element_with(body, "div", &[("data-a", "x")]);

    let engine = Engine::new();
    // `~=""` degenerates to an edge-whitespace test.
    let includes = engine.select(&doc, "[data-a~=\"\"]", None, None).unwrap();
    assert_eq!(includes, vec![padded, blank]);
    assert!(!includes.contains(&plain));

    // Prefix, suffix, and substring never match an empty value.
    assert!(engine
        .select(&doc, "[data-a^=\"\"]", None, None)
        .unwrap()
        .is_empty());
    assert!(engine
        .select(&doc, "[data-a$=\"\"]", None, None)
        .unwrap()
        .is_empty());
    assert!(engine
        .select(&doc, "[data-a*=\"\"]", None, None)
        .unwrap()
        .is_empty());

    // Exact equality with the empty string is still an exact test.
    assert_eq!(
        engine.select(&doc, "[data-a=\"\"]", None, None).unwrap(),
        vec![blank]
    );
}

#[test]
fn unquoted_values_parse() {
    init_logging();
    let (mut doc, _, body) = page();
    let div = doc
        .0
        .append_element_with(body, "div", &[("data-kind", "card")]);

    let engine = Engine::new();
    assert!(engine.matches(&doc, "[data-kind=card]", div, None).unwrap());
}

#[test]
fn quirks_mode_relaxes_class_and_id_case() {
    init_logging();
    let (mut doc, _, body) = page();
    let div = doc
        .0
        .append_element_with(body, "div", &[("class", "Note"), ("id", "Main")]);

    let engine = Engine::new();
    assert!(!engine.matches(&doc, ".note", div, None).unwrap());
    assert!(!engine.matches(&doc, "#main", div, None).unwrap());

    doc.0.quirks = true;
    assert!(engine.matches(&doc, ".note", div, None).unwrap());
    assert!(engine.matches(&doc, "#main", div, None).unwrap());
}
