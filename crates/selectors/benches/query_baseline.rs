//! Baseline query throughput over a synthetic page.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use css_selectors::Engine;

#[path = "../tests/common/mod.rs"]
mod common;

use common::Doc;

/// A page with `sections` sections of `items` list entries each.
fn build_page(sections: usize, items: usize) -> Doc {
    let mut doc = Doc::new();
    let html = doc.0.new_element("html");
    let body = doc.0.append_element(html, "body");
    for section_index in 0..sections {
        let section = doc.0.append_element_with(
            body,
            "section",
            &[("class", "panel"), ("data-index", &section_index.to_string())],
        );
        let list = doc.0.append_element(section, "ul");
        for item_index in 0..items {
            let class = if item_index % 2 == 0 { "item even" } else { "item" };
            doc.0
                .append_element_with(list, "li", &[("class", class)]);
        }
    }
    doc
}

fn bench_select(criterion: &mut Criterion) {
    let doc = build_page(20, 50);
    let engine = Engine::new();

    criterion.bench_function("select_class", |bencher| {
        bencher.iter(|| {
            let results = engine
                .select(&doc, black_box("li.item"), None, None)
                .unwrap();
            black_box(results)
        });
    });

    criterion.bench_function("select_nth_child", |bencher| {
        bencher.iter(|| {
            let results = engine
                .select(&doc, black_box("ul > li:nth-child(2n+1)"), None, None)
                .unwrap();
            black_box(results)
        });
    });

    criterion.bench_function("select_multi_expression", |bencher| {
        bencher.iter(|| {
            let results = engine
                .select(&doc, black_box("li.even, section.panel"), None, None)
                .unwrap();
            black_box(results)
        });
    });
}

fn bench_matches(criterion: &mut Criterion) {
    let doc = build_page(20, 50);
    let engine = Engine::new();
    let deepest = engine
        .select(&doc, "section:last-child li:last-child", None, None)
        .unwrap()[0];

    criterion.bench_function("matches_descendant_chain", |bencher| {
        bencher.iter(|| {
            engine
                .matches(
                    &doc,
                    black_box("html body section.panel ul li.item"),
                    deepest,
                    None,
                )
                .unwrap()
        });
    });

    criterion.bench_function("closest", |bencher| {
        bencher.iter(|| engine.closest(&doc, black_box("section.panel"), deepest, None).unwrap());
    });
}

fn bench_compile(criterion: &mut Criterion) {
    let doc = build_page(1, 1);
    criterion.bench_function("compile_cold", |bencher| {
        bencher.iter(|| {
            // A fresh engine per iteration defeats the compile cache.
            let engine = Engine::new();
            engine
                .matches(
                    &doc,
                    black_box("section.panel > ul li.item:not(.even):nth-child(2n+1)"),
                    doc.0.root().unwrap(),
                    None,
                )
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_select, bench_matches, bench_compile);
criterion_main!(benches);
