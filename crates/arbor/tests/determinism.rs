//! Property tests: analysis is a pure function of (text, language).

use std::fmt::Write as _;

use arbor::extract::extract;
use arbor::parser::parse;
use arbor::{Budget, Language};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

/// Python module built from classes, functions, assignments, and stray junk.
fn python_source() -> impl Strategy<Value = String> {
    let item = prop_oneof![
        (identifier(), prop::collection::vec(identifier(), 0..3)).prop_map(|(name, methods)| {
            let mut out = format!("class C_{name}:\n");
            if methods.is_empty() {
                out.push_str("    pass\n");
            }
            for method in methods {
                write!(out, "    def {method}(self, x):\n        return x\n").unwrap();
            }
            out
        }),
        (identifier(), identifier())
            .prop_map(|(name, arg)| format!("def {name}({arg}):\n    return {arg}({arg})\n")),
        (identifier(), 0u32..1000).prop_map(|(name, value)| format!("{name} = {value}\n")),
        Just("= = (\n".to_string()),
    ];
    prop::collection::vec(item, 0..8).prop_map(|items| items.concat())
}

/// Rust file built from structs, impls, and functions.
fn rust_source() -> impl Strategy<Value = String> {
    let item = prop_oneof![
        identifier().prop_map(|name| format!("pub struct S{name} {{ value: u32 }}\n")),
        (identifier(), identifier()).prop_map(|(ty, method)| {
            format!("impl T{ty} {{\n    fn {method}(&self) -> u32 {{ helper() }}\n}}\n")
        }),
        identifier().prop_map(|name| format!("fn {name}() {{ let x = 1; }}\n")),
        Just("fn broken( {\n".to_string()),
    ];
    prop::collection::vec(item, 0..8).prop_map(|items| items.concat())
}

fn analyze_twice(text: &str, language: Language) {
    let budget = Budget::default();
    let first = parse(text, language, &budget).expect("grammar loads");
    let second = parse(text, language, &budget).expect("grammar loads");
    assert_eq!(first.root, second.root);
    assert_eq!(first.errors, second.errors);

    let outline_a = extract(&first.root, text, language, &budget);
    let outline_b = extract(&second.root, text, language, &budget);
    assert_eq!(outline_a, outline_b);

    // Ids are dense and in pre-order.
    let ids: Vec<u32> = outline_a.flatten().iter().map(|(s, _)| s.id.0).collect();
    let expected: Vec<u32> = (0..u32::try_from(ids.len()).expect("small outline")).collect();
    assert_eq!(ids, expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn python_analysis_is_deterministic(text in python_source()) {
        analyze_twice(&text, Language::Python);
    }

    #[test]
    fn rust_analysis_is_deterministic(text in rust_source()) {
        analyze_twice(&text, Language::Rust);
    }

    #[test]
    fn symbol_spans_lie_inside_the_text(text in python_source()) {
        let budget = Budget::default();
        let parsed = parse(&text, Language::Python, &budget).expect("grammar loads");
        let outline = extract(&parsed.root, &text, Language::Python, &budget);
        for (symbol, _) in outline.flatten() {
            prop_assert!(symbol.span.end_byte <= text.len());
            prop_assert!(symbol.span.start_byte <= symbol.name_span.start_byte);
            prop_assert!(symbol.name_span.end_byte <= symbol.span.end_byte);
        }
    }
}
