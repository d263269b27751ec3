//! Architecture contract tests.

mod support;

use support::architecture::{find_lines_containing, find_logic_lines_in_mod_files, path_exists};

#[test]
fn cli_has_no_direct_infrastructure_imports() {
    let hits = find_lines_containing(
        "src/adapter/inbound/cli",
        &["use crate::infrastructure", "crate::infrastructure::"],
    );

    assert!(
        hits.is_empty(),
        "found direct infrastructure imports in inbound CLI adapters: {hits:#?}"
    );
}

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "good_lp",
            "std::fs",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn domain_arithmetic_is_decimal_only() {
    let hits = find_lines_containing("src/domain", &["f64", "f32"]);
    assert!(hits.is_empty(), "found floating point in domain layer: {hits:#?}");
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter::", "crate::infrastructure::"],
    );
    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::application", "crate::infrastructure"],
    );
    assert!(hits.is_empty(), "ports reach outward: {hits:#?}");
}

#[test]
fn solver_library_stays_behind_the_adapter() {
    let hits: Vec<_> = find_lines_containing("src", &["good_lp"])
        .into_iter()
        .filter(|(path, _, _)| !path.starts_with("src/adapter/outbound/solver/"))
        .collect();
    assert!(hits.is_empty(), "good_lp used outside the solver adapter: {hits:#?}");
    assert!(path_exists("src/adapter/outbound/solver/highs.rs"));
}

#[test]
fn production_code_does_not_unwrap() {
    let hits = find_lines_containing("src", &[".unwrap()", ".expect("]);
    assert!(hits.is_empty(), "found unwrap/expect outside tests: {hits:#?}");
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_logic_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}
