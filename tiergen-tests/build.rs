fn main() {
    // Generate the School fixture into OUT_DIR; tests read it back with include_str!
    let report = tiergen_codegen::generate_from_cargo_metadata().expect("codegen failed");
    assert!(
        report.is_success(),
        "failed to write generated files: {:?}",
        report.failures
    );
}
