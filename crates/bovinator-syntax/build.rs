/// Generates one test function per source file in src/fixtures/.
/// Each test gets its own name in the runner while sharing one checker.
fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let dest = std::path::Path::new(&out_dir).join("fixture_tests.rs");

    let mut code = String::from(
        r#"mod lex_fixtures {
    use super::fixture_test;
"#,
    );

    let mut entries: Vec<_> = std::fs::read_dir("src/fixtures")
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext != "el" && ext != "c" {
            continue;
        }
        let stem = path.file_stem().unwrap().to_str().unwrap();
        let file = path.file_name().unwrap().to_str().unwrap();
        let name = format!("{}_{ext}", stem.replace('-', "_"));
        code.push_str(&format!(
            r#"
    #[test]
    fn {name}() {{
        fixture_test("{file}");
    }}
"#
        ));
    }

    code.push_str("}\n");
    std::fs::write(&dest, code).unwrap();

    // Rerun if fixtures change
    println!("cargo::rerun-if-changed=src/fixtures");
}
