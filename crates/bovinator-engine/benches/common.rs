// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_c_declarations(count: usize) -> String {
    let mut content = String::new();
    for i in 0..count {
        content.push_str(&format!("/* item {i} */\nint value_{i} = {i};\n"));
        content.push_str(&format!(
            "int function_{i}(int a, int b) {{ return a + b * {i}; }}\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn generate_nested_lists(forms: usize, depth: usize) -> String {
    let mut content = String::new();
    for i in 0..forms {
        content.push_str(&format!("(form-{i} "));
        content.push_str(&"(a \"s\" ".repeat(depth));
        content.push_str(&")".repeat(depth));
        content.push_str(")\n");
    }
    content
}
