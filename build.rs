// Build script to ensure Windows stack size is set correctly.
//
// The scanner's nested-comment skipper and the parser's expression descent
// both recurse with the input; deeply nested source can overflow the default
// Windows stack well before it would touch the Unix default.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Check if we're compiling for Windows (not if we're ON Windows)
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if target_os == "windows" {
        let target_env = std::env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();

        match target_env.as_str() {
            "msvc" => {
                println!("cargo:rustc-link-arg=/STACK:16777216");
            }
            "gnu" => {
                println!("cargo:rustc-link-arg=-Wl,--stack,16777216");
            }
            _ => {
                eprintln!(
                    "warning: unknown Windows target environment: {}",
                    target_env
                );
            }
        }
    }
}
