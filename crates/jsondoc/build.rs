//! Build script for jsondoc
//!
//! The page chrome is embedded with `include_str!`, so template edits
//! must trigger a rebuild.

fn main() {
    println!("cargo:rerun-if-changed=src/html/templates/");
    println!("cargo:rerun-if-changed=build.rs");
}
