//! Architecture enforcement tests.
//!
//! The library is layered: `core` knows nothing above it, `engine` builds on
//! `core` only, and the CLI, UI and sample library sit on top. These tests
//! read the source tree and fail when a lower layer reaches upward, or when
//! library code panics instead of returning an error.
//!
//! # Test Categories
//!
//! 1. **Layer Imports** - `core` and `engine` must not import higher layers
//! 2. **Panics** - `core` and `engine` must not unwrap outside tests

use std::fs;
use std::path::{Path, PathBuf};

/// Imports a layer may not contain, keyed by its source directory.
const FORBIDDEN_IMPORTS: &[(&str, &[&str])] = &[
    (
        "src/core",
        &["crate::engine", "crate::cli", "crate::ui", "crate::demo"],
    ),
    ("src/engine", &["crate::cli", "crate::ui", "crate::demo"]),
];

/// Directories whose non-test code must propagate errors.
const NO_PANIC_DIRS: &[&str] = &["src/core", "src/engine"];

// =============================================================================
// Helpers
// =============================================================================

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap_or_else(|_| panic!("Failed to read {}", dir.display())) {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    files
}

/// Source lines before the unit-test module, without comment lines.
fn code_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(index, line)| (index + 1, line))
}

// =============================================================================
// Layer Imports
// =============================================================================

#[test]
fn lower_layers_do_not_import_higher_ones() {
    let mut violations = Vec::new();

    for (dir, forbidden) in FORBIDDEN_IMPORTS {
        for path in rust_files(Path::new(dir)) {
            let content = fs::read_to_string(&path).expect("Failed to read source");
            for (number, line) in code_lines(&content) {
                for import in *forbidden {
                    if line.contains(import) {
                        violations.push(format!("{}:{number}: uses {import}", path.display()));
                    }
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Layering violations:\n{}",
        violations.join("\n")
    );
}

// =============================================================================
// Panics
// =============================================================================

#[test]
fn library_code_does_not_unwrap() {
    let mut violations = Vec::new();

    for dir in NO_PANIC_DIRS {
        for path in rust_files(Path::new(dir)) {
            let content = fs::read_to_string(&path).expect("Failed to read source");
            for (number, line) in code_lines(&content) {
                if line.contains(".unwrap()") || line.contains(".expect(") {
                    violations.push(format!("{}:{number}: {}", path.display(), line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library code must return errors instead of panicking:\n{}",
        violations.join("\n")
    );
}
