//! Fixture builders for scanner tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary project tree from `(relative path, contents)` pairs
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for (relative, contents) in files {
        write_file(dir.path(), relative, contents);
    }
    dir
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(path, contents).expect("Failed to write fixture file");
}

/// Go source with the given package and a closed import block
pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut source = format!("package {}\n\nimport (\n", package);
    for import in imports {
        source.push_str(&format!("\t\"{}\"\n", import));
    }
    source.push_str(")\n\nfunc main() {}\n");
    source
}
