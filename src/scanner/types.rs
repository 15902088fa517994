//! Scanner Types

use serde::Serialize;

/// Package name and raw import lines of one source file
///
/// Only produced for files whose import block was explicitly closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub imports: Vec<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, imports: Vec<String>) -> Self {
        Self {
            name: name.into(),
            imports,
        }
    }
}

impl std::fmt::Display for PackageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Package ({}) imports ({})",
            self.name,
            self.imports.join(" | ")
        )
    }
}
