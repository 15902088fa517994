//! Import weight aggregation
//!
//! Reduces the per-file records of one scan into a count of how often each
//! package imports each path. Pure and deterministic: the same records
//! always produce an identical map, iterated in key order.

use crate::scanner::PackageInfo;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single `package -> import` relationship
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<'a> {
    pub package: &'a str,
    pub import: &'a str,
}

impl<'a> Edge<'a> {
    pub fn new(package: &'a str, import: &'a str) -> Self {
        Self { package, import }
    }

    /// Key used in the weight map
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Edge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.import)
    }
}

/// Edge key (`"<package>:<import>"`) to occurrence count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeightMap(BTreeMap<String, usize>);

impl WeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, edge: &Edge<'_>) {
        *self.0.entry(edge.key()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all weights
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Entries ordered by descending weight, ties broken by key
    pub fn heaviest(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn into_inner(self) -> BTreeMap<String, usize> {
        self.0
    }
}

impl<'a> IntoIterator for &'a WeightMap {
    type Item = (&'a String, &'a usize);
    type IntoIter = std::collections::btree_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Count every non-empty import of every record
pub fn build_weights(records: &[PackageInfo]) -> WeightMap {
    let mut weights = WeightMap::new();

    for record in records {
        for import in record.imports.iter().filter(|i| !i.is_empty()) {
            weights.increment(&Edge::new(&record.name, import));
        }
    }

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, imports: &[&str]) -> PackageInfo {
        PackageInfo::new(name, imports.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_repeated_imports_are_counted() {
        let weights = build_weights(&[record("P", &["a", "a", "b"])]);

        assert_eq!(weights.len(), 2);
        assert_eq!(weights.get("P:a"), Some(2));
        assert_eq!(weights.get("P:b"), Some(1));
        assert_eq!(weights.total(), 3);
    }

    #[test]
    fn test_same_package_across_files_accumulates() {
        let weights = build_weights(&[
            record("server", &["fmt", "net/http"]),
            record("server", &["fmt"]),
            record("client", &["fmt"]),
        ]);

        assert_eq!(weights.get("server:fmt"), Some(2));
        assert_eq!(weights.get("client:fmt"), Some(1));
        assert_eq!(weights.get("server:net/http"), Some(1));
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = vec![record("x", &["c", "a", "b", "a"]), record("y", &["a"])];
        let first = build_weights(&records);
        let second = build_weights(&records);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_imports_not_counted() {
        let weights = build_weights(&[record("p", &["", "fmt", ""])]);
        assert_eq!(weights.len(), 1);
        assert_eq!(weights.get("p:"), None);
    }

    #[test]
    fn test_no_records_yields_empty_map() {
        assert!(build_weights(&[]).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_object_in_key_order() {
        let weights = build_weights(&[record("p", &["zlib", "fmt"])]);
        assert_eq!(
            serde_json::to_string(&weights).unwrap(),
            r#"{"p:fmt":1,"p:zlib":1}"#
        );
    }

    #[test]
    fn test_heaviest_orders_by_weight_then_key() {
        let weights = build_weights(&[record("p", &["b", "a", "c", "c"])]);
        assert_eq!(weights.heaviest(), vec![("p:c", 2), ("p:a", 1), ("p:b", 1)]);
    }

    #[test]
    fn test_edge_display() {
        assert_eq!(Edge::new("main", "fmt").to_string(), "main:fmt");
    }
}
