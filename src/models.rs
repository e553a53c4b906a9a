//! Data models for scraped marketplace listings.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Record`]: One listing projected out of the rendered search page
//! - [`RecordStore`]: The ordered collection of records gathered in a session
//!
//! Every field of a [`Record`] is optional. A listing whose markup lacks a
//! sub-element simply carries `None` for that field; nothing downstream
//! substitutes a placeholder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single marketplace listing as scraped from the search page.
///
/// Field order here is also the CSV column order used by
/// [`crate::outputs::csv`].
///
/// # Fields
///
/// * `link` - Absolute URL of the listing (site origin + scraped href)
/// * `common` - Rarity tier label
/// * `name` - Player or team name; used as the filter key
/// * `lowest_ask` - Lowest ask price, display-formatted
/// * `avg_sale` - Average sale price, display-formatted
/// * `hook_shot` - Play type / set label shown on the card
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    pub link: Option<String>,
    pub common: Option<String>,
    pub name: Option<String>,
    pub lowest_ask: Option<String>,
    pub avg_sale: Option<String>,
    pub hook_shot: Option<String>,
}

impl Record {
    /// Column names in serialization order.
    pub const FIELDS: [&'static str; 6] =
        ["link", "common", "name", "lowest_ask", "avg_sale", "hook_shot"];

    /// True when this record's `name` is exactly `target`.
    pub fn has_name(&self, target: &str) -> bool {
        self.name.as_deref() == Some(target)
    }
}

/// Ordered, append-only collection of [`Record`]s.
///
/// Populated once by the extractor, then only read. Insertion order is
/// preserved by every read operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the end of the store.
    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    /// The full ordered sequence of records.
    pub fn to_sequence(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique, non-absent names across all records. Iteration order is unspecified.
    pub fn distinct_names(&self) -> HashSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.name.clone())
            .collect()
    }

    /// Records whose name equals `target` exactly, in insertion order.
    pub fn filter_by_name(&self, target: &str) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| r.has_name(target))
            .cloned()
            .collect()
    }

    /// First record carrying `name`, if any.
    pub fn find(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.has_name(name))
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<Record> for RecordStore {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.append(record);
        }
    }
}

impl IntoIterator for RecordStore {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, ask: &str) -> Record {
        Record {
            name: Some(name.to_string()),
            lowest_ask: Some(ask.to_string()),
            ..Default::default()
        }
    }

    fn sample_store() -> RecordStore {
        [
            named("A", "$1"),
            named("B", "$2"),
            named("A", "$3"),
            named("C", "$4"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = RecordStore::new();
        assert!(store.is_empty());
        store.append(named("first", "$1"));
        store.append(named("second", "$2"));

        let names: Vec<_> = store.iter().map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec![Some("first"), Some("second")]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_to_sequence_is_restartable() {
        let store = sample_store();
        assert_eq!(store.to_sequence(), store.to_sequence());
        assert_eq!(store.to_sequence().len(), 4);
    }

    #[test]
    fn test_distinct_names_deduplicates() {
        let names = sample_store().distinct_names();
        assert_eq!(names.len(), 3);
        for expected in ["A", "B", "C"] {
            assert!(names.contains(expected));
        }
    }

    #[test]
    fn test_distinct_names_skips_absent() {
        let mut store = sample_store();
        store.append(Record::default());
        assert_eq!(store.distinct_names().len(), 3);
    }

    #[test]
    fn test_filter_by_name_keeps_insertion_order() {
        let filtered = sample_store().filter_by_name("A");
        let asks: Vec<_> = filtered.iter().map(|r| r.lowest_ask.as_deref()).collect();
        assert_eq!(asks, vec![Some("$1"), Some("$3")]);
        assert!(filtered.iter().all(|r| r.has_name("A")));
    }

    #[test]
    fn test_filter_by_name_is_exact() {
        let store = sample_store();
        assert!(store.filter_by_name("a").is_empty());
        assert!(store.filter_by_name("A ").is_empty());
        assert!(store.filter_by_name("").is_empty());
    }

    #[test]
    fn test_find_returns_first_match() {
        let store = sample_store();
        assert_eq!(
            store.find("A").and_then(|r| r.lowest_ask.as_deref()),
            Some("$1")
        );
        assert!(store.find("Z").is_none());
    }
}
