//! Imported tabular data: flat header → value records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One imported row. Columns the row did not supply are absent, not empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.0.get(header).map(String::as_str)
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.0.insert(header.into(), value.into());
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Case-insensitive substring match against any value.
    /// `needle` must already be lowercase.
    fn matches_lower(&self, needle: &str) -> bool {
        self.values().any(|v| v.to_lowercase().contains(needle))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The result of an import: header list in file order plus ordered records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indices of records with any value containing `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| needle.is_empty() || r.matches_lower(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> RecordSet {
        RecordSet::new(
            vec!["Name".into(), "Price".into()],
            vec![
                [("Name", "Weller Special Reserve"), ("Price", "19.99")].into_iter().collect(),
                [("Name", "Stolichnaya"), ("Price", "18.99")].into_iter().collect(),
                [("Name", "Buffalo Trace")].into_iter().collect(),
            ],
        )
    }

    #[test]
    fn search_is_case_insensitive_over_all_values() {
        let set = sample();
        assert_eq!(set.search("WELLER"), vec![0]);
        assert_eq!(set.search("18.9"), vec![1]);
        assert_eq!(set.search(""), vec![0, 1, 2]);
        assert!(set.search("mezcal").is_empty());
    }

    #[test]
    fn missing_columns_are_absent() {
        let set = sample();
        assert_eq!(set.get(2).unwrap().get("Price"), None);
        assert_eq!(set.get(2).unwrap().get("Name"), Some("Buffalo Trace"));
    }
}
