//! Raw query parameters, an ordered multimap.
//!
//! The repeatable keys (`quote`, `dequote`) need multiple values per
//! key, so this is a list of pairs rather than a map.

/// An ordered collection of raw key/value query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    entries: Vec<(String, String)>,
}

impl RawParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values for a key with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value.into()));
    }

    /// Add a value for a key, keeping any existing values.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Chaining variant of [`RawParams::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// The first value for a key, or the empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Every value for a key, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether the key is present at all.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DEQUOTE, FILTER};

    #[test]
    fn test_set_replaces_all_values() {
        let mut params = RawParams::new();
        params.append(FILTER, "a eq 1");
        params.append(FILTER, "b eq 2");
        params.set(FILTER, "c eq 3");

        assert_eq!(params.get(FILTER), "c eq 3");
        assert_eq!(params.get_all(FILTER), vec!["c eq 3"]);
    }

    #[test]
    fn test_repeatable_keys() {
        let mut params = RawParams::new();
        params.append(DEQUOTE, "ROWID");
        params.append(DEQUOTE, "ROWMODID");

        assert!(params.has(DEQUOTE));
        assert_eq!(params.get(DEQUOTE), "ROWID");
        assert_eq!(params.get_all(DEQUOTE), vec!["ROWID", "ROWMODID"]);
    }

    #[test]
    fn test_missing_key_is_empty_string() {
        let params = RawParams::new();
        assert_eq!(params.get("absent"), "");
        assert!(!params.has("absent"));
        assert!(params.get_all("absent").is_empty());
    }

    #[test]
    fn test_from_iterator() {
        let params: RawParams = [("$top", "10"), ("$skip", "20")].into_iter().collect();
        assert_eq!(params.get("$top"), "10");
        assert_eq!(params.get("$skip"), "20");
    }
}
