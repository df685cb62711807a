//! Ordered, case-preserving header storage and proxy-header normalization

use serde::{Deserialize, Serialize};

/// HTTP header mapping: insertion-ordered, case-preserving names,
/// case-insensitive lookup, multiple values per name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    /// Create an empty header map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value under `name`, extending an existing entry
    /// (matched case-insensitively) or creating a new one
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.extend_values(name.into(), vec![value.into()]);
    }

    /// Append several values under `name` with the same merge semantics
    /// as [`HeaderMap::append`]
    pub fn extend_values(&mut self, name: String, values: Vec<String>) {
        if let Some((_, existing)) = self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            existing.extend(values);
        } else {
            self.entries.push((name, values));
        }
    }

    /// Merge every entry of `other` into this map, extending value lists
    /// for names that already exist
    pub fn merge(&mut self, other: HeaderMap) {
        for (name, values) in other.entries {
            self.extend_values(name, values);
        }
    }

    /// Look up the values stored under `name`, case-insensitively
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// Look up `name` and join its values with `", "`, the combined form
    /// header consumers expect for repeated names
    #[must_use]
    pub fn get_joined(&self, name: &str) -> Option<String> {
        self.get(name).map(|values| values.join(", "))
    }

    /// True if an entry matching `name` case-insensitively exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the entry matching `name` case-insensitively, returning it
    pub fn remove(&mut self, name: &str) -> Option<(String, Vec<String>)> {
        let index = self
            .entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index))
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no headers are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// Coerce proxy-specific headers into their non-proxied form.
///
/// Recordings must be identical whether or not a forward proxy was in the
/// path, so this runs before persistence and before comparison:
///
/// * `proxy-connection` is renamed to `connection` (the text after the
///   first `-`, keeping the original segment's case)
/// * `proxy-authorization` is removed
/// * everything else passes through unchanged, order and values intact
#[must_use]
pub fn transform_proxy_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, values) in headers.iter() {
        if name.eq_ignore_ascii_case("proxy-connection") {
            let renamed = name.split_once('-').map_or("connection", |(_, rest)| rest);
            filtered.extend_values(renamed.to_string(), values.to_vec());
        } else if !name.eq_ignore_ascii_case("proxy-authorization") {
            filtered.extend_values(name.to_string(), values.to_vec());
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut headers = HeaderMap::new();
        headers.append("Content-Type", "text/plain");
        headers.append("X-Request-Id", "abc");
        headers.append("Accept", "*/*");

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Content-Type", "X-Request-Id", "Accept"]);
    }

    #[test]
    fn test_append_extends_existing_entry_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("SET-COOKIE").unwrap(),
            &["a=1".to_string(), "b=2".to_string()]
        );
    }

    #[test]
    fn test_get_joined_combines_values() {
        let mut headers = HeaderMap::new();
        headers.append("Vary", "Accept");
        headers.append("Vary", "Accept-Encoding");

        assert_eq!(
            headers.get_joined("vary").as_deref(),
            Some("Accept, Accept-Encoding")
        );
        assert_eq!(headers.get_joined("missing"), None);
    }

    #[test]
    fn test_remove_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.append("Transfer-Encoding", "chunked");

        let removed = headers.remove("TRANSFER-ENCODING").unwrap();
        assert_eq!(removed.0, "Transfer-Encoding");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_transform_renames_proxy_connection_keeping_case() {
        let headers: HeaderMap = [("Proxy-Connection", "keep-alive")].into_iter().collect();

        let filtered = transform_proxy_headers(&headers);
        assert_eq!(filtered.get("Connection").unwrap(), &["keep-alive"]);
        assert!(!filtered.contains("proxy-connection"));

        let names: Vec<&str> = filtered.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Connection"]);
    }

    #[test]
    fn test_transform_renames_lowercase_proxy_connection() {
        let headers: HeaderMap = [("proxy-connection", "close")].into_iter().collect();

        let filtered = transform_proxy_headers(&headers);
        let names: Vec<&str> = filtered.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["connection"]);
    }

    #[test]
    fn test_transform_drops_proxy_authorization() {
        let headers: HeaderMap = [
            ("Proxy-Authorization", "Basic dXNlcjpwYXNz"),
            ("Authorization", "Bearer token"),
        ]
        .into_iter()
        .collect();

        let filtered = transform_proxy_headers(&headers);
        assert!(!filtered.contains("proxy-authorization"));
        assert_eq!(filtered.get("Authorization").unwrap(), &["Bearer token"]);
    }

    #[test]
    fn test_transform_passes_other_headers_through_unchanged() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("Set-Cookie", "b=2");
        headers.append("Content-Length", "42");

        let filtered = transform_proxy_headers(&headers);
        assert_eq!(filtered, headers);
    }

    // Names without a hyphen can never match the two proxy rules.
    fn plain_header_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9]{0,15}"
    }

    proptest! {
        #[test]
        fn prop_transform_preserves_plain_headers(
            entries in proptest::collection::vec(
                (plain_header_name(), proptest::collection::vec("[ -~]{0,32}", 1..4)),
                0..8,
            )
        ) {
            let mut headers = HeaderMap::new();
            for (name, values) in &entries {
                headers.extend_values(name.clone(), values.clone());
            }

            let filtered = transform_proxy_headers(&headers);
            prop_assert_eq!(filtered, headers);
        }

        #[test]
        fn prop_transform_always_removes_proxy_authorization(
            value in "[ -~]{0,32}",
            others in proptest::collection::vec((plain_header_name(), "[ -~]{0,32}"), 0..4),
        ) {
            let mut headers = HeaderMap::new();
            headers.append("Proxy-Authorization", value);
            for (name, other_value) in others {
                headers.append(name, other_value);
            }

            let filtered = transform_proxy_headers(&headers);
            prop_assert!(!filtered.contains("proxy-authorization"));
        }
    }
}
