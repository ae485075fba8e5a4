//! Ordered NASC parameter set.

use crate::codec::{decode_value, encode_value, encode_form};

/// Request or response parameters.
///
/// Values are kept in their encoded wire form. Setting a key twice keeps both pairs; lookups
/// return the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NascParams {
    pairs: Vec<(String, String)>,
}

impl NascParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps pairs that are already in wire form, such as a decoded response body.
    pub fn from_encoded(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Encodes `value` and appends it under `key`.
    pub fn set(&mut self, key: &str, value: impl AsRef<[u8]>) {
        self.pairs.push((key.to_owned(), encode_value(value)));
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Wire form of the first value under `key`.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Decoded first value under `key`. Undecodable values count as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = self.get_raw(key)?;
        let bytes = decode_value(raw).ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decoded first value under `key`, parsed as an integer.
    pub fn get_parsed<T: core::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.trim().parse().ok()
    }

    /// Form body carrying every pair in insertion order.
    pub fn to_form(&self) -> String {
        encode_form(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_encodes_and_get_decodes() {
        let mut params = NascParams::new();
        params.set("gameid", "00003200");
        params.set("mediatype", "1");

        assert_eq!(params.get_raw("mediatype"), Some("MQ**"));
        assert_eq!(params.get("gameid").as_deref(), Some("00003200"));
        assert_eq!(params.get_parsed::<u32>("mediatype"), Some(1));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_first_value_wins() {
        let mut params = NascParams::new();
        params.set("action", "LOGIN");
        params.set("action", "SVCLOC");
        assert_eq!(params.get("action").as_deref(), Some("LOGIN"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_form_keeps_order() {
        let mut params = NascParams::new();
        params.set("b", "1");
        params.set("a", "001");
        assert_eq!(params.to_form(), "b=MQ%2A%2A&a=MDAx");
    }
}
