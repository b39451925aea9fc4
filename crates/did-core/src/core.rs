//! # Core
//!
//! Serde helpers for JSON values that may take more than one shape.

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> Kind<T> {
    /// Returns the string value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// Returns the object value, if this is one.
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::String(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<&str> for Kind<T> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// `OneMany` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T: Clone> OneMany<T> {
    /// Convert the quantity to a vector.
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(one) => vec![one.clone()],
            Self::Many(many) => many.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;

    #[test]
    fn kind_round_trip() {
        let values: Vec<Kind<Map<String, Value>>> =
            serde_json::from_value(json!(["https://www.w3.org/ns/did/v1", {"@base": "did:ion:x"}]))
                .expect("failed to deserialize");
        assert_eq!(values[0].as_str(), Some("https://www.w3.org/ns/did/v1"));
        assert!(values[1].as_object().is_some_and(|o| o.contains_key("@base")));

        let json = serde_json::to_value(&values).expect("failed to serialize");
        assert_eq!(json, json!(["https://www.w3.org/ns/did/v1", {"@base": "did:ion:x"}]));
    }

    #[test]
    fn one_many() {
        let one: OneMany<String> = serde_json::from_value(json!("a")).expect("one");
        let many: OneMany<String> = serde_json::from_value(json!(["a", "b"])).expect("many");
        assert_eq!(one.to_vec(), vec!["a".to_string()]);
        assert_eq!(many.to_vec().len(), 2);
    }
}
