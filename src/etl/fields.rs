//! Serde helpers for the loosely typed source records.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// A field that must be present but may be `null`.
///
/// Plain `Option` fields default to `None` when the key is missing; going
/// through `deserialize_with` turns a missing key into a "missing field" error.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// An identifier written either as a JSON string or as a JSON integer.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// An integer written either as a JSON integer or as a numeric JSON string.
pub fn integer_or_numeric_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IntVisitor;

    impl<'de> Visitor<'de> for IntVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("integer {} out of range", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("'{}' is not an integer", v)))
        }
    }

    deserializer.deserialize_any(IntVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(deserialize_with = "integer_or_numeric_string")]
        session: i64,
        #[serde(deserialize_with = "nullable")]
        note: Option<String>,
    }

    #[test]
    fn test_accepts_both_spellings() {
        let a: Probe = serde_json::from_value(json!({"id": "39", "session": 12, "note": null}))
            .unwrap();
        let b: Probe = serde_json::from_value(json!({"id": 39, "session": "12", "note": "x"}))
            .unwrap();

        assert_eq!(a.id, "39");
        assert_eq!(b.id, "39");
        assert_eq!(a.session, 12);
        assert_eq!(b.session, 12);
        assert_eq!(a.note, None);
        assert_eq!(b.note.as_deref(), Some("x"));
    }

    #[test]
    fn test_nullable_field_must_be_present() {
        let err = serde_json::from_value::<Probe>(json!({"id": "1", "session": 1}))
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing field `note`"));
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(serde_json::from_value::<Probe>(json!({"id": 1.5, "session": 1, "note": null})).is_err());
        assert!(
            serde_json::from_value::<Probe>(json!({"id": "1", "session": "abc", "note": null}))
                .is_err()
        );
        assert!(serde_json::from_value::<Probe>(json!({"id": null, "session": 1, "note": null})).is_err());
    }
}
