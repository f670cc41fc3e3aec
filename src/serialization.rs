//! JSON helpers that never fail the caller.

use serde::Serialize;
use tracing::error;

/// Compact JSON text for `value`, or `""` when it cannot be serialized.
pub fn serialize_to_json_string<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "Failed to serialize value to JSON");
            String::new()
        }
    }
}

/// Two-space indented JSON text for `value`, or `""` when it cannot be serialized.
pub fn serialize_to_pretty_json_string<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "Failed to serialize value to JSON");
            String::new()
        }
    }
}

/// Serde adapter writing integers wider than JSON numbers (`i128`, `u128`)
/// as decimal strings.
///
/// ```ignore
/// #[serde(with = "spapi_toolkit::serialization::decimal_string")]
/// pub quantity: u128,
/// ```
pub mod decimal_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Ledger {
        name: String,
        #[serde(with = "decimal_string")]
        balance: i128,
        #[serde(with = "decimal_string")]
        units: u128,
    }

    #[test]
    fn plain_values() {
        assert_eq!(serialize_to_json_string(&json!({"a": 1, "b": [true, null]})), r#"{"a":1,"b":[true,null]}"#);
        assert_eq!(serialize_to_json_string("text"), r#""text""#);
        assert_eq!(serialize_to_json_string(&42u8), "42");
    }

    #[test]
    fn wide_integers_become_strings() {
        let ledger = Ledger {
            name: "fees".to_string(),
            balance: i128::MIN,
            units: u128::MAX,
        };

        let json = serialize_to_json_string(&ledger);
        assert_eq!(
            json,
            r#"{"name":"fees","balance":"-170141183460469231731687303715884105728","units":"340282366920938463463374607431768211455"}"#
        );

        let back: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let result: Result<Ledger, _> =
            serde_json::from_str(r#"{"name":"x","balance":"12abc","units":"1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unserializable_value_yields_empty_string() {
        let mut map: BTreeMap<Vec<u8>, u8> = BTreeMap::new();
        map.insert(vec![1, 2], 3);

        assert_eq!(serialize_to_json_string(&map), "");
        assert_eq!(serialize_to_pretty_json_string(&map), "");
    }

    #[test]
    fn pretty_output_uses_two_spaces() {
        assert_eq!(
            serialize_to_pretty_json_string(&json!({"a": [1]})),
            "{\n  \"a\": [\n    1\n  ]\n}"
        );
    }
}
