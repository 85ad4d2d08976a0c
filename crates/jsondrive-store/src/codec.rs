//! Byte-exact JSON encoding for stored records.
//!
//! Records are pretty-printed with an empty line prefix, a configurable
//! indentation unit repeated once per nesting level, `": "` between keys and
//! values, and a single trailing newline.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Indentation used by existing databases: a tab followed by a space.
pub const DEFAULT_INDENT: &str = "\t ";

/// Encode `value` as an indented JSON document terminated by `\n`.
pub fn encode<T: Serialize + ?Sized>(value: &T, indent: &str) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Decode a stored document. Surrounding whitespace, including the trailing
/// newline, is accepted.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Address {
        city: String,
        state: String,
    }

    #[test]
    fn nested_layout_is_byte_exact() {
        let value = json!({"Name": "Rohan", "Address": {"City": "bhopal"}});
        let bytes = encode(&value, DEFAULT_INDENT).unwrap();
        let expected = "{\n\t \"Address\": {\n\t \t \"City\": \"bhopal\"\n\t },\n\t \"Name\": \"Rohan\"\n}\n";
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn arrays_and_empty_containers() {
        let bytes = encode(&json!({"a": [1, 2], "b": [], "c": {}}), DEFAULT_INDENT).unwrap();
        let expected = "{\n\t \"a\": [\n\t \t 1,\n\t \t 2\n\t ],\n\t \"b\": [],\n\t \"c\": {}\n}\n";
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn scalar_gets_trailing_newline() {
        assert_eq!(encode(&42, DEFAULT_INDENT).unwrap(), b"42\n");
        assert_eq!(encode("hi", "  ").unwrap(), b"\"hi\"\n");
    }

    #[test]
    fn custom_indent() {
        let bytes = encode(&json!({"n": 1}), "  ").unwrap();
        assert_eq!(bytes, b"{\n  \"n\": 1\n}\n");
    }

    #[test]
    fn struct_decodes_from_encoded_bytes() {
        let addr = Address {
            city: "bhopal".into(),
            state: "MadhyaPradesh".into(),
        };
        let bytes = encode(&addr, DEFAULT_INDENT).unwrap();
        let back: Address = decode(&bytes).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn decode_rejects_malformed() {
        assert!(decode::<serde_json::Value>(b"{\"n\": ").is_err());
    }

    #[test]
    fn encode_rejects_non_string_keys() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert!(encode(&map, DEFAULT_INDENT).is_err());
    }
}
