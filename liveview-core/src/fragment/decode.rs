//! JSON decoding of fragment diffs.

use serde_json::{Map, Value};

use super::{FragmentPatch, Slot, STATICS_KEY};
use crate::error::DecodeError;

impl FragmentPatch {
    /// Decodes a fragment diff from its JSON wire form.
    ///
    /// Only the shape is checked here; whether the patch fits a document is
    /// decided when it is merged.
    pub fn decode(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(map) => Self::from_object(map, &mut Vec::new()),
            other => Err(DecodeError::NotAnObject {
                path: Vec::new(),
                found: kind(&other),
            }),
        }
    }

    fn from_object(map: Map<String, Value>, path: &mut Vec<usize>) -> Result<Self, DecodeError> {
        let mut patch = FragmentPatch::new();

        for (key, value) in map {
            if key == STATICS_KEY {
                patch.statics = Some(statics(value, path)?);
                continue;
            }

            let index = parse_index(&key).ok_or_else(|| DecodeError::InvalidKey {
                path: path.clone(),
                key: key.clone(),
            })?;

            path.push(index);
            let slot = match value {
                Value::String(markup) => Slot::Markup(markup),
                Value::Object(nested) => Slot::Fragment(Self::from_object(nested, path)?),
                other => {
                    return Err(DecodeError::InvalidSlot {
                        path: path.clone(),
                        found: kind(&other),
                    })
                }
            };
            path.pop();
            patch.slots.insert(index, slot);
        }

        if let Some(statics) = &patch.statics {
            let slots = statics.len() - 1;
            if let Some((&index, _)) = patch.slots.range(slots..).next() {
                return Err(DecodeError::SlotOutOfRange {
                    path: path.clone(),
                    index,
                    slots,
                });
            }
        }

        Ok(patch)
    }
}

fn statics(value: Value, path: &[usize]) -> Result<Vec<String>, DecodeError> {
    let invalid = || DecodeError::InvalidStatics {
        path: path.to_vec(),
    };
    let Value::Array(items) = value else {
        return Err(invalid());
    };
    if items.is_empty() {
        return Err(invalid());
    }
    items
        .into_iter()
        .map(|item| match item {
            Value::String(piece) => Ok(piece),
            _ => Err(invalid()),
        })
        .collect()
}

/// Parses a canonical decimal index: no sign, no leading zeros.
fn parse_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nested() {
        let patch = FragmentPatch::decode(
            r#"{
                "0": {"0": "<Text>Success!</Text>", "s": ["<VStack>", "</VStack>"]},
                "s": ["<VStack modifiers>", "</VStack>"]
            }"#,
        )
        .unwrap();

        assert_eq!(
            patch.statics().unwrap(),
            ["<VStack modifiers>", "</VStack>"]
        );
        let Some(Slot::Fragment(nested)) = patch.slot(0) else {
            panic!("expected a nested fragment");
        };
        assert_eq!(
            nested.slot(0),
            Some(&Slot::Markup("<Text>Success!</Text>".to_string()))
        );
    }

    #[test]
    fn test_decode_reconstructs_markup() {
        let patch =
            FragmentPatch::decode(r#"{"0":"<Text>Hi</Text>","s":["<VStack>","</VStack>"]}"#)
                .unwrap();
        assert_eq!(patch.to_markup().unwrap(), "<VStack><Text>Hi</Text></VStack>");
    }

    #[test]
    fn test_decode_partial_diff() {
        let patch = FragmentPatch::decode(r#"{"1": "<Text/>"}"#).unwrap();
        assert!(patch.statics().is_none());
        assert_eq!(patch.slots().count(), 1);
        assert!(FragmentPatch::decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = FragmentPatch::decode("<VStack modifiers=\"\"></VStack>").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)), "{err:?}");
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = FragmentPatch::decode("[1, 2]").unwrap_err();
        assert!(
            matches!(err, DecodeError::NotAnObject { found: "array", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_decode_rejects_number_slot() {
        let err = FragmentPatch::decode(r#"{"0": 42, "s": ["<A>", "</A>"]}"#).unwrap_err();
        assert!(
            matches!(err, DecodeError::InvalidSlot { ref path, found: "number" } if path == &[0]),
            "{err:?}"
        );
    }

    #[test]
    fn test_decode_rejects_bad_keys() {
        for json in [r#"{"x": "a"}"#, r#"{"01": "a"}"#, r#"{"-1": "a"}"#, r#"{"": "a"}"#] {
            let err = FragmentPatch::decode(json).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidKey { .. }), "{json}: {err:?}");
        }
    }

    #[test]
    fn test_decode_rejects_bad_statics() {
        for json in [
            r#"{"s": "<A/>"}"#,
            r#"{"s": []}"#,
            r#"{"s": ["<A>", 1]}"#,
            r#"{"0": {"s": null}, "s": ["", ""]}"#,
        ] {
            let err = FragmentPatch::decode(json).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidStatics { .. }), "{json}: {err:?}");
        }
    }

    #[test]
    fn test_decode_rejects_slot_out_of_range() {
        let err = FragmentPatch::decode(r#"{"2": "x", "s": ["<A>", "</A>"]}"#).unwrap_err();
        assert!(
            matches!(err, DecodeError::SlotOutOfRange { index: 2, slots: 1, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("17"), Some(17));
        assert_eq!(parse_index("007"), None);
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index("s"), None);
    }
}
