use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

/// Item codes as a caller supplies them: one code or a list.
///
/// Callers often pass a JSON-encoded list as a plain string.
/// [`ItemCodes::parse`] accepts that form; a string that is not a JSON list
/// is taken as a single code. Deserializing applies the same rule to string
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawItemCodes")]
pub enum ItemCodes {
    /// A single item code.
    One(String),
    /// Several item codes, possibly with duplicates or blanks.
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemCodes {
    Text(String),
    List(Vec<Value>),
}

impl From<RawItemCodes> for ItemCodes {
    fn from(raw: RawItemCodes) -> Self {
        match raw {
            RawItemCodes::Text(s) => ItemCodes::parse(&s),
            RawItemCodes::List(values) => ItemCodes::Many(codes_from_values(values)),
        }
    }
}

/// String elements are kept, numbers are stringified, anything else is dropped.
fn codes_from_values(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

impl ItemCodes {
    /// Parse a raw string argument.
    ///
    /// - a JSON array becomes its elements
    /// - a JSON string becomes that one code
    /// - anything else is the raw text as one code
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(values)) => ItemCodes::Many(codes_from_values(values)),
            Ok(Value::String(s)) => ItemCodes::One(s),
            _ => ItemCodes::One(raw.to_owned()),
        }
    }

    /// Trimmed, non-blank codes with duplicates removed (first occurrence kept).
    pub fn normalized(&self) -> Vec<String> {
        let raw: &[String] = match self {
            ItemCodes::One(code) => std::slice::from_ref(code),
            ItemCodes::Many(codes) => codes,
        };

        let mut seen = HashSet::new();
        raw.iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .filter(|c| seen.insert(*c))
            .map(str::to_owned)
            .collect()
    }

    /// `true` when no usable code remains after normalization.
    pub fn is_empty(&self) -> bool {
        self.normalized().is_empty()
    }
}

impl From<&str> for ItemCodes {
    fn from(code: &str) -> Self {
        ItemCodes::One(code.to_owned())
    }
}

impl From<Vec<String>> for ItemCodes {
    fn from(codes: Vec<String>) -> Self {
        ItemCodes::Many(codes)
    }
}

impl<'a> FromIterator<&'a str> for ItemCodes {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        ItemCodes::Many(iter.into_iter().map(str::to_owned).collect())
    }
}
