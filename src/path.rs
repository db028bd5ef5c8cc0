//! Canonical paths into the tracked graph.

use crate::error::StoreError;
use crate::types::Value;
use serde::Serialize;
use std::fmt;

/// Key of the root path.
pub const ROOT_KEY: &str = "";

/// An ordered sequence of string segments locating a value in the graph.
///
/// The empty path denotes the root. The canonical textual key is the
/// segments joined by `.`, or `""` for the root.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Path(Vec<String>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Parse a dot-separated path. Empty tokens are discarded, so `""`,
    /// `".a.b."` and `"a..b"` normalize as expected.
    pub fn parse(text: &str) -> Self {
        Path(
            text.split('.')
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Build a path from explicit segments, kept verbatim. Unlike the
    /// dot-string form, empty segments are preserved.
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical textual key: segments joined by `.`, `""` for the root.
    pub fn key(&self) -> String {
        self.0.join(".")
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// This path extended by `segments`.
    pub fn join(&self, segments: &[String]) -> Path {
        let mut joined = self.0.clone();
        joined.extend(segments.iter().cloned());
        Path(joined)
    }

    /// Keys of this path and every prefix, ordered from the full path down
    /// to the root. Prefixes that collapse to the same key are all
    /// yielded; emission deduplicates them.
    pub fn ancestor_keys(&self) -> impl Iterator<Item = String> + '_ {
        (0..=self.0.len()).rev().map(|end| self.0[..end].join("."))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.key())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl From<String> for Path {
    fn from(text: String) -> Self {
        Path::parse(&text)
    }
}

impl From<&String> for Path {
    fn from(text: &String) -> Self {
        Path::parse(text)
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Path(segments)
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Path::from_segments(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Path::from_segments(segments)
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

/// Dynamic path input: null, a dot-string, or an array of segments.
/// Array elements normalize as: string verbatim, number to its decimal
/// form, null to `""`, bool to `"true"`/`"false"`. Anything else is an
/// invalid-path contract violation.
impl TryFrom<&serde_json::Value> for Path {
    type Error = StoreError;

    fn try_from(input: &serde_json::Value) -> Result<Self, StoreError> {
        use serde_json::Value as Json;
        match input {
            Json::Null => Ok(Path::root()),
            Json::String(text) => Ok(Path::parse(text)),
            Json::Array(items) => {
                let mut segments = Vec::with_capacity(items.len());
                for item in items {
                    segments.push(match item {
                        Json::String(text) => text.clone(),
                        Json::Number(number) => number.to_string(),
                        Json::Bool(flag) => flag.to_string(),
                        Json::Null => String::new(),
                        other => {
                            return Err(StoreError::InvalidPath(format!(
                                "unsupported segment: {other}"
                            )))
                        }
                    });
                }
                Ok(Path(segments))
            }
            other => Err(StoreError::InvalidPath(format!(
                "expected a string, an array of segments, or null, got {other}"
            ))),
        }
    }
}

/// Read the value at `segments` below `root` without wrapping or
/// tracking. Short-circuits to `None` when an intermediate segment
/// resolves to a missing or non-traversable value.
pub fn read_at(root: &Value, segments: &[String]) -> Option<Value> {
    let mut current = root.clone();
    for segment in segments {
        let next = match &current {
            Value::Mapping(entries) => entries.borrow().get(segment).cloned(),
            Value::Sequence(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.borrow().get(index).cloned()),
            Value::Model(model) => model.get(segment),
            _ => None,
        };
        current = next?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_discards_empty_tokens() {
        assert_eq!(Path::parse(""), Path::root());
        assert_eq!(Path::parse(".a.b."), Path::parse("a.b"));
        assert_eq!(Path::parse("a..b").segments(), ["a", "b"]);
    }

    #[test]
    fn test_segment_form_keeps_empty_segments() {
        let path = Path::from_segments(["", "a"]);
        assert_eq!(path.segments(), ["", "a"]);
        assert_eq!(path.key(), ".a");
    }

    #[test]
    fn test_string_and_array_forms_agree() {
        let from_text = Path::parse("profile.firstName");
        let from_segments = Path::from_segments(["profile", "firstName"]);
        assert_eq!(from_text, from_segments);
        assert_eq!(from_text.key(), from_segments.key());
    }

    #[test]
    fn test_key_of_root_is_empty() {
        assert_eq!(Path::root().key(), ROOT_KEY);
    }

    #[test]
    fn test_ancestor_keys_leaf_first() {
        let keys: Vec<String> = Path::parse("a.b.c").ancestor_keys().collect();
        assert_eq!(keys, ["a.b.c", "a.b", "a", ""]);
    }

    #[test]
    fn test_ancestor_keys_of_root() {
        let keys: Vec<String> = Path::root().ancestor_keys().collect();
        assert_eq!(keys, [""]);
    }

    #[test]
    fn test_dynamic_input_normalizes_segments() {
        let path = Path::try_from(&json!(["items", 3, null, true])).unwrap();
        assert_eq!(path.segments(), ["items", "3", "", "true"]);

        assert_eq!(Path::try_from(&json!(null)).unwrap(), Path::root());
        assert_eq!(
            Path::try_from(&json!("a.b")).unwrap(),
            Path::parse("a.b")
        );
    }

    #[test]
    fn test_dynamic_input_rejects_wrong_shapes() {
        assert!(Path::try_from(&json!(42)).is_err());
        assert!(Path::try_from(&json!(true)).is_err());
        assert!(Path::try_from(&json!({"a": 1})).is_err());
        assert!(Path::try_from(&json!([["nested"]])).is_err());
    }

    #[test]
    fn test_read_at_short_circuits() {
        let root = Value::from_json(json!({"a": {"b": 1}, "s": "text"}));
        assert_eq!(
            read_at(&root, Path::parse("a.b").segments()),
            Some(Value::Int(1))
        );
        assert_eq!(read_at(&root, Path::parse("a.missing").segments()), None);
        assert_eq!(read_at(&root, Path::parse("s.deeper").segments()), None);
        assert_eq!(read_at(&root, &[]), Some(root.clone()));
    }

    #[test]
    fn test_read_at_indexes_sequences() {
        let root = Value::from_json(json!({"items": ["a", "b"]}));
        assert_eq!(
            read_at(&root, Path::parse("items.1").segments()),
            Some(Value::from("b"))
        );
        assert_eq!(read_at(&root, Path::parse("items.9").segments()), None);
        assert_eq!(read_at(&root, Path::parse("items.x").segments()), None);
    }
}
