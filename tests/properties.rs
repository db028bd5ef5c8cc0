//! Property tests for the path model.

use proptest::prelude::*;
use serde_json::json;
use vantage::{Path, StoreError};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}"
}

proptest! {
    #[test]
    fn dot_string_and_segment_forms_agree(segments in prop::collection::vec(segment(), 0..6)) {
        let text = segments.join(".");
        let parsed = Path::parse(&text);
        let built = Path::from_segments(segments);
        prop_assert_eq!(parsed.key(), built.key());
        prop_assert_eq!(parsed, built);
    }

    #[test]
    fn key_parse_round_trip(segments in prop::collection::vec(segment(), 0..6)) {
        let path = Path::from_segments(segments);
        prop_assert_eq!(Path::parse(&path.key()), path);
    }

    #[test]
    fn ancestor_keys_walk_to_the_root(segments in prop::collection::vec(segment(), 0..6)) {
        let path = Path::from_segments(segments.clone());
        let keys: Vec<String> = path.ancestor_keys().collect();
        prop_assert_eq!(keys.len(), segments.len() + 1);
        prop_assert_eq!(keys.first().unwrap(), &path.key());
        prop_assert_eq!(keys.last().unwrap(), "");
        for pair in keys.windows(2) {
            prop_assert!(pair[0].starts_with(pair[1].as_str()));
            prop_assert!(pair[0].len() > pair[1].len());
        }
    }

    #[test]
    fn number_segments_normalize_to_decimal(index in 0u64..10_000) {
        let path = Path::try_from(&json!(["items", index])).unwrap();
        prop_assert_eq!(path.segments()[1].as_str(), index.to_string());
    }

    #[test]
    fn invalid_dynamic_inputs_are_rejected(number in any::<i64>()) {
        prop_assert!(matches!(
            Path::try_from(&json!(number)),
            Err(StoreError::InvalidPath(_))
        ));
        let object_result = Path::try_from(&json!({"key": number}));
        prop_assert!(matches!(
            object_result,
            Err(StoreError::InvalidPath(_))
        ));
        let array_result = Path::try_from(&json!([{"key": number}]));
        prop_assert!(matches!(
            array_result,
            Err(StoreError::InvalidPath(_))
        ));
    }
}
