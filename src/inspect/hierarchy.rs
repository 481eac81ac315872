//! Type hierarchy inference
//!
//! Describes every field of a representative record, descending into nested
//! mappings and into the first element of sequences. Only the first record of
//! a sample is analyzed; use [`divergent_records`] to find sample records
//! whose shape differs from it.

use crate::types::{InspectConfig, Kind, Record, TypeDescriptor};
use serde_json::{Map, Value};

/// Top-level field name -> descriptor, in the representative record's order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    fields: Vec<(String, TypeDescriptor)>,
}

impl Hierarchy {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.fields.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Names offered to the selection surface
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, d)| (k.clone(), d.to_json()))
                .collect(),
        )
    }
}

/// Analyze a sample with the default depth limit
pub fn analyze(sample: &[Record]) -> Hierarchy {
    analyze_with(sample, &InspectConfig::default())
}

/// Analyze a sample using its first record as the representative
pub fn analyze_with(sample: &[Record], config: &InspectConfig) -> Hierarchy {
    let Some(first) = sample.first() else {
        return Hierarchy::default();
    };

    Hierarchy {
        fields: describe_fields(first, 0, config.max_depth),
    }
}

/// Describe a single value
pub fn describe(value: &Value) -> TypeDescriptor {
    describe_at(value, 0, InspectConfig::default().max_depth)
}

/// Indices of sample records (after the first) whose shape differs from the
/// representative.
///
/// `config` must be the one `hierarchy` was analyzed with, so both sides are
/// truncated at the same depth.
pub fn divergent_records(sample: &[Record], hierarchy: &Hierarchy, config: &InspectConfig) -> Vec<usize> {
    let max_depth = config.max_depth;

    sample
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, record)| describe_fields(record, 0, max_depth) != hierarchy.fields)
        .map(|(idx, _)| idx)
        .collect()
}

fn describe_fields(obj: &Map<String, Value>, depth: usize, max_depth: usize) -> Vec<(String, TypeDescriptor)> {
    obj.iter()
        .map(|(key, value)| (key.clone(), describe_at(value, depth, max_depth)))
        .collect()
}

fn describe_at(value: &Value, depth: usize, max_depth: usize) -> TypeDescriptor {
    if depth > max_depth {
        return TypeDescriptor::Truncated;
    }

    match value {
        Value::Object(obj) => TypeDescriptor::Mapping(describe_fields(obj, depth + 1, max_depth)),
        Value::Array(arr) => match arr.first() {
            Some(first) => TypeDescriptor::Sequence(Box::new(describe_at(first, depth + 1, max_depth))),
            None => TypeDescriptor::EmptySequence,
        },
        // Every remaining variant is a primitive
        scalar => TypeDescriptor::Primitive(Kind::from_value(scalar).unwrap_or(Kind::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(obj) => obj,
            other => panic!("Expected object, got: {:?}", other),
        }
    }

    #[test]
    fn test_empty_sample() {
        let hierarchy = analyze(&[]);
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.to_json(), json!({}));
    }

    #[test]
    fn test_nested_scenario() {
        let sample = vec![record(json!({"a": 1, "b": {"c": "x"}}))];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.get("a"), Some(&TypeDescriptor::Primitive(Kind::Int)));
        assert_eq!(hierarchy.to_json(), json!({"a": "int", "b": {"c": "str"}}));
    }

    #[test]
    fn test_nested_entry_matches_own_analysis() {
        let nested = json!({"id": 7, "tags": ["x"], "deep": {"flag": true, "score": 0.5}});
        let sample = vec![record(json!({"meta": nested.clone(), "text": "hi"}))];

        let hierarchy = analyze(&sample);
        let own = analyze(&[record(nested.clone())]);

        assert_eq!(hierarchy.get("meta"), Some(&describe(&nested)));
        let expected: Vec<(String, TypeDescriptor)> = own
            .iter()
            .map(|(k, d)| (k.to_string(), d.clone()))
            .collect();
        assert_eq!(hierarchy.get("meta"), Some(&TypeDescriptor::Mapping(expected)));
    }

    #[test]
    fn test_sequence_uses_first_element_only() {
        let sample = vec![record(json!({"items": [1, "two", {"three": 3}]}))];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.get("items").unwrap().to_string(), "List[int]");
    }

    #[test]
    fn test_empty_sequence_marker() {
        let sample = vec![record(json!({"items": [], "nested": [[]]}))];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.get("items"), Some(&TypeDescriptor::EmptySequence));
        assert_eq!(hierarchy.get("nested").unwrap().to_string(), "List[List[Empty]]");
    }

    #[test]
    fn test_null_is_distinct() {
        let sample = vec![record(json!({"missing": null, "flag": false, "ratio": 0.25}))];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.get("missing").unwrap().to_string(), "null");
        assert_eq!(hierarchy.get("flag").unwrap().to_string(), "bool");
        assert_eq!(hierarchy.get("ratio").unwrap().to_string(), "float");
    }

    #[test]
    fn test_only_first_record_is_used() {
        let sample = vec![
            record(json!({"a": 1})),
            record(json!({"a": "text", "b": true})),
        ];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.field_names(), vec!["a".to_string()]);
        assert_eq!(hierarchy.get("a").unwrap().to_string(), "int");
    }

    #[test]
    fn test_depth_limit() {
        let sample = vec![record(json!({"a": {"b": {"c": {"d": 1}}}}))];
        let config = InspectConfig {
            max_depth: 1,
            ..InspectConfig::default()
        };

        let hierarchy = analyze_with(&sample, &config);
        assert_eq!(hierarchy.get("a").unwrap().to_string(), "{b: {c: ...}}");
    }

    #[test]
    fn test_divergent_records() {
        let sample = vec![
            record(json!({"a": 1, "b": {"c": "x"}})),
            record(json!({"a": 2, "b": {"c": "y"}})),
            record(json!({"a": 3, "b": {}})),
            record(json!({"a": "4", "b": {"c": "z"}})),
        ];
        let hierarchy = analyze(&sample);

        assert_eq!(
            divergent_records(&sample, &hierarchy, &InspectConfig::default()),
            vec![2, 3]
        );
    }

    #[test]
    fn test_divergent_records_respects_depth_limit() {
        let sample = vec![
            record(json!({"a": {"b": {"c": 1}}})),
            record(json!({"a": {"b": {"c": 1}}})),
            record(json!({"a": {"b": {"c": 1}}})),
        ];
        let config = InspectConfig {
            max_depth: 0,
            ..InspectConfig::default()
        };

        let hierarchy = analyze_with(&sample, &config);
        assert_eq!(hierarchy.get("a").unwrap().to_string(), "{b: ...}");
        assert!(divergent_records(&sample, &hierarchy, &config).is_empty());
    }

    #[test]
    fn test_field_order_follows_record() {
        let sample = vec![record(json!({"zeta": 1, "alpha": 2, "mid": 3}))];
        let hierarchy = analyze(&sample);

        assert_eq!(hierarchy.field_names(), vec!["zeta", "alpha", "mid"]);
    }
}
