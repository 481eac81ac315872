use crate::types::{FieldMap, FieldPath, Record};
use serde_json::{Map, Value};

/// Selects and renames fields of each record according to a `FieldMap`
pub struct PathExtractor {
    fields: FieldMap,
}

impl PathExtractor {
    pub fn new(fields: FieldMap) -> Self {
        PathExtractor { fields }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Build the output record for one input record
    pub fn extract_one(&self, record: &Record) -> Record {
        let mut out = Map::new();

        for (path, target) in self.fields.iter() {
            // Later entries with the same target overwrite earlier ones
            out.insert(target.to_string(), resolve(record, path));
        }

        out
    }

    /// Lazily transform a record stream, one output per input, errors passed through
    pub fn extract<I, E>(&self, records: I) -> Extracted<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<Record, E>>,
    {
        Extracted {
            extractor: self,
            inner: records.into_iter(),
        }
    }
}

/// Iterator adapter returned by [`PathExtractor::extract`]
pub struct Extracted<'a, I> {
    extractor: &'a PathExtractor,
    inner: I,
}

impl<'a, I, E> Iterator for Extracted<'a, I>
where
    I: Iterator<Item = Result<Record, E>>,
{
    type Item = Result<Record, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|item| item.map(|record| self.extractor.extract_one(&record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Walk a dotted path through nested mappings; anything unreachable is null
pub fn resolve(record: &Record, path: &FieldPath) -> Value {
    let mut segments = path.segments().iter();

    let Some(first) = segments.next() else {
        return Value::Null;
    };
    let mut current = match record.get(first) {
        Some(value) => value,
        None => return Value::Null,
    };

    for segment in segments {
        match current {
            Value::Object(obj) => match obj.get(segment) {
                Some(value) => current = value,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }

    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn field_map(pairs: &[(&str, &str)]) -> FieldMap {
        let mut map = FieldMap::new();
        for (path, target) in pairs {
            map.insert(path, target).unwrap();
        }
        map
    }

    fn ok_stream(records: Vec<Record>) -> impl Iterator<Item = Result<Record, Infallible>> {
        records.into_iter().map(Ok)
    }

    #[test]
    fn test_nested_path_scenario() {
        let extractor = PathExtractor::new(field_map(&[("b.c", "out")]));
        let input = vec![
            record(json!({"a": 1, "b": {"c": "x"}})),
            record(json!({"a": 2, "b": {}})),
        ];

        let output: Vec<Record> = extractor
            .extract(ok_stream(input))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(output, vec![record(json!({"out": "x"})), record(json!({"out": null}))]);
    }

    #[test]
    fn test_missing_and_blocked_paths_are_null() {
        let extractor = PathExtractor::new(field_map(&[
            ("absent", "a"),
            ("text.len", "b"),
            ("list.0", "c"),
            ("nothing.below", "d"),
        ]));
        let input = record(json!({"text": "hello", "list": [1, 2], "nothing": null}));

        let out = extractor.extract_one(&input);
        assert_eq!(out, record(json!({"a": null, "b": null, "c": null, "d": null})));
    }

    #[test]
    fn test_last_write_wins_on_target_collision() {
        let extractor = PathExtractor::new(field_map(&[
            ("first", "name"),
            ("other", "keep"),
            ("second", "name"),
        ]));
        let input = record(json!({"first": "one", "other": 0, "second": "two"}));

        let out = extractor.extract_one(&input);
        assert_eq!(out.get("name"), Some(&json!("two")));

        // the collided key keeps the position of its first assignment
        let keys: Vec<&String> = out.keys().collect();
        assert_eq!(keys, vec!["name", "keep"]);
    }

    #[test]
    fn test_collision_with_missing_later_path_yields_null() {
        let extractor = PathExtractor::new(field_map(&[("present", "v"), ("absent", "v")]));
        let out = extractor.extract_one(&record(json!({"present": 1})));
        assert_eq!(out.get("v"), Some(&Value::Null));
    }

    #[test]
    fn test_source_record_untouched() {
        let input = record(json!({"meta": {"id": 5}, "text": "t"}));
        let before = input.clone();

        let extractor = PathExtractor::new(field_map(&[("meta.id", "id")]));
        let _ = extractor.extract_one(&input);

        assert_eq!(input, before);
    }

    #[test]
    fn test_nested_values_are_copied_whole() {
        let extractor = PathExtractor::new(field_map(&[("meta", "m")]));
        let out = extractor.extract_one(&record(json!({"meta": {"id": 5, "tags": ["a"]}})));
        assert_eq!(out.get("m"), Some(&json!({"id": 5, "tags": ["a"]})));
    }

    #[test]
    fn test_upstream_error_passes_through() {
        let extractor = PathExtractor::new(field_map(&[("a", "a")]));
        let input: Vec<Result<Record, String>> = vec![
            Ok(record(json!({"a": 1}))),
            Err("boom".to_string()),
            Ok(record(json!({"a": 3}))),
        ];

        let output: Vec<Result<Record, String>> = extractor.extract(input).collect();
        assert_eq!(output.len(), 3);
        assert_eq!(output[1], Err("boom".to_string()));
        assert_eq!(output[2], Ok(record(json!({"a": 3}))));
    }

    #[test]
    fn test_lazy_over_unbounded_stream() {
        let extractor = PathExtractor::new(field_map(&[("n", "value")]));
        let unbounded = (0u64..).map(|n| {
            let mut r = Map::new();
            r.insert("n".to_string(), json!(n));
            Ok::<_, Infallible>(r)
        });

        let first: Vec<Record> = extractor
            .extract(unbounded)
            .take(3)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(first[2].get("value"), Some(&json!(2)));
    }

    fn flat_record_strategy() -> impl Strategy<Value = Record> {
        proptest::collection::vec(("[a-c]{1,2}", any::<i64>()), 0..4).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k, Value::Number(v.into())))
                .collect()
        })
    }

    proptest! {
        /// Property: extraction keeps record count and order
        #[test]
        fn prop_extract_preserves_count_and_order(
            records in proptest::collection::vec(flat_record_strategy(), 0..20),
            paths in proptest::collection::vec("[a-c]{1,2}(\\.[a-c]{1,2})?", 0..4),
        ) {
            let mut map = FieldMap::new();
            for (idx, path) in paths.iter().enumerate() {
                map.insert(path, &format!("f{}", idx)).unwrap();
            }
            let mut with_index = map.clone();
            with_index.insert("__idx", "__idx").unwrap();

            let tagged: Vec<Record> = records
                .iter()
                .enumerate()
                .map(|(idx, r)| {
                    let mut r = r.clone();
                    r.insert("__idx".to_string(), json!(idx));
                    r
                })
                .collect();

            let extractor = PathExtractor::new(with_index);
            let output: Vec<Record> = extractor
                .extract(ok_stream(tagged))
                .collect::<Result<_, _>>()
                .unwrap();

            prop_assert_eq!(output.len(), records.len());
            for (idx, out) in output.iter().enumerate() {
                prop_assert_eq!(out.get("__idx"), Some(&json!(idx)));
                prop_assert_eq!(out.len(), map.len() + 1);
            }
        }
    }
}
