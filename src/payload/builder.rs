use serde_json::{Map, Value};

use crate::error::TransformError;

use super::types::{
    BuildOutcome, DropReason, DroppedElement, FeatureRecord, InferencePayload, ObjectRecord,
};

/// Turns the loosely-typed `topN`/`objects` input into an [`InferencePayload`].
///
/// Objects without a `features` sequence are left out entirely, never replaced
/// by an empty record. Features that are not maps or lack a non-null `name` or
/// `value` are left out of their object. Every omission is reported in
/// [`BuildOutcome::dropped`]. Input order is preserved.
pub struct PayloadBuilder;

impl PayloadBuilder {
    pub fn build(
        top_n: Option<&Value>,
        objects: Option<&Value>,
    ) -> Result<BuildOutcome, TransformError> {
        let top_n = Self::top_n(top_n)?;
        let mut dropped = Vec::new();

        let objects = match objects {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| Self::object(index, item, &mut dropped))
                .collect(),
            Some(_) => {
                dropped.push(DroppedElement {
                    object_index: None,
                    feature_index: None,
                    reason: DropReason::ObjectsNotASequence,
                });
                Vec::new()
            }
        };

        Ok(BuildOutcome {
            payload: InferencePayload { top_n, objects },
            dropped,
        })
    }

    // 只接受 JSON 整数；5.0 这类浮点字面量同样拒绝，保证类型原样透传
    fn top_n(value: Option<&Value>) -> Result<i64, TransformError> {
        match value {
            None | Some(Value::Null) => Err(TransformError::MissingTopN),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| TransformError::InvalidTopN(v.to_string())),
        }
    }

    fn object(
        index: usize,
        item: &Value,
        dropped: &mut Vec<DroppedElement>,
    ) -> Option<ObjectRecord> {
        let dropped_at = |reason| DroppedElement {
            object_index: Some(index),
            feature_index: None,
            reason,
        };

        let Value::Object(map) = item else {
            dropped.push(dropped_at(DropReason::ObjectNotAMap));
            return None;
        };
        let features = match map.get("features") {
            Some(Value::Array(features)) => features,
            Some(_) => {
                dropped.push(dropped_at(DropReason::FeaturesNotASequence));
                return None;
            }
            None => {
                dropped.push(dropped_at(DropReason::MissingFeatures));
                return None;
            }
        };

        let features = features
            .iter()
            .enumerate()
            .filter_map(|(feature_index, feature)| match Self::feature(feature) {
                Ok(record) => Some(record),
                Err(reason) => {
                    dropped.push(DroppedElement {
                        object_index: Some(index),
                        feature_index: Some(feature_index),
                        reason,
                    });
                    None
                }
            })
            .collect();

        Some(ObjectRecord { features })
    }

    fn feature(feature: &Value) -> Result<FeatureRecord, DropReason> {
        let Value::Object(map) = feature else {
            return Err(DropReason::FeatureNotAMap);
        };
        let name = field_as_string(map, "name").ok_or(DropReason::MissingName)?;
        let value = field_as_string(map, "value").ok_or(DropReason::MissingValue)?;
        Ok(FeatureRecord { name, value })
    }
}

// 字符串原样保留，其它标量和嵌套结构使用紧凑 JSON 文本
fn field_as_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(top_n: Value, objects: Value) -> BuildOutcome {
        PayloadBuilder::build(Some(&top_n), Some(&objects)).unwrap()
    }

    #[test]
    fn single_object_with_one_feature() {
        let out = build(
            json!(5),
            json!([{"features": [{"name": "color", "value": "red"}]}]),
        );
        assert_eq!(
            serde_json::to_value(&out.payload).unwrap(),
            json!({"topN": 5, "objects": [{"features": [{"name": "color", "value": "red"}]}]})
        );
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn object_without_features_is_omitted() {
        let out = build(json!(3), json!([{"other": "x"}]));
        assert_eq!(
            serde_json::to_value(&out.payload).unwrap(),
            json!({"topN": 3, "objects": []})
        );
        assert_eq!(
            out.dropped,
            vec![DroppedElement {
                object_index: Some(0),
                feature_index: None,
                reason: DropReason::MissingFeatures,
            }]
        );
    }

    #[test]
    fn only_objects_with_feature_sequences_are_counted() {
        let objects = json!([
            {"features": [{"name": "a", "value": "1"}]},
            {"features": "not-a-list"},
            "scalar",
            {"features": []},
            {"other": true},
            {"features": [{"name": "b", "value": "2"}, {"name": "c", "value": "3"}]}
        ]);
        let out = build(json!(2), objects);

        assert_eq!(out.payload.objects.len(), 3);
        assert_eq!(out.payload.objects[0].features[0].name, "a");
        assert!(out.payload.objects[1].features.is_empty());
        let names: Vec<_> = out.payload.objects[2]
            .features
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["b", "c"]);

        let reasons: Vec<_> = out.dropped.iter().map(|d| (d.object_index, d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (Some(1), DropReason::FeaturesNotASequence),
                (Some(2), DropReason::ObjectNotAMap),
                (Some(4), DropReason::MissingFeatures),
            ]
        );
    }

    #[test]
    fn absent_or_empty_objects_yield_empty_array() {
        let top_n = json!(7);
        let absent = PayloadBuilder::build(Some(&top_n), None).unwrap();
        assert_eq!(absent.payload.top_n, 7);
        assert!(absent.payload.objects.is_empty());
        assert!(absent.dropped.is_empty());

        let empty = build(json!(7), json!([]));
        assert!(empty.payload.objects.is_empty());
        assert!(empty.dropped.is_empty());
    }

    #[test]
    fn non_sequence_objects_yield_empty_array_and_are_flagged() {
        let out = build(json!(1), json!({"features": []}));
        assert!(out.payload.objects.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::ObjectsNotASequence);
        assert_eq!(out.dropped[0].object_index, None);
    }

    #[test]
    fn feature_values_are_coerced_to_strings() {
        let out = build(
            json!(1),
            json!([{"features": [
                {"name": "weight", "value": 12},
                {"name": "fragile", "value": false},
                {"name": 42, "value": 1.5},
                {"name": "dims", "value": [1, 2]}
            ]}]),
        );
        let pairs: Vec<_> = out.payload.objects[0]
            .features
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("weight", "12"),
                ("fragile", "false"),
                ("42", "1.5"),
                ("dims", "[1,2]"),
            ]
        );
    }

    #[test]
    fn malformed_features_are_dropped_not_fatal() {
        let out = build(
            json!(4),
            json!([{"features": [
                {"name": "size"},
                {"value": "blue"},
                {"name": null, "value": "x"},
                "loose",
                {"name": "color", "value": "red"}
            ]}]),
        );
        assert_eq!(
            out.payload.objects[0].features,
            vec![FeatureRecord {
                name: "color".into(),
                value: "red".into()
            }]
        );
        let reasons: Vec<_> = out.dropped.iter().map(|d| (d.feature_index, d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (Some(0), DropReason::MissingValue),
                (Some(1), DropReason::MissingName),
                (Some(2), DropReason::MissingName),
                (Some(3), DropReason::FeatureNotAMap),
            ]
        );
    }

    #[test]
    fn top_n_is_copied_unchanged() {
        let out = build(json!(-12), json!([]));
        assert_eq!(out.payload.top_n, -12);
        let encoded = serde_json::to_value(&out.payload).unwrap();
        assert!(encoded["topN"].is_i64());
    }

    #[test]
    fn non_integer_top_n_is_rejected() {
        let objects = json!([]);
        for bad in [json!(2.5), json!(5.0), json!("5"), json!(true), json!([1])] {
            let err = PayloadBuilder::build(Some(&bad), Some(&objects)).unwrap_err();
            assert_eq!(err, TransformError::InvalidTopN(bad.to_string()));
        }
        assert_eq!(
            PayloadBuilder::build(None, Some(&objects)).unwrap_err(),
            TransformError::MissingTopN
        );
    }
}
