use serde::{Deserialize, Serialize};
use serde_json::Value;

// 入站请求：字段保持宽松，由 PayloadBuilder 负责校验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(rename = "topN", default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub features: Vec<FeatureRecord>,
}

/// Request document sent to the DAR inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferencePayload {
    #[serde(rename = "topN")]
    pub top_n: i64,
    pub objects: Vec<ObjectRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    ObjectsNotASequence,
    ObjectNotAMap,
    MissingFeatures,
    FeaturesNotASequence,
    FeatureNotAMap,
    MissingName,
    MissingValue,
}

/// An input element left out of the payload, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_index: Option<usize>,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub payload: InferencePayload,
    pub dropped: Vec<DroppedElement>,
}
