pub mod builder;
pub mod types;

pub use builder::PayloadBuilder;
pub use types::{
    BuildOutcome, CreateRequest, DropReason, DroppedElement, FeatureRecord, InferencePayload,
    ObjectRecord,
};
