pub mod settings;

pub use settings::{AuthConfig, HttpConfig, InferenceConfig, ServerConfig, Settings};
