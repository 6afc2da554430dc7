pub mod dar;
pub mod oauth;

pub use dar::InferenceClient;
pub use oauth::{AccessToken, TokenProvider};
