use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// 令牌端点失败
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("token response is not a JSON object: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("token response has no access_token")]
    MissingAccessToken,
}

// 推理端点失败
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("inference response is not a JSON object or array: {0}")]
    NotADocument(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("topN is required")]
    MissingTopN,

    #[error("topN must be an integer, got {0}")]
    InvalidTopN(String),
}

#[derive(Debug, Error)]
pub enum DarError {
    #[error("Request error: {0}")]
    Request(#[from] JsonRejection),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DarError {
    pub fn kind(&self) -> &'static str {
        match self {
            DarError::Request(_) => "request",
            DarError::Auth(_) => "auth",
            DarError::Inference(_) => "inference",
            DarError::Transform(_) => "transform",
            DarError::Config(_) => "config",
            DarError::Io(_) => "io",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DarError::Request(rejection) => rejection.status(),
            DarError::Auth(_) | DarError::Inference(_) => StatusCode::BAD_GATEWAY,
            DarError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DarError::Config(_) | DarError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DarError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DarError>;
