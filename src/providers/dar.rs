use crate::config::{HttpConfig, InferenceConfig};
use crate::error::InferenceError;
use crate::http_client::client_for_url;
use crate::payload::InferencePayload;

use super::oauth::AccessToken;

pub struct InferenceClient {
    model_url: String,
    http: HttpConfig,
}

impl InferenceClient {
    pub fn new(inference: &InferenceConfig, http: HttpConfig) -> Self {
        Self {
            model_url: inference.model_url(),
            http,
        }
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }

    pub async fn infer(
        &self,
        payload: &InferencePayload,
        token: &AccessToken,
    ) -> Result<String, InferenceError> {
        Self::infer_at(payload, token, &self.model_url, &self.http).await
    }

    /// Posts `payload` to `model_url` and returns the body exactly as received.
    pub async fn infer_at(
        payload: &InferencePayload,
        token: &AccessToken,
        model_url: &str,
        http: &HttpConfig,
    ) -> Result<String, InferenceError> {
        let client = client_for_url(model_url, http)?;

        tracing::debug!(
            model_url,
            top_n = payload.top_n,
            objects = payload.objects.len(),
            "Calling DAR inference"
        );

        let response = client
            .post(model_url)
            .header("Authorization", format!("Bearer {}", token.secret()))
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // 只校验是 JSON 对象或数组，返回原始文本
        let parsed: serde_json::Value = serde_json::from_str(&body)?;
        if !(parsed.is_object() || parsed.is_array()) {
            return Err(InferenceError::NotADocument(parsed.to_string()));
        }
        tracing::debug!(response = %parsed, "DAR inference response");

        Ok(body)
    }
}
