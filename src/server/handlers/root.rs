use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::DarError;
use crate::payload::{CreateRequest, DroppedElement};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntity {
    pub response_text: String,
}

// 创建事件的出站记录；UI 读取 Response.responseText 并按 JSON 解析
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootRecord {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "topN", skip_serializing_if = "Option::is_none")]
    pub top_n: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Value>,
    #[serde(rename = "Response")]
    pub response: ResponseEntity,
    pub dropped_elements: Vec<DroppedElement>,
    pub created_at: DateTime<Utc>,
}

pub async fn create_root(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RootRecord>), DarError> {
    let Json(request) = payload?;
    let id = Uuid::new_v4();
    tracing::debug!(%id, "Create event received");

    let outcome = app_state.handler.handle(id, &request).await?;

    let record = RootRecord {
        id,
        top_n: request.top_n,
        objects: request.objects,
        response: ResponseEntity {
            response_text: outcome.response_text,
        },
        dropped_elements: outcome.dropped,
        created_at: Utc::now(),
    };
    Ok((StatusCode::CREATED, Json(record)))
}
