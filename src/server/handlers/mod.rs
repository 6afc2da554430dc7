use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::server::AppState;

mod health;
mod root;

pub use root::{ResponseEntity, RootRecord};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/DarService/Root", post(root::create_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, InferenceError};
    use crate::payload::InferencePayload;
    use crate::providers::AccessToken;
    use crate::server::request_handler::RequestHandler;
    use crate::server::upstream::{BoxFuture, InferenceBackend, TokenSource};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct StaticTokens(bool);

    impl TokenSource for StaticTokens {
        fn fetch_token<'a>(&'a self) -> BoxFuture<'a, Result<AccessToken, AuthError>> {
            let ok = self.0;
            Box::pin(async move {
                if ok {
                    Ok(AccessToken::new("tok"))
                } else {
                    Err(AuthError::MissingAccessToken)
                }
            })
        }
    }

    struct EchoInference;

    impl InferenceBackend for EchoInference {
        fn infer<'a>(
            &'a self,
            payload: &'a InferencePayload,
            _token: &'a AccessToken,
        ) -> BoxFuture<'a, Result<String, InferenceError>> {
            Box::pin(async move {
                Ok(json!({"echo": payload}).to_string())
            })
        }
    }

    fn app(token_ok: bool) -> Router {
        let state = AppState {
            handler: Arc::new(RequestHandler::new(
                Arc::new(StaticTokens(token_ok)),
                Arc::new(EchoInference),
            )),
        };
        routes().with_state(Arc::new(state))
    }

    async fn post_root(app: Router, body: Value) -> (StatusCode, Value) {
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/DarService/Root")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_root_attaches_response_text() {
        let (status, body) = post_root(
            app(true),
            json!({
                "topN": 2,
                "objects": [{"features": [{"name": "color", "value": "red"}]}, {"other": "x"}]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["topN"], json!(2));
        assert!(body["ID"].as_str().is_some());
        let text = body["Response"]["responseText"].as_str().unwrap();
        let inner: Value = serde_json::from_str(text).unwrap();
        assert_eq!(
            inner["echo"],
            json!({"topN": 2, "objects": [{"features": [{"name": "color", "value": "red"}]}]})
        );
        assert_eq!(body["droppedElements"][0]["objectIndex"], json!(1));
        assert_eq!(body["droppedElements"][0]["reason"], json!("missing_features"));
    }

    #[tokio::test]
    async fn token_failure_maps_to_bad_gateway() {
        let (status, body) = post_root(app(false), json!({"topN": 1, "objects": []})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["kind"], json!("auth"));
    }

    #[tokio::test]
    async fn invalid_top_n_maps_to_unprocessable() {
        let (status, body) = post_root(app(true), json!({"topN": "two"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["kind"], json!("transform"));
    }

    async fn post_raw(content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri("/DarService/Root");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let res = app(true)
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_json_body_uses_error_envelope() {
        let (status, body) = post_raw(Some("application/json"), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], json!("request"));
        assert!(body["error"]["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn missing_content_type_uses_error_envelope() {
        let (status, body) = post_raw(None, r#"{"topN": 1}"#).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["kind"], json!("request"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let res = app(true)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
