pub mod handlers;
pub mod request_handler;
pub mod upstream;
pub mod util;

use crate::config::Settings;
use crate::error::Result as AppResult;
use crate::providers::{InferenceClient, TokenProvider};
use crate::server::request_handler::RequestHandler;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
}

impl AppState {
    pub fn from_settings(config: &Settings) -> Self {
        let tokens = TokenProvider::new(config.auth.clone(), config.http.clone());
        let inference = InferenceClient::new(&config.inference, config.http.clone());
        tracing::info!(
            token_url = %config.auth.token_url,
            model_url = %inference.model_url(),
            "DAR upstreams configured"
        );
        let handler = RequestHandler::new(Arc::new(tokens), Arc::new(inference));
        Self {
            handler: Arc::new(handler),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    // CORS（前端 UI 直接调用；生产应收敛来源）
    use axum::http::{Method, header};
    use tower_http::cors::{AllowOrigin, CorsLayer};
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(AllowOrigin::mirror_request());

    handlers::routes()
        .with_state(Arc::new(app_state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

pub async fn create_app(config: Settings) -> AppResult<Router> {
    config.validate()?;
    Ok(router(AppState::from_settings(&config)))
}
