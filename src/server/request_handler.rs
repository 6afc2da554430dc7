use std::fmt;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::error::DarError;
use crate::payload::{CreateRequest, DroppedElement, PayloadBuilder};
use crate::server::upstream::{InferenceBackend, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    TokenFetch,
    PayloadBuild,
    InferenceCall,
    ResultAttach,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::TokenFetch => "token_fetch",
            Stage::PayloadBuild => "payload_build",
            Stage::InferenceCall => "inference_call",
            Stage::ResultAttach => "result_attach",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOutcome {
    pub response_text: String,
    pub dropped: Vec<DroppedElement>,
}

/// Runs one create event through token fetch, payload build and inference.
///
/// Holds no per-invocation state; each call starts from [`Stage::Idle`]. A
/// failed stage ends the invocation with its error, so a token failure never
/// reaches the inference endpoint.
pub struct RequestHandler {
    tokens: Arc<dyn TokenSource>,
    inference: Arc<dyn InferenceBackend>,
}

impl RequestHandler {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        inference: Arc<dyn InferenceBackend>,
    ) -> Self {
        Self { tokens, inference }
    }

    pub async fn handle(
        &self,
        record_id: Uuid,
        request: &CreateRequest,
    ) -> Result<InferenceOutcome, DarError> {
        let span = tracing::info_span!("dar_request", %record_id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &CreateRequest) -> Result<InferenceOutcome, DarError> {
        enter(Stage::TokenFetch);
        let token = self.tokens.fetch_token().await.map_err(|e| {
            tracing::error!("Error while getting access token: {}", e);
            DarError::from(e)
        })?;

        enter(Stage::PayloadBuild);
        let built = PayloadBuilder::build(request.top_n.as_ref(), request.objects.as_ref())
            .map_err(|e| {
                tracing::warn!("Rejected create request: {}", e);
                DarError::from(e)
            })?;
        if !built.dropped.is_empty() {
            tracing::warn!(
                dropped = built.dropped.len(),
                "Dropped malformed input elements: {:?}",
                built.dropped
            );
        }

        enter(Stage::InferenceCall);
        let response_text = self
            .inference
            .infer(&built.payload, &token)
            .await
            .map_err(|e| {
                tracing::error!("Error while getting DAR inference: {}", e);
                DarError::from(e)
            })?;

        enter(Stage::ResultAttach);
        let outcome = InferenceOutcome {
            response_text,
            dropped: built.dropped,
        };
        enter(Stage::Idle);
        Ok(outcome)
    }
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "stage");
}
