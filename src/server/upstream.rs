use std::future::Future;
use std::pin::Pin;

use crate::error::{AuthError, InferenceError};
use crate::payload::InferencePayload;
use crate::providers::{AccessToken, InferenceClient, TokenProvider};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// 令牌来源抽象（默认实现为 OAuth2 client-credentials）
pub trait TokenSource: Send + Sync {
    fn fetch_token<'a>(&'a self) -> BoxFuture<'a, Result<AccessToken, AuthError>>;
}

// 推理调用抽象（默认实现为 DAR HTTP 接口）
pub trait InferenceBackend: Send + Sync {
    fn infer<'a>(
        &'a self,
        payload: &'a InferencePayload,
        token: &'a AccessToken,
    ) -> BoxFuture<'a, Result<String, InferenceError>>;
}

impl TokenSource for TokenProvider {
    fn fetch_token<'a>(&'a self) -> BoxFuture<'a, Result<AccessToken, AuthError>> {
        Box::pin(async move { self.fetch().await })
    }
}

impl InferenceBackend for InferenceClient {
    fn infer<'a>(
        &'a self,
        payload: &'a InferencePayload,
        token: &'a AccessToken,
    ) -> BoxFuture<'a, Result<String, InferenceError>> {
        Box::pin(async move { InferenceClient::infer(self, payload, token).await })
    }
}
