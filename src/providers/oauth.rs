use serde::Deserialize;

use crate::config::{AuthConfig, HttpConfig};
use crate::error::AuthError;
use crate::http_client::client_for_url;
use crate::server::util::mask_key;

/// Bearer token returned by the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({})", mask_key(&self.0))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

pub struct TokenProvider {
    auth: AuthConfig,
    http: HttpConfig,
}

impl TokenProvider {
    pub fn new(auth: AuthConfig, http: HttpConfig) -> Self {
        Self { auth, http }
    }

    pub async fn fetch(&self) -> Result<AccessToken, AuthError> {
        Self::fetch_with(
            &self.auth.client_id,
            &self.auth.client_secret,
            &self.auth.token_url,
            &self.http,
        )
        .await
    }

    pub async fn fetch_with(
        client_id: &str,
        client_secret: &str,
        token_url: &str,
        http: &HttpConfig,
    ) -> Result<AccessToken, AuthError> {
        let client = client_for_url(token_url, http)?;

        tracing::debug!(client_id = %mask_key(client_id), "Requesting access token");

        // form() 会做 URL 编码，client_secret 中常含 '$' '=' '|'
        let response = client
            .post(token_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_token_response(&body)
    }
}

pub(crate) fn parse_token_response(body: &str) -> Result<AccessToken, AuthError> {
    let parsed: TokenResponse = serde_json::from_str(body)?;
    let token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingAccessToken)?;

    tracing::debug!(
        token_type = parsed.token_type.as_deref().unwrap_or("unknown"),
        expires_in = parsed.expires_in,
        "Access token received"
    );
    Ok(AccessToken::new(token))
}
