use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DarError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4004,
        }
    }
}

// OAuth2 client-credentials 配置；密钥只来自配置文件或环境变量
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &crate::server::util::mask_key(&self.client_id))
            .field("client_secret", &"****")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
}

fn default_model_version() -> String {
    "1".to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model_id: String::new(),
            model_version: default_model_version(),
        }
    }
}

impl InferenceConfig {
    pub fn model_url(&self) -> String {
        format!(
            "{}/inference/api/v3/models/{}/versions/{}",
            self.base_url.trim_end_matches('/'),
            self.model_id,
            self.model_version
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub no_proxy_hosts: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            no_proxy_hosts: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, DarError> {
        let mut settings = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("No config file found, using defaults and environment");
                Settings::default()
            }
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DarError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DarError::Config(format!("{}: {}", path.display(), e)))
    }

    fn find_config_file() -> Option<String> {
        let possible_names = ["custom-config.toml", "config.toml"];

        possible_names
            .iter()
            .find(|name| Path::new(name).exists())
            .map(|name| name.to_string())
    }

    // 环境变量优先于配置文件
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DAR_TOKEN_URL") {
            self.auth.token_url = v;
        }
        if let Some(v) = get("DAR_CLIENT_ID") {
            self.auth.client_id = v;
        }
        if let Some(v) = get("DAR_CLIENT_SECRET") {
            self.auth.client_secret = v;
        }
        if let Some(v) = get("DAR_BASE_URL") {
            self.inference.base_url = v;
        }
        if let Some(v) = get("DAR_MODEL_ID") {
            self.inference.model_id = v;
        }
        if let Some(v) = get("DAR_MODEL_VERSION") {
            self.inference.model_version = v;
        }
        if let Some(v) = get("DAR_HOST") {
            self.server.host = v;
        }
        if let Some(port) = get("DAR_PORT").and_then(|v| v.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), DarError> {
        let required = [
            ("auth.token_url", &self.auth.token_url),
            ("auth.client_id", &self.auth.client_id),
            ("auth.client_secret", &self.auth.client_secret),
            ("inference.base_url", &self.inference.base_url),
            ("inference.model_id", &self.inference.model_id),
            ("inference.model_version", &self.inference.model_version),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(DarError::Config(format!("{} is empty", name)));
            }
        }
        let timeouts = [
            ("http.timeout_secs", self.http.timeout_secs),
            ("http.connect_timeout_secs", self.http.connect_timeout_secs),
        ];
        for (name, secs) in timeouts {
            if secs == 0 {
                return Err(DarError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}
