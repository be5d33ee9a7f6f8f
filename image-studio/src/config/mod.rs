use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Public Gemini API endpoint. Overridable so tests can point the relay at
/// a local fake server.
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the request does not name one.
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Clone, Deserialize)]
pub struct StudioConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub gemini: GeminiEndpointConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Process-wide default credential. Empty means "not configured":
    /// requests must then carry their own key.
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Default image model (e.g. gemini-2.0-flash-exp).
    pub image_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiEndpointConfig {
    pub api_base: String,
}

impl StudioConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(StudioConfig {
            common: common_config,
            google: GoogleConfig {
                // Optional even in prod: users may bring their own key.
                api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            },
            models: ModelConfig {
                image_model: get_env("STUDIO_IMAGE_MODEL", Some(DEFAULT_IMAGE_MODEL), is_prod)?,
            },
            gemini: GeminiEndpointConfig {
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
            },
        })
    }

    /// The default credential, or None when no key was configured.
    pub fn default_api_key(&self) -> Option<&str> {
        let key = self.google.api_key.trim();
        if key.is_empty() { None } else { Some(key) }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
