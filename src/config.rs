use crate::error::AppError;
use secrecy::Secret;
use std::env;

/// Application settings loaded from the process environment (and `.env`).
///
/// Only server binding and provider credentials are configurable. Model
/// names, prompts, and connector identifiers are fixed constants in the
/// provider modules.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub openai: OpenAiSettings,
    pub cohere: CohereSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct CohereSettings {
    pub api_key: Secret<String>,
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        let port = get_env("APP_PORT", Some("8000"))?
            .parse()
            .map_err(|e| AppError::Config(anyhow::anyhow!("APP_PORT is not a valid port: {}", e)))?;

        Ok(Settings {
            server: ServerSettings {
                host: get_env("APP_HOST", Some("0.0.0.0"))?,
                port,
            },
            openai: OpenAiSettings {
                api_key: Secret::new(get_env("OPENAI_API_KEY", None)?),
            },
            cohere: CohereSettings {
                api_key: Secret::new(get_env("COHERE_API_KEY", None)?),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
