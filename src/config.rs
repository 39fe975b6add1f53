use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;

// Environment variable names read by `ClientConfig::from_env`
pub const API_URL_ENV_VAR: &str = "RECIPE_API_URL";
pub const API_TOKEN_ENV_VAR: &str = "RECIPE_API_TOKEN";
pub const TIMEOUT_ENV_VAR: &str = "RECIPE_API_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV_VAR: &str = "RECIPE_API_CONNECT_TIMEOUT_SECS";
pub const RECOMMENDATION_LIMIT_ENV_VAR: &str = "RECIPE_RECOMMENDATION_LIMIT";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RECOMMENDATION_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub recommendation_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the environment, picking up a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let api_url = read(API_URL_ENV_VAR).unwrap_or(defaults.api_url);
        let auth_token = read(API_TOKEN_ENV_VAR);

        let request_timeout_secs = match read(TIMEOUT_ENV_VAR) {
            Some(raw) => parse_positive::<u64>(TIMEOUT_ENV_VAR, &raw)?,
            None => defaults.request_timeout_secs,
        };
        let connect_timeout_secs = match read(CONNECT_TIMEOUT_ENV_VAR) {
            Some(raw) => parse_positive::<u64>(CONNECT_TIMEOUT_ENV_VAR, &raw)?,
            None => defaults.connect_timeout_secs,
        };
        let recommendation_limit = match read(RECOMMENDATION_LIMIT_ENV_VAR) {
            Some(raw) => parse_positive::<usize>(RECOMMENDATION_LIMIT_ENV_VAR, &raw)?,
            None => defaults.recommendation_limit,
        };

        Ok(Self {
            api_url,
            auth_token,
            request_timeout_secs,
            connect_timeout_secs,
            recommendation_limit,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

// Zero is rejected: a zero timeout fails every request and a zero limit asks for nothing
fn parse_positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = raw
        .parse::<T>()
        .with_context(|| format!("{} must be a positive whole number, got '{}'", key, raw))?;
    if value == T::default() {
        anyhow::bail!("{} must be greater than zero", key);
    }
    Ok(value)
}
