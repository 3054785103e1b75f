use crate::services::providers::{
    GenerationParams, ProviderKind, ProviderSettings, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub common: core_config::Config,
    pub provider: ProviderSettings,
    /// Provider API key. Absence is reported per request, not at startup.
    pub credential: Option<Secret<String>>,
    pub generation: GenerationParams,
    pub otlp_endpoint: Option<String>,
}

impl DecodeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from any key/value source; `load` passes the process environment.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind: ProviderKind = get("DECODE_PROVIDER")
            .unwrap_or_else(|| "openai".to_string())
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("DECODE_PROVIDER: {}", e)))?;

        let mut provider = ProviderSettings::new(kind);
        if let Some(model) = get("DECODE_MODEL") {
            provider.model = model;
        }
        if let Some(base_url) = get("DECODE_API_BASE_URL") {
            provider.base_url = base_url;
        }
        provider.request_timeout =
            parse_var(&get, "DECODE_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);

        let credential = match kind.credential_env() {
            Some(var) => get(var).map(Secret::new),
            // The mock needs no key; hand it a placeholder so requests go through.
            None => Some(Secret::new("mock".to_string())),
        };

        let generation = GenerationParams {
            temperature: Some(
                parse_var(&get, "DECODE_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE),
            ),
            max_tokens: Some(parse_var(&get, "DECODE_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        };

        Ok(DecodeConfig {
            common,
            provider,
            credential,
            generation,
            otlp_endpoint: get("OTLP_ENDPOINT"),
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
            })
        })
        .transpose()
}
