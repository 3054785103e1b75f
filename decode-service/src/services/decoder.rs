//! The decode pipeline: validate the event, ask the provider, shape the reply.
//!
//! [`Decoder::handle`] never fails. Every outcome, including provider
//! failures, comes back as a [`FunctionResponse`]:
//!
//! | Outcome | Status |
//! |---|---|
//! | explanation (or fallback for empty output) | 200 |
//! | bad body / missing or empty phrase | 400 |
//! | not POST | 405 |
//! | no credential, provider failure | 500 |

use crate::error::DecodeError;
use crate::models::{FunctionEvent, FunctionResponse};
use crate::services::metrics;
use crate::services::prompts::{Prompt, FALLBACK_EXPLANATION};
use crate::services::providers::{GenerationParams, TextProvider};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// A successful answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    /// True when the provider returned nothing and the fallback was used.
    pub fallback: bool,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Phrase explainer bound to one provider and one credential.
pub struct Decoder {
    provider: Arc<dyn TextProvider>,
    credential: Option<Secret<String>>,
    params: GenerationParams,
}

impl Decoder {
    /// An empty credential counts as missing.
    pub fn new(
        provider: Arc<dyn TextProvider>,
        credential: Option<Secret<String>>,
        params: GenerationParams,
    ) -> Self {
        let credential = credential.filter(|c| !c.expose_secret().trim().is_empty());
        Self {
            provider,
            credential,
            params,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Whether requests can reach the provider at all.
    pub fn is_ready(&self) -> bool {
        self.credential.is_some()
    }

    /// Run one invocation end to end.
    #[tracing::instrument(
        name = "decode",
        skip_all,
        fields(method = %event.http_method, path = %event.path, provider = self.provider.name())
    )]
    pub async fn handle(&self, event: FunctionEvent) -> FunctionResponse {
        match self.decode(&event).await {
            Ok(explanation) => {
                let outcome = if explanation.fallback {
                    "fallback"
                } else {
                    "success"
                };
                metrics::record_decode_request(outcome);
                tracing::info!(
                    outcome,
                    explanation_len = explanation.text.len(),
                    "Phrase explained"
                );
                FunctionResponse::explanation(&explanation.text)
            }
            Err(err) => {
                metrics::record_decode_request(err.outcome());
                if err.status_code().is_client_error() {
                    tracing::info!(outcome = err.outcome(), "Rejected decode request");
                }
                err.into()
            }
        }
    }

    async fn decode(&self, event: &FunctionEvent) -> Result<Explanation, DecodeError> {
        if !event.http_method.eq_ignore_ascii_case("POST") {
            return Err(DecodeError::MethodNotAllowed);
        }

        let body = event.decoded_body()?;
        let phrase = parse_phrase(body.as_deref())?;

        self.explain(&phrase).await
    }

    /// Ask the provider to explain `phrase`.
    pub async fn explain(&self, phrase: &str) -> Result<Explanation, DecodeError> {
        if phrase.is_empty() {
            return Err(DecodeError::MissingPhrase);
        }

        let Some(credential) = &self.credential else {
            tracing::error!(
                provider = self.provider.name(),
                "Provider API key is not configured"
            );
            return Err(DecodeError::MissingCredential);
        };

        let prompt = Prompt::for_phrase(phrase);
        tracing::debug!(phrase = %phrase, phrase_len = phrase.len(), "Explaining phrase");

        let started = Instant::now();
        let result = self
            .provider
            .generate(credential, &prompt, &self.params)
            .await;
        metrics::record_provider_latency(
            self.provider.name(),
            self.provider.model(),
            started.elapsed().as_secs_f64(),
        );

        let response = result.map_err(|e| {
            metrics::record_provider_error(self.provider.name(), e.kind());
            tracing::error!(
                provider = self.provider.name(),
                model = %self.provider.model(),
                error = %e,
                "An error occurred with the AI provider"
            );
            DecodeError::Provider(e)
        })?;

        metrics::record_tokens(
            self.provider.name(),
            self.provider.model(),
            response.input_tokens,
            response.output_tokens,
        );
        tracing::debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_str(),
            "Provider responded"
        );

        let text = response
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let explanation = match text {
            Some(text) => Explanation {
                text: text.to_string(),
                fallback: false,
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
            },
            None => {
                tracing::warn!(
                    finish_reason = response.finish_reason.as_str(),
                    "Provider returned no text; using fallback explanation"
                );
                Explanation {
                    text: FALLBACK_EXPLANATION.to_string(),
                    fallback: true,
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                }
            }
        };

        Ok(explanation)
    }
}

/// Extract the phrase from a JSON body.
///
/// The body must be a JSON object with a `phrase` member. Falsy values
/// (`null`, `""`, `false`, zero, `[]`, `{}`) are reported as a missing
/// phrase; any other non-string value is an invalid body.
pub fn parse_phrase(body: Option<&str>) -> Result<String, DecodeError> {
    let body = body.ok_or(DecodeError::InvalidBody)?;
    let value: Value = serde_json::from_str(body).map_err(|_| DecodeError::InvalidBody)?;

    let Value::Object(map) = value else {
        return Err(DecodeError::InvalidBody);
    };

    match map.get("phrase") {
        None => Err(DecodeError::InvalidBody),
        Some(value) if is_falsy(value) => Err(DecodeError::MissingPhrase),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::InvalidBody),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
