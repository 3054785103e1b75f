use crate::services::providers::ProviderError;
use axum::http::StatusCode;
use thiserror::Error;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str =
    "Method Not Allowed. This function only accepts POST requests.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid JSON format in request body or missing 'phrase'.";
pub const MISSING_PHRASE_MESSAGE: &str = "Missing 'phrase' in request body.";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Server configuration error: API key not found. Please contact support.";
pub const PROVIDER_FAILURE_PREFIX: &str = "Failed to get explanation from AI:";

/// Every way a decode request can end without an explanation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body is not a JSON object with a string 'phrase'")]
    InvalidBody,

    #[error("phrase is empty")]
    MissingPhrase,

    #[error("provider credential is not configured")]
    MissingCredential,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DecodeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DecodeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            DecodeError::InvalidBody | DecodeError::MissingPhrase => StatusCode::BAD_REQUEST,
            DecodeError::MissingCredential | DecodeError::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text placed in the `error` field of the response body.
    ///
    /// Provider failures carry the provider's own message.
    pub fn client_message(&self) -> String {
        match self {
            DecodeError::MethodNotAllowed => METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            DecodeError::InvalidBody => INVALID_BODY_MESSAGE.to_string(),
            DecodeError::MissingPhrase => MISSING_PHRASE_MESSAGE.to_string(),
            DecodeError::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            DecodeError::Provider(err) => format!("{} {}", PROVIDER_FAILURE_PREFIX, err),
        }
    }

    /// Label used for the request outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            DecodeError::MethodNotAllowed => "method_not_allowed",
            DecodeError::InvalidBody => "invalid_body",
            DecodeError::MissingPhrase => "missing_phrase",
            DecodeError::MissingCredential => "missing_credential",
            DecodeError::Provider(_) => "provider_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            DecodeError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(DecodeError::InvalidBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(DecodeError::MissingPhrase.status_code(), StatusCode::BAD_REQUEST);
        assert_ne!(
            DecodeError::InvalidBody.client_message(),
            DecodeError::MissingPhrase.client_message()
        );
    }

    #[test]
    fn provider_error_text_is_passed_through() {
        let err = DecodeError::from(ProviderError::NetworkError("connection reset".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.client_message(),
            "Failed to get explanation from AI: Network error: connection reset"
        );
    }

    #[test]
    fn missing_credential_message_is_generic() {
        assert_eq!(
            DecodeError::MissingCredential.client_message(),
            MISSING_CREDENTIAL_MESSAGE
        );
    }
}
