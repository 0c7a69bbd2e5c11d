use crate::config::ConfigError;
use http::StatusCode;
use http_body_util::combinators::BoxBody;
use hyper::Response;
use hyper::body::Bytes;
use shared::http::make_json_error_response;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Errors that can occur while handling a request
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Request body exceeds the configured size limit")]
    BodyTooLarge,

    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("Authentication secret is not configured")]
    MissingServerSecret,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// HTTP status this error maps to at the route boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RequestBodyError(_) | GatewayError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::MissingServerSecret
            | GatewayError::HandlerFailed(_)
            | GatewayError::Internal(_)
            | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the caller. Server-side failures stay generic;
    /// the full error goes to the logs instead.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::RequestBodyError(_) => "Failed to read request body".to_string(),
            GatewayError::BodyTooLarge => "Request body too large".to_string(),
            GatewayError::MalformedBody(_) => "Malformed JSON body".to_string(),
            GatewayError::Unauthorized => "Unauthorized".to_string(),
            GatewayError::HandlerFailed(message) if !message.trim().is_empty() => message.clone(),
            GatewayError::MissingServerSecret
            | GatewayError::HandlerFailed(_)
            | GatewayError::Internal(_)
            | GatewayError::Io(_) => "Internal error".to_string(),
        }
    }

    /// Converts the error into the uniform `{"error": ...}` JSON response.
    pub fn into_response(self) -> Response<BoxBody<Bytes, GatewayError>> {
        make_json_error_response(self.status(), &self.public_message())
    }
}

/// Errors that prevent the process from starting.
///
/// These are fatal before the listener binds; no request is ever served
/// with a partially wired gateway.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("No callable handler for route '{0}'")]
    UnresolvableHandler(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::MalformedBody("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::BodyTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(GatewayError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            GatewayError::MissingServerSecret.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::HandlerFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_handler_message_is_surfaced() {
        assert_eq!(
            GatewayError::HandlerFailed("record store unavailable".into()).public_message(),
            "record store unavailable"
        );
        // An empty handler message falls back to the generic one.
        assert_eq!(
            GatewayError::HandlerFailed("  ".into()).public_message(),
            "Internal error"
        );
    }

    #[test]
    fn test_server_faults_stay_generic() {
        assert_eq!(
            GatewayError::MissingServerSecret.public_message(),
            "Internal error"
        );
        assert_eq!(
            GatewayError::Internal("secret detail".into()).public_message(),
            "Internal error"
        );
    }
}
