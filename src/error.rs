use crate::response::ErrorEnvelope;
use thiserror::Error;

/// Main error type for Bitrix24 API operations
#[derive(Debug, Error)]
pub enum Bitrix24Error {
    /// Generic error returned by a REST method
    #[error("API error {code} (HTTP {status}): {description}")]
    Api {
        status: u16,
        code: String,
        description: String,
    },

    /// HTTP transport error with a body that is not an API reply
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The access token used for the call has expired
    #[error("access token expired")]
    ExpiredToken,

    /// The access token is unknown or malformed
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// Too many requests for the portal
    #[error("query limit exceeded: {0}")]
    QueryLimitExceeded(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The application lacks the scope required by the method
    #[error("insufficient scope: {0}")]
    InsufficientScope(String),

    /// The method cannot be called with the current authorization type
    #[error("wrong authorization type: {0}")]
    WrongAuthType(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The portal subscription does not allow REST access
    #[error("payment required: {0}")]
    PaymentRequired(String),

    /// The method has exceeded its time budget on the portal
    #[error("operation time limit exceeded: {0}")]
    OperationTimeLimit(String),

    #[error("batch length exceeded: {0}")]
    BatchLengthExceeded(String),

    #[error("item not found: {0}")]
    NotFound(String),

    /// Token renewal errors
    #[error("token renewal failed ({code}): {description}")]
    TokenRenewal { code: String, description: String },

    #[error("no refresh token available for token renewal")]
    NoRefreshToken,

    #[error("no client secret provided for token renewal")]
    NoClientSecret,

    /// Input validation errors
    #[error("invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown scope code: {0}")]
    UnknownScope(String),

    #[error("application token mismatch")]
    InvalidApplicationToken,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Bitrix24Error {
    /// Map an API error reply to the matching error variant
    pub fn from_api(status: u16, method: &str, envelope: ErrorEnvelope) -> Self {
        let description = envelope.error_description.unwrap_or_default();

        match envelope.error.as_str() {
            "expired_token" => Bitrix24Error::ExpiredToken,
            "invalid_token" | "NO_AUTH_FOUND" => Bitrix24Error::InvalidToken(description),
            "QUERY_LIMIT_EXCEEDED" => Bitrix24Error::QueryLimitExceeded(description),
            "ERROR_METHOD_NOT_FOUND" => Bitrix24Error::MethodNotFound(method.to_string()),
            "insufficient_scope" => Bitrix24Error::InsufficientScope(description),
            "WRONG_AUTH_TYPE" => Bitrix24Error::WrongAuthType(description),
            "ACCESS_DENIED" => Bitrix24Error::AccessDenied(description),
            "PAYMENT_REQUIRED" => Bitrix24Error::PaymentRequired(description),
            "OPERATION_TIME_LIMIT" => Bitrix24Error::OperationTimeLimit(description),
            "ERROR_BATCH_LENGTH_EXCEEDED" => Bitrix24Error::BatchLengthExceeded(description),
            _ if is_not_found_description(&description) => Bitrix24Error::NotFound(description),
            code => Bitrix24Error::Api {
                status,
                code: code.to_string(),
                description,
            },
        }
    }

    /// Check if this error means the requested item does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Bitrix24Error::NotFound(_) => true,
            Bitrix24Error::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Check if this error is a permission error
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Bitrix24Error::AccessDenied(_)
                | Bitrix24Error::InsufficientScope(_)
                | Bitrix24Error::Api { status: 403, .. }
        )
    }

    pub fn is_query_limit_exceeded(&self) -> bool {
        matches!(self, Bitrix24Error::QueryLimitExceeded(_))
    }

    /// Get the HTTP status code if the error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Bitrix24Error::Api { status, .. } | Bitrix24Error::Http { status, .. } => {
                Some(*status)
            }
            Bitrix24Error::ExpiredToken | Bitrix24Error::InvalidToken(_) => Some(401),
            Bitrix24Error::QueryLimitExceeded(_) => Some(503),
            Bitrix24Error::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn is_not_found_description(description: &str) -> bool {
    let lower = description.to_ascii_lowercase();
    lower == "not found" || lower.ends_with(" is not found") || lower.ends_with(" not found.")
}

/// Result type for Bitrix24 operations
pub type Result<T> = std::result::Result<T, Bitrix24Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(code: &str, description: &str) -> ErrorEnvelope {
        ErrorEnvelope {
            error: code.to_string(),
            error_description: Some(description.to_string()),
        }
    }

    #[test]
    fn test_expired_token() {
        let error = Bitrix24Error::from_api(
            401,
            "crm.deal.get",
            envelope("expired_token", "The access token provided has expired."),
        );
        assert!(matches!(error, Bitrix24Error::ExpiredToken));
        assert_eq!(error.status_code(), Some(401));
    }

    #[test]
    fn test_method_not_found_keeps_method_name() {
        let error = Bitrix24Error::from_api(
            404,
            "crm.nothing",
            envelope("ERROR_METHOD_NOT_FOUND", "Method not found!"),
        );
        match error {
            Bitrix24Error::MethodNotFound(method) => assert_eq!(method, "crm.nothing"),
            other => panic!("expected MethodNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_by_description() {
        let error = Bitrix24Error::from_api(400, "crm.deal.get", envelope("", "Not found"));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_unknown_code_is_generic_api_error() {
        let error = Bitrix24Error::from_api(400, "crm.deal.add", envelope("ERROR_CORE", "boom"));
        match &error {
            Bitrix24Error::Api {
                status,
                code,
                description,
            } => {
                assert_eq!(*status, 400);
                assert_eq!(code, "ERROR_CORE");
                assert_eq!(description, "boom");
            }
            other => panic!("expected Api, got {:?}", other),
        }
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_permission_errors() {
        let error = Bitrix24Error::from_api(
            401,
            "crm.deal.list",
            envelope("insufficient_scope", "The request requires higher privileges"),
        );
        assert!(error.is_access_denied());

        let error = Bitrix24Error::from_api(503, "crm.deal.list", envelope("QUERY_LIMIT_EXCEEDED", ""));
        assert!(error.is_query_limit_exceeded());
    }
}
