//! Error types for fmp-odata-client.

use serde_json::Value;

/// Result type alias for od-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for od-client operations.
///
/// Errors are created at the point of failure, never mutated, and
/// returned by value. The runtime never retries on its own; retry
/// policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Call-site context attached by the operation that failed.
    pub context: Option<CallContext>,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            source: None,
        }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            context: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach call-site context without disturbing the error's
    /// classification. The status code reported by [`Error::status_code`]
    /// is the one assigned where the failure happened.
    pub fn in_context(mut self, context: CallContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The backend status code, when this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Backend { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Returns true if this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport { .. })
    }

    /// Returns true if this is a backend error response (status >= 400).
    pub fn is_backend(&self) -> bool {
        matches!(self.kind, ErrorKind::Backend { .. })
    }

    /// Returns true if this is a decode failure.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ErrorKind::Decode { .. })
    }

    /// Returns true if this is a not-found business condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The request could not be sent, or the response body could not
    /// be read.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The backend answered with status >= 400.
    #[error("backend returned {status}: {details}")]
    Backend { status: u16, details: ErrorDetails },

    /// The body was received but not parseable as the expected shape,
    /// even after sanitization. Carries the sanitized body.
    #[error("response body could not be decoded")]
    Decode { body: String },

    /// A query legitimately returned zero rows where a single result
    /// was required. A business condition, not a protocol fault.
    #[error("no matching row: {0}")]
    NotFound(String),

    /// Input to struct projection did not serialize to an object.
    #[error("projection error: {0}")]
    Projection(String),

    /// Invalid configuration or construction input.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The decoded detail payload of a backend error response.
#[derive(Debug, Clone)]
pub enum ErrorDetails {
    /// The error body parsed as a JSON object.
    Parsed(Value),
    /// The raw body text, kept when the body is not valid JSON.
    Raw(String),
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetails::Parsed(value) => write!(f, "{value}"),
            ErrorDetails::Raw(text) => write!(f, "{text}"),
        }
    }
}

impl ErrorDetails {
    /// The raw body text, when the details could not be parsed.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            ErrorDetails::Raw(text) => Some(text),
            ErrorDetails::Parsed(_) => None,
        }
    }

    /// The parsed error body, when the backend sent valid JSON.
    pub fn as_parsed(&self) -> Option<&Value> {
        match self {
            ErrorDetails::Parsed(value) => Some(value),
            ErrorDetails::Raw(_) => None,
        }
    }
}

/// Context describing the call site of a failed operation: the
/// attempted action, the resolved request URL, the query options in
/// effect, and the payload submitted, so failures stay debuggable
/// without re-deriving the request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// The operation that was attempted, e.g. `insert`.
    pub operation: String,
    /// The fully resolved request URL.
    pub url: String,
    /// The serialized query options in effect, when any.
    pub options: Option<String>,
    /// The request payload, for write operations.
    pub payload: Option<Value>,
}

impl CallContext {
    /// Context for an operation against a URL.
    pub fn new(operation: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            url: url.into(),
            options: None,
            payload: None,
        }
    }

    /// Record the query string that was in effect.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Record the payload that was submitted.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("invalid URL: {err}")), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_preserved_through_context() {
        let err = Error::new(ErrorKind::Backend {
            status: 404,
            details: ErrorDetails::Raw("gone".to_string()),
        })
        .in_context(CallContext::new("single", "https://api/Customers('1')"));

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.context.as_ref().unwrap().operation, "single");
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = Error::new(ErrorKind::Transport {
            message: "connection refused".to_string(),
        });
        assert_eq!(err.status_code(), None);
        assert!(err.is_transport());
        assert!(!err.is_backend());
    }

    #[test]
    fn test_details_accessors() {
        let raw = ErrorDetails::Raw("<html>oops</html>".to_string());
        assert_eq!(raw.as_raw(), Some("<html>oops</html>"));
        assert!(raw.as_parsed().is_none());

        let parsed = ErrorDetails::Parsed(serde_json::json!({"code": 102}));
        assert!(parsed.as_raw().is_none());
        assert_eq!(parsed.as_parsed().unwrap()["code"], 102);
    }

    #[test]
    fn test_error_kind_display_messages() {
        let cases: Vec<(ErrorKind, &str)> = vec![
            (
                ErrorKind::Transport {
                    message: "timed out".into(),
                },
                "transport error: timed out",
            ),
            (
                ErrorKind::Backend {
                    status: 500,
                    details: ErrorDetails::Raw("boom".into()),
                },
                "backend returned 500: boom",
            ),
            (
                ErrorKind::Decode {
                    body: "{broken".into(),
                },
                "could not be decoded",
            ),
            (ErrorKind::NotFound("Customers".into()), "no matching row"),
            (
                ErrorKind::Projection("not a struct".into()),
                "projection error: not a struct",
            ),
            (
                ErrorKind::Config("empty base url".into()),
                "configuration error: empty base url",
            ),
        ];

        for (kind, expected_substring) in cases {
            let display = kind.to_string();
            assert!(
                display.contains(expected_substring),
                "Expected '{display}' to contain '{expected_substring}'"
            );
        }
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::other("pipe closed");
        let err = Error::with_source(
            ErrorKind::Transport {
                message: "body read failed".into(),
            },
            source_err,
        );
        assert!(err.source.is_some());
        assert_eq!(err.to_string(), "transport error: body read failed");
    }

    #[test]
    fn test_call_context_builder() {
        let ctx = CallContext::new("update", "https://api/Customers('x')")
            .with_options("$select=\"name\"")
            .with_payload(serde_json::json!({"name": "n"}));
        assert_eq!(ctx.options.as_deref(), Some("$select=\"name\""));
        assert!(ctx.payload.is_some());
    }
}
