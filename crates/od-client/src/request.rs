//! HTTP request building with OData-specific headers.

use serde_json::Value;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Builder for a single API request.
///
/// The shared client headers are applied at execution time; this type
/// only carries per-request state.
#[derive(Debug)]
pub struct ApiRequest {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) body: Option<Value>,
    /// Ask for the mutated representation back on write operations.
    pub(crate) prefer_representation: bool,
    /// The operation name recorded in error context.
    pub(crate) operation: String,
}

impl ApiRequest {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            prefer_representation: false,
            operation: "execute".to_string(),
        }
    }

    /// GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, url)
    }

    /// PATCH request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, url)
    }

    /// DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, url)
    }

    /// Set the JSON body. Write headers (`Content-Type` with minimal
    /// OData metadata and `Prefer: return=representation`) are added at
    /// execution time.
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.prefer_representation = true;
        self
    }

    /// Name the operation for error context.
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// The target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}
