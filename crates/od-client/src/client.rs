//! Core OData HTTP client: shared headers, request execution, response
//! classification.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{CallContext, Error, ErrorKind, Result};
use crate::request::ApiRequest;
use crate::response::{backend_error, decode_body};

/// HTTP client for an OData service.
///
/// The header set is captured at construction time and immutable
/// afterwards; [`ODataClient::with_header`] returns a new client value.
/// This makes a client safe to share across any number of data sets
/// and concurrent listings.
#[derive(Clone)]
pub struct ODataClient {
    http: reqwest::Client,
    base_url: String,
    headers: Arc<Vec<(String, String)>>,
    config: ClientConfig,
}

impl std::fmt::Debug for ODataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataClient")
            .field("base_url", &self.base_url)
            .field("headers", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Access to an [`ODataClient`] from a host-supplied wrapper.
///
/// A host application that wraps the client for authentication or
/// session handling implements this and can hand the wrapper anywhere
/// a client is expected. The client implements it for itself.
pub trait ClientProvider {
    /// The underlying OData client.
    fn odata_client(&self) -> &ODataClient;
}

impl ClientProvider for ODataClient {
    fn odata_client(&self) -> &ODataClient {
        self
    }
}

impl ODataClient {
    /// Create a new client for the given service base URL with default
    /// configuration.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "base URL must not be empty".to_string(),
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        let headers = vec![
            ("dataserviceversion".to_string(), "4.0".to_string()),
            ("odata-version".to_string(), "4.0".to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ];

        Ok(Self {
            http,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            headers: Arc::new(headers),
            config,
        })
    }

    /// Return a new client carrying an additional header. An existing
    /// header with the same name is replaced.
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(existing, _)| *existing != name)
            .cloned()
            .collect();
        headers.push((name, value.into()));

        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            headers: Arc::new(headers),
            config: self.config.clone(),
        }
    }

    /// The service base URL, always with a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The page size the backend is expected to serve.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a request and decode the body as `T`.
    ///
    /// A 204 response short-circuits to `T::default()` with no decode.
    pub async fn execute_json<T: DeserializeOwned + Default>(
        &self,
        request: ApiRequest,
    ) -> Result<T> {
        let (status, body) = self.dispatch(&request).await?;
        if status == 204 {
            return Ok(T::default());
        }
        decode_body(&body)
            .map_err(|err| err.in_context(CallContext::new(&request.operation, &request.url)))
    }

    /// Execute a request where no response body is expected. A non-2xx
    /// status is still a failure even when the transport succeeded.
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(&request).await.map(|_| ())
    }

    /// Send the request, read the body, and classify the response.
    /// Returns the status and body for successful statuses only.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn dispatch(&self, request: &ApiRequest) -> Result<(u16, String)> {
        let mut req = self
            .http
            .request(request.method.to_reqwest(), &request.url);

        for (name, value) in self.headers.iter() {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = req.json(body);
            req = req.header("Content-Type", "application/json;odata.metadata=minimal");
            if request.prefer_representation {
                req = req.header("Prefer", "return=representation");
            }
        }

        if self.config.enable_tracing {
            debug!("sending request");
        }

        let response = req.send().await.map_err(|e| {
            Error::with_source(
                ErrorKind::Transport {
                    message: "request could not be sent".to_string(),
                },
                e,
            )
            .in_context(CallContext::new(&request.operation, &request.url))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            Error::with_source(
                ErrorKind::Transport {
                    message: "response body could not be read".to_string(),
                },
                e,
            )
            .in_context(CallContext::new(&request.operation, &request.url))
        })?;

        if self.config.enable_tracing {
            if (200..300).contains(&status) {
                debug!(status, "response received");
            } else {
                info!(status, "non-success response");
            }
        }

        if status >= 400 {
            return Err(backend_error(status, &body)
                .in_context(CallContext::new(&request.operation, &request.url)));
        }

        Ok((status, body))
    }
}
