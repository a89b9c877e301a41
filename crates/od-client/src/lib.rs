//! # fmp-odata-client
//!
//! Core HTTP infrastructure for OData services whose implementation
//! deviates from the standard: FileMaker-style backends that misparse
//! percent-encoding, emit malformed JSON for nulls and negative
//! fractions, and are picky about field-identifier quoting.
//!
//! This crate provides:
//! - An [`ODataClient`] with an immutable header set captured at
//!   construction time and the OData protocol headers always present
//! - Request execution with a uniform classification pipeline:
//!   built, sent, body-read, classified, decoded
//! - Best-effort repair of the backend's known malformed JSON patterns
//!   before a single decode retry
//! - One error taxonomy ([`ErrorKind`]) for transport failures, backend
//!   error responses, decode failures, and projection failures
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (fmp-odata-data: query options, projection, data sets)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ODataClient                            │
//! │  - Holds base URL + immutable shared headers                │
//! │  - execute_json / execute_empty                             │
//! │  - Classifies responses, repairs dirty bodies               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use fmp_odata_client::{ODataClient, ApiRequest};
//!
//! let client = ODataClient::new("https://host/fmi/odata/v4/database")?
//!     .with_header("Authorization", "Bearer token");
//!
//! let row: serde_json::Value = client
//!     .execute_json(ApiRequest::get(format!("{}Customers('1')", client.base_url())))
//!     .await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::{ClientProvider, ODataClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{CallContext, Error, ErrorDetails, ErrorKind, Result};
pub use request::{ApiRequest, RequestMethod};
pub use response::{decode_body, repair_body};

/// Page size the backend serves unless configured otherwise; a listing
/// ends when a page comes back shorter than this.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("fmp-odata/", env!("CARGO_PKG_VERSION"));
