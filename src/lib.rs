//! # fmp-odata
//!
//! OData client runtime for FileMaker-style OData services: backends
//! that speak OData v4 but misparse standard percent-encoding, emit
//! malformed JSON for nulls and negative fractions, and want field
//! identifiers double-quoted.
//!
//! This crate re-exports the full surface of the two member crates:
//!
//! - [`fmp_odata_client`]: the HTTP client, request execution,
//!   response classification and body repair, and the error taxonomy
//! - [`fmp_odata_data`]: query option translation, struct projection,
//!   streamed paginated listing, and typed CRUD data sets
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use fmp_odata::{Collection, ODataClient, QueryOptions, RawParams, consts};
//!
//! #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
//! struct Customer {
//!     uuid: String,
//!     name: String,
//! }
//! fmp_odata::impl_projectable!(Customer, visible: ["uuid", "name"]);
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ODataClient::new("https://host/fmi/odata/v4/database")?
//!         .with_header("Authorization", "Bearer token");
//!     let customers = Collection::new(&client, "Customers");
//!
//!     let params: RawParams = [(consts::FILTER, "name eq 'Ada'")].into_iter().collect();
//!     let options = QueryOptions::default().apply_arguments("", &params);
//!     let ada: Customer = customers.data_set().select_single(options).await?;
//!     println!("{}", ada.uuid);
//!     Ok(())
//! }
//! ```

pub use fmp_odata_client::{
    ApiRequest, CallContext, ClientConfig, ClientConfigBuilder, ClientProvider, Error,
    ErrorDetails, ErrorKind, ODataClient, RequestMethod, Result, DEFAULT_PAGE_SIZE,
};
pub use fmp_odata_data::{
    consts, merge_filter, project, project_all, project_slice, Collection, DataSet, FieldSpec,
    ListEvent, PageMeta, Projectable, QueryOptions, RawParams,
};
pub use fmp_odata_data::impl_projectable;
