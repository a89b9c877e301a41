//! # fmp-odata-data
//!
//! Generic data sets over the core client in `fmp-odata-client`:
//! query option translation, struct projection, paginated listing, and
//! CRUD against named collections.
//!
//! The backend this targets deviates from standard OData in small,
//! consistent ways; the translation layer here papers over them:
//! field identifiers are double-quoted by default, the encoded query
//! string has its over-zealous percent-escapes repaired, and edit
//! links with dangling empty key segments are cleaned before use.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fmp_odata_client::ODataClient;
//! use fmp_odata_data::{consts, Collection, ListEvent, QueryOptions, RawParams};
//!
//! let client = ODataClient::new("https://host/fmi/odata/v4/database")?
//!     .with_header("Authorization", "Bearer token");
//! let customers = Collection::new(&client, "Customers");
//!
//! let params: RawParams = [
//!     (consts::SELECT, "uuid,name"),
//!     (consts::FILTER, "city eq 'Oslo'"),
//! ]
//! .into_iter()
//! .collect();
//! let options = QueryOptions::default().apply_arguments("", &params);
//!
//! let mut events = customers.data_set::<Customer>().list(options);
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ListEvent::Page(meta) => println!("page of {}", meta.model),
//!         ListEvent::Record(customer) => println!("{}", customer.name),
//!         ListEvent::Done(None) => break,
//!         ListEvent::Done(Some(err)) => return Err(err.into()),
//!     }
//! }
//! ```

pub mod consts;

mod collection;
mod data_set;
mod list;
mod options;
mod params;
mod projection;

pub use collection::Collection;
pub use data_set::DataSet;
pub use list::{ListEvent, PageMeta};
pub use options::{merge_filter, QueryOptions};
pub use params::RawParams;
pub use projection::{project, project_all, project_slice, FieldSpec, Projectable};

// Re-exported so downstream code can match on failures without naming
// the client crate.
pub use fmp_odata_client::{
    CallContext, ClientProvider, Error, ErrorDetails, ErrorKind, ODataClient, Result,
};
