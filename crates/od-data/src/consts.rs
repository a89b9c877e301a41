//! Recognized query option keys.
//!
//! The `$`-prefixed keys map to their OData equivalents and are sent to
//! the backend. The bare keys (`quoted`, `quote`, `dequote`) and the
//! extraction flags control client-side behavior only and never reach
//! the backend as-is.

/// `$select`: comma-joined list of field names.
pub const SELECT: &str = "$select";
/// `$filter`: boolean expression string.
pub const FILTER: &str = "$filter";
/// `$top`: maximum row count.
pub const TOP: &str = "$top";
/// `$skip`: rows to skip.
pub const SKIP: &str = "$skip";
/// `$count`: request a total row count.
pub const COUNT: &str = "$count";
/// `$orderby`: sort specification.
pub const ORDERBY: &str = "$orderby";
/// `$format`: response format, defaults to `json`.
pub const FORMAT: &str = "$format";
/// `$expand`: navigation expansion.
pub const EXPAND: &str = "$expand";

/// `quoted`: default field-quoting mode, on unless set to `false`.
pub const QUOTED: &str = "quoted";
/// `quote`: repeatable; force-quote these identifiers.
pub const QUOTE: &str = "quote";
/// `dequote`: repeatable; force-unquote these identifiers.
pub const DEQUOTE: &str = "dequote";

/// Extraction flag for `@odata.editLink`.
pub const ODATA_EDIT_LINK: &str = "$odataeditlink";
/// Extraction flag for `@odata.id`.
pub const ODATA_ID: &str = "$odataid";
/// Extraction flag for `@odata.readLink`.
pub const ODATA_READ_LINK: &str = "$odatareadlink";
/// Extraction flag for `@odata.etag`.
pub const ODATA_ETAG: &str = "$odataetag";
/// Extraction flag for `@odata.navigationLink`.
pub const ODATA_NAVIGATION_LINK: &str = "$odatanavigationlink";

/// Flag value for enabled options.
pub const TRUE: &str = "true";
/// Flag value for disabled options.
pub const FALSE: &str = "false";
