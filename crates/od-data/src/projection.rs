//! Struct projection: restrict a record to a named set of fields.
//!
//! Insert and update bodies carry only the fields the caller names.
//! Rather than inspecting records at runtime, each record type declares
//! a static table of its wire field names via [`Projectable`]; the
//! [`crate::impl_projectable!`] macro writes that table from the same
//! names used in the type's serde attributes.

use serde::Serialize;
use serde_json::{Map, Value};

use fmp_odata_client::{Error, ErrorKind};

/// One field of a projectable record: its wire (serialization tag)
/// name and whether it may leave the process with its real value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The serialized field name, as it appears in JSON.
    pub tag: &'static str,
    /// Hidden fields are emitted as `null` when explicitly requested.
    pub visible: bool,
}

impl FieldSpec {
    /// A field included in projections with its real value.
    pub const fn visible(tag: &'static str) -> Self {
        Self { tag, visible: true }
    }

    /// A field redacted to `null` when requested by name, and skipped
    /// entirely when no field list is given.
    pub const fn hidden(tag: &'static str) -> Self {
        Self { tag, visible: false }
    }
}

/// A record type that knows its own wire field table.
pub trait Projectable: Serialize {
    /// Every declared field, in declaration order.
    fn fields() -> &'static [FieldSpec];
}

/// Project a record to the requested field names.
///
/// Requested names are matched against the record's field table after
/// trimming surrounding quotes and whitespace, so a quoted select list
/// can be passed through unchanged. A name with no matching field is
/// silently dropped; schema drift between caller and record type is
/// tolerated, not fatal. A name matching a hidden field comes back as
/// `null` so the caller can see it was deliberately withheld.
///
/// An empty `fields` slice means "all visible fields".
pub fn project<T, S>(record: &T, fields: &[S]) -> Result<Map<String, Value>, Error>
where
    T: Projectable,
    S: AsRef<str>,
{
    if fields.is_empty() {
        return project_all(record);
    }

    let serialized = serialize_record(record)?;
    let specs = T::fields();

    let mut projected = Map::new();
    for requested in fields {
        let name = trim_field_name(requested.as_ref());
        let Some(spec) = specs.iter().find(|spec| spec.tag == name) else {
            continue;
        };
        if !spec.visible {
            projected.insert(spec.tag.to_string(), Value::Null);
            continue;
        }
        if let Some(value) = serialized.get(spec.tag) {
            projected.insert(spec.tag.to_string(), value.clone());
        }
    }
    Ok(projected)
}

/// Project every record of a slice to the requested field names.
///
/// Field resolution is the same as [`project`], applied per record;
/// an empty `fields` slice means "all visible fields" for every
/// record.
pub fn project_slice<T, S>(
    records: &[T],
    fields: &[S],
) -> Result<Vec<Map<String, Value>>, Error>
where
    T: Projectable,
    S: AsRef<str>,
{
    records
        .iter()
        .map(|record| project(record, fields))
        .collect()
}

/// Project every visible field of a record.
pub fn project_all<T: Projectable>(record: &T) -> Result<Map<String, Value>, Error> {
    let serialized = serialize_record(record)?;

    let mut projected = Map::new();
    for spec in T::fields() {
        if !spec.visible {
            continue;
        }
        if let Some(value) = serialized.get(spec.tag) {
            projected.insert(spec.tag.to_string(), value.clone());
        }
    }
    Ok(projected)
}

/// Serialize a record and insist on a JSON object.
fn serialize_record<T: Serialize>(record: &T) -> Result<Map<String, Value>, Error> {
    let value = serde_json::to_value(record).map_err(|e| {
        Error::with_source(
            ErrorKind::Projection("record could not be serialized".to_string()),
            e,
        )
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::new(ErrorKind::Projection(format!(
            "projection requires a record that serializes to an object, got {}",
            json_type_name(&other)
        )))),
    }
}

/// Strip the double quotes and whitespace a quoted select list carries.
fn trim_field_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '"' || c.is_whitespace())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Implement [`Projectable`] for a record type by listing its wire
/// field names.
///
/// ```rust,ignore
/// impl_projectable!(Customer, visible: ["uuid", "name"], hidden: ["internal_note"]);
/// ```
#[macro_export]
macro_rules! impl_projectable {
    ($record:ty, visible: [$($visible:literal),* $(,)?]) => {
        $crate::impl_projectable!($record, visible: [$($visible),*], hidden: []);
    };
    ($record:ty, visible: [$($visible:literal),* $(,)?], hidden: [$($hidden:literal),* $(,)?]) => {
        impl $crate::Projectable for $record {
            fn fields() -> &'static [$crate::FieldSpec] {
                const FIELDS: &[$crate::FieldSpec] = &[
                    $($crate::FieldSpec::visible($visible),)*
                    $($crate::FieldSpec::hidden($hidden),)*
                ];
                FIELDS
            }
        }
    };
}
