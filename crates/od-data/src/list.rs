//! Streaming protocol for paginated listings.
//!
//! A listing is delivered as a single ordered stream of [`ListEvent`]s
//! over a bounded channel: one [`ListEvent::Page`] per HTTP page
//! fetched, strictly before that page's records, then exactly one
//! [`ListEvent::Done`] carrying the terminating error, if any.

use serde::Deserialize;

use fmp_odata_client::Error;

/// Metadata for one fetched page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    /// Opaque provenance string (`@odata.context`).
    pub context: String,
    /// Total row count; present only when the query requested it.
    pub count: Option<u64>,
    /// The collection the page belongs to.
    pub model: String,
    /// Continuation URL for the next page, when one exists.
    pub next_link: Option<String>,
}

/// One event of a listing stream.
///
/// Every stream ends with exactly one `Done`; a consumer that stops
/// reading early simply drops the receiver, which cancels the
/// background fetch loop.
#[derive(Debug)]
pub enum ListEvent<T> {
    /// Metadata for a page, emitted before that page's records.
    Page(PageMeta),
    /// One record, in the order the backend returned it.
    Record(T),
    /// Terminal event: `None` for normal completion, `Some` when a
    /// page fetch failed and the stream ended early.
    Done(Option<Error>),
}

impl<T> ListEvent<T> {
    /// The record carried by this event, if it is one.
    pub fn into_record(self) -> Option<T> {
        match self {
            ListEvent::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// The list response envelope:
/// `{ "value": [T...], "@odata.context", "@odata.count"?, "@odata.nextLink"? }`.
#[derive(Debug, Deserialize)]
pub(crate) struct PageEnvelope<T> {
    #[serde(rename = "@odata.context", default)]
    pub context: Option<String>,
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> Default for PageEnvelope<T> {
    fn default() -> Self {
        Self {
            context: None,
            count: None,
            next_link: None,
            value: Vec::new(),
        }
    }
}

impl<T> PageEnvelope<T> {
    /// Page metadata for a named collection.
    pub(crate) fn meta(&self, model: &str) -> PageMeta {
        PageMeta {
            context: self.context.clone().unwrap_or_default(),
            count: self.count,
            model: model.to_string(),
            next_link: self.next_link.clone(),
        }
    }
}

/// The single-value envelope: `{ "value": T }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ValueEnvelope<T> {
    pub value: T,
}

impl<T: Default> Default for ValueEnvelope<T> {
    fn default() -> Self {
        Self {
            value: T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_envelope_deserializes_metadata() {
        let body = json!({
            "@odata.context": "https://host/fmi/odata/v4/db/$metadata#Customers",
            "@odata.count": 42,
            "@odata.nextLink": "https://host/fmi/odata/v4/db/Customers?$skip=1000",
            "value": [{"uuid": "a"}, {"uuid": "b"}]
        });
        let envelope: PageEnvelope<serde_json::Value> = serde_json::from_value(body).unwrap();

        assert_eq!(envelope.count, Some(42));
        assert_eq!(envelope.value.len(), 2);
        let meta = envelope.meta("Customers");
        assert_eq!(meta.model, "Customers");
        assert!(meta.next_link.is_some());
    }

    #[test]
    fn test_page_envelope_optional_fields_default() {
        let body = json!({"value": []});
        let envelope: PageEnvelope<serde_json::Value> = serde_json::from_value(body).unwrap();

        assert_eq!(envelope.count, None);
        assert_eq!(envelope.next_link, None);
        assert!(envelope.value.is_empty());
        assert_eq!(envelope.meta("Orders").context, "");
    }

    #[test]
    fn test_value_envelope() {
        let body = json!({"value": {"uuid": "a"}});
        let envelope: ValueEnvelope<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.value["uuid"], "a");
    }

    #[test]
    fn test_into_record() {
        let event: ListEvent<u32> = ListEvent::Record(7);
        assert_eq!(event.into_record(), Some(7));

        let done: ListEvent<u32> = ListEvent::Done(None);
        assert!(done.into_record().is_none());
    }
}
