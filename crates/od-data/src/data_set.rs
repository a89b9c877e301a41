//! Type-parameterized data set: single fetch, paginated listing, and
//! CRUD against one collection.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use fmp_odata_client::{
    ApiRequest, CallContext, ClientProvider, Error, ErrorKind, ODataClient, Result,
};

use crate::consts::TRUE;
use crate::list::{ListEvent, PageEnvelope, ValueEnvelope};
use crate::options::QueryOptions;
use crate::projection::{project, Projectable};

/// Events buffered between the page fetch loop and the consumer.
const LIST_CHANNEL_CAPACITY: usize = 32;

/// A typed view over one backend collection.
///
/// Cheap to create and clone; all data sets made from one client share
/// its connection pool and header set.
pub struct DataSet<T> {
    client: ODataClient,
    collection: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for DataSet<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for DataSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("collection", &self.collection)
            .field("client", &self.client)
            .finish()
    }
}

impl<T> DataSet<T> {
    /// A data set for `collection`, using the provider's client.
    pub fn new(provider: &impl ClientProvider, collection: impl Into<String>) -> Self {
        Self {
            client: provider.odata_client().clone(),
            collection: collection.into(),
            _record: PhantomData,
        }
    }

    /// The collection this data set reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.client.base_url(), self.collection)
    }

    /// Single-resource URL: the id is wrapped in parentheses unless it
    /// is already a bracketed key or a full edit link.
    fn single_url(&self, id: &str) -> String {
        if id.contains('(') && id.contains(')') {
            id.to_string()
        } else {
            format!("{}({id})", self.collection_url())
        }
    }

    fn query_url(&self, base: String, options: &QueryOptions) -> String {
        let query = options.to_query_string();
        if query.is_empty() {
            base
        } else {
            format!("{base}?{query}")
        }
    }
}

impl<T: DeserializeOwned + Default> DataSet<T> {
    /// Fetch one record by id; the body is decoded directly as the
    /// record type.
    pub async fn single(&self, id: &str, options: &QueryOptions) -> Result<T> {
        let url = self.query_url(self.single_url(id), options);
        let request = ApiRequest::get(&url).operation("single");
        self.client.execute_json(request).await.map_err(|err| {
            err.in_context(
                CallContext::new("single", &url).with_options(options.to_query_string()),
            )
        })
    }

    /// Fetch one record by id from a `{"value": T}` envelope.
    pub async fn single_value(&self, id: &str, options: &QueryOptions) -> Result<T> {
        let url = self.query_url(self.single_url(id), options);
        let request = ApiRequest::get(&url).operation("single_value");
        let envelope: ValueEnvelope<T> =
            self.client.execute_json(request).await.map_err(|err| {
                err.in_context(
                    CallContext::new("single_value", &url)
                        .with_options(options.to_query_string()),
                )
            })?;
        Ok(envelope.value)
    }

    /// Delete one record by id. A non-2xx response is a failure even
    /// when the transport succeeded.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.single_url(id);
        let request = ApiRequest::delete(&url).operation("delete");
        self.client.execute_empty(request).await
    }

    /// Delete every record matching the options' filter.
    pub async fn delete_by_filter(&self, options: &QueryOptions) -> Result<()> {
        let url = self.query_url(self.collection_url(), options);
        let request = ApiRequest::delete(&url).operation("delete_by_filter");
        let _: Value = self.client.execute_json(request).await.map_err(|err| {
            err.in_context(
                CallContext::new("delete_by_filter", &url)
                    .with_options(options.to_query_string()),
            )
        })?;
        Ok(())
    }
}

impl<T: DeserializeOwned + Default + Send + 'static> DataSet<T> {
    /// Stream the collection page by page.
    ///
    /// A background task follows the continuation link sequentially
    /// and sends one [`ListEvent::Page`] per fetched page, then that
    /// page's records in backend order, then a single
    /// [`ListEvent::Done`]. Paging stops when a page comes back
    /// shorter than the configured page size or the continuation link
    /// is empty. Dropping the receiver cancels the loop.
    #[instrument(skip(self, options), fields(collection = %self.collection))]
    pub fn list(&self, options: QueryOptions) -> mpsc::Receiver<ListEvent<T>> {
        let (tx, rx) = mpsc::channel(LIST_CHANNEL_CAPACITY);
        let client = self.client.clone();
        let collection = self.collection.clone();
        let page_size = client.default_page_size();
        let query = options.to_query_string();
        let count_requested = options.count == TRUE;
        let mut url = if query.is_empty() {
            self.collection_url()
        } else {
            format!("{}?{query}", self.collection_url())
        };

        tokio::spawn(async move {
            loop {
                let request = ApiRequest::get(&url).operation("list");
                let envelope: PageEnvelope<T> = match client.execute_json(request).await {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        let err = err.in_context(
                            CallContext::new("list", &url).with_options(query.clone()),
                        );
                        let _ = tx.send(ListEvent::Done(Some(err))).await;
                        return;
                    }
                };

                let mut meta = envelope.meta(&collection);
                if !count_requested {
                    meta.count = None;
                }
                let next_link = meta.next_link.clone();
                let page_len = envelope.value.len();
                debug!(collection = %collection, rows = page_len, "page fetched");

                if tx.send(ListEvent::Page(meta)).await.is_err() {
                    return;
                }
                for record in envelope.value {
                    if tx.send(ListEvent::Record(record)).await.is_err() {
                        return;
                    }
                }

                if page_len < page_size {
                    break;
                }
                match next_link {
                    Some(link) if !link.is_empty() => url = link,
                    _ => break,
                }
            }
            let _ = tx.send(ListEvent::Done(None)).await;
        });

        rx
    }

    /// Drain a listing into a vector, surfacing any mid-stream error.
    pub async fn select_list(&self, options: QueryOptions) -> Result<Vec<T>> {
        let mut events = self.list(options);
        let mut records = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                ListEvent::Record(record) => records.push(record),
                ListEvent::Done(Some(err)) => return Err(err),
                ListEvent::Page(_) | ListEvent::Done(None) => {}
            }
        }
        Ok(records)
    }

    /// Fetch the single record matching the options' filter.
    ///
    /// Zero matching rows is a [`ErrorKind::NotFound`]: a business
    /// condition the caller can act on, not a protocol fault.
    pub async fn select_single(&self, mut options: QueryOptions) -> Result<T> {
        if options.top.is_empty() {
            options.top = "1".to_string();
        }
        let filter = options.filter.clone();

        let mut records = self.select_list(options).await?;
        if records.is_empty() {
            let what = if filter.is_empty() {
                self.collection.clone()
            } else {
                format!("{} matching {filter}", self.collection)
            };
            return Err(Error::new(ErrorKind::NotFound(what)));
        }
        Ok(records.remove(0))
    }
}

impl<T: Projectable + DeserializeOwned + Default> DataSet<T> {
    /// Insert a record, submitting only the named fields. The backend
    /// is asked for the stored representation, which is returned.
    pub async fn insert<S: AsRef<str>>(&self, model: &T, fields: &[S]) -> Result<T> {
        let url = self.collection_url();
        let payload = Value::Object(project(model, fields)?);
        let request = ApiRequest::post(&url)
            .json_value(payload.clone())
            .operation("insert");
        self.client
            .execute_json(request)
            .await
            .map_err(|err| err.in_context(CallContext::new("insert", &url).with_payload(payload)))
    }

    /// Update a record by id or edit link, submitting only the named
    /// fields.
    ///
    /// Edit links the backend hands out sometimes carry a dangling
    /// empty quoted key segment; those segments are stripped before
    /// the request goes out.
    pub async fn update<S: AsRef<str>>(&self, id: &str, model: &T, fields: &[S]) -> Result<T> {
        let url = strip_empty_keys(&self.single_url(id));
        let payload = Value::Object(project(model, fields)?);
        let request = ApiRequest::patch(&url)
            .json_value(payload.clone())
            .operation("update");
        self.client
            .execute_json(request)
            .await
            .map_err(|err| err.in_context(CallContext::new("update", &url).with_payload(payload)))
    }

    /// Update every record matching the options' filter. When quoting
    /// is enabled, every top-level payload key is quoted the same way
    /// select identifiers are.
    pub async fn update_by_filter<S: AsRef<str>>(
        &self,
        model: &T,
        fields: &[S],
        options: &QueryOptions,
    ) -> Result<()> {
        let url = self.query_url(self.collection_url(), options);

        let mut projected = project(model, fields)?;
        if options.quoted {
            projected = projected
                .into_iter()
                .map(|(key, value)| (format!("\"{key}\""), value))
                .collect();
        }
        let payload = Value::Object(projected);

        let request = ApiRequest::patch(&url)
            .json_value(payload.clone())
            .operation("update_by_filter");
        let _: Value = self.client.execute_json(request).await.map_err(|err| {
            err.in_context(
                CallContext::new("update_by_filter", &url)
                    .with_options(options.to_query_string())
                    .with_payload(payload),
            )
        })?;
        Ok(())
    }
}

/// Remove empty quoted key segments from a composite-key URL. The
/// backend sometimes emits an edit link like `T('a','')`, which it
/// then refuses to accept back.
fn strip_empty_keys(url: &str) -> String {
    if !url.contains("''") {
        return url.to_string();
    }
    let Some((prefix, keys)) = url.split_once('(') else {
        return url.to_string();
    };

    let valid: Vec<&str> = keys
        .split(',')
        .map(|key| key.split(')').next().unwrap_or(key))
        .filter(|key| !key.eq_ignore_ascii_case("''"))
        .collect();
    format!("{prefix}({})", valid.join(","))
}
