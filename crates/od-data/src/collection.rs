//! Collection wrapper: a named collection bound to a client.
//!
//! Host applications typically hold one authenticated client and hand
//! out collections for the tables they work with; each collection can
//! mint typed data sets on demand.

use serde::de::DeserializeOwned;

use fmp_odata_client::{ClientProvider, ODataClient};

use crate::data_set::DataSet;

/// A named backend collection bound to a client.
#[derive(Debug, Clone)]
pub struct Collection {
    client: ODataClient,
    name: String,
}

impl Collection {
    /// Bind a collection name to the provider's client.
    pub fn new(provider: &impl ClientProvider, name: impl Into<String>) -> Self {
        Self {
            client: provider.odata_client().clone(),
            name: name.into(),
        }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection's full URL.
    pub fn url(&self) -> String {
        format!("{}{}", self.client.base_url(), self.name)
    }

    /// A typed data set over this collection.
    pub fn data_set<T: DeserializeOwned>(&self) -> DataSet<T> {
        DataSet::new(&self.client, self.name.clone())
    }
}

impl ClientProvider for Collection {
    fn odata_client(&self) -> &ODataClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url() {
        let client = ODataClient::new("https://host/fmi/odata/v4/db").unwrap();
        let customers = Collection::new(&client, "Customers");

        assert_eq!(customers.name(), "Customers");
        assert_eq!(customers.url(), "https://host/fmi/odata/v4/db/Customers");
    }

    #[test]
    fn test_data_set_inherits_collection() {
        let client = ODataClient::new("https://host/db").unwrap();
        let orders = Collection::new(&client, "Orders");
        let data_set: DataSet<serde_json::Value> = orders.data_set();

        assert_eq!(data_set.collection(), "Orders");
    }

    #[test]
    fn test_collection_is_a_client_provider() {
        let client = ODataClient::new("https://host/db").unwrap();
        let collection = Collection::new(&client, "Customers");

        assert_eq!(
            collection.odata_client().base_url(),
            "https://host/db/"
        );
    }
}
