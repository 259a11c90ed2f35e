use std::sync::Arc;

use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Database};
use tokio::runtime::Runtime;

use super::{Aggregation, CollectionWriter, CountFilter, DocumentStore, GroupRow, StoreError};

/// Synchronous facade over the async MongoDB driver.
pub struct MongoStore {
    database: Database,
    runtime: Arc<Runtime>,
}

impl MongoStore {
    pub fn new(database: Database, runtime: Arc<Runtime>) -> Self {
        Self { database, runtime }
    }

    /// Connects and selects `database`.
    pub fn connect(uri: &str, database: &str, runtime: Arc<Runtime>) -> Result<Self, StoreError> {
        let client = Self::client(uri, &runtime)?;
        Ok(Self::new(client.database(database), runtime))
    }

    /// Connects and selects the database named in the URI, or `fallback` when
    /// the URI names none.
    pub fn connect_uri_database(
        uri: &str,
        fallback: &str,
        runtime: Arc<Runtime>,
    ) -> Result<Self, StoreError> {
        let client = Self::client(uri, &runtime)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback));
        Ok(Self::new(database, runtime))
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    fn client(uri: &str, runtime: &Runtime) -> Result<Client, StoreError> {
        runtime
            .block_on(Client::with_uri_str(uri))
            .map_err(|err| StoreError::Connection(err.to_string()))
    }

    fn query_error(collection: &str, err: mongodb::error::Error) -> StoreError {
        StoreError::Query {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }

    fn write_error(collection: &str, err: mongodb::error::Error) -> StoreError {
        StoreError::Write {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .finish_non_exhaustive()
    }
}

fn filter_document(filter: &CountFilter) -> Document {
    match filter {
        CountFilter::All => doc! {},
        CountFilter::FieldEquals { field, value } => {
            let mut filter = Document::new();
            filter.insert(field.clone(), value.clone());
            filter
        }
    }
}

impl DocumentStore for MongoStore {
    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<GroupRow>, StoreError> {
        let collection = self
            .database
            .collection::<Document>(&aggregation.collection);
        let pipeline = aggregation.pipeline();

        let documents = self
            .runtime
            .block_on(async {
                let cursor = collection.aggregate(pipeline).await?;
                cursor.try_collect::<Vec<Document>>().await
            })
            .map_err(|err| Self::query_error(&aggregation.collection, err))?;
        Ok(documents.into_iter().map(GroupRow::from_document).collect())
    }

    fn count(&self, collection: &str, filter: &CountFilter) -> Result<u64, StoreError> {
        let handle = self.database.collection::<Document>(collection);
        self.runtime
            .block_on(async { handle.count_documents(filter_document(filter)).await })
            .map_err(|err| Self::query_error(collection, err))
    }
}

impl CollectionWriter for MongoStore {
    fn clear(&self, collection: &str) -> Result<u64, StoreError> {
        let handle = self.database.collection::<Document>(collection);
        let result = self
            .runtime
            .block_on(async { handle.delete_many(doc! {}).await })
            .map_err(|err| Self::write_error(collection, err))?;
        Ok(result.deleted_count)
    }

    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let handle = self.database.collection::<Document>(collection);
        let result = self
            .runtime
            .block_on(async { handle.insert_many(documents).await })
            .map_err(|err| Self::write_error(collection, err))?;
        Ok(result.inserted_ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_filters_render_as_equality_documents() {
        assert_eq!(filter_document(&CountFilter::All), doc! {});
        assert_eq!(
            filter_document(&CountFilter::field_equals("status", "expired")),
            doc! { "status": "expired" }
        );
    }
}
