//! Read and write access to the operational document store.
//!
//! Extractors only see [`DocumentStore`]; the fixture generator only sees
//! [`CollectionWriter`]. Both are implemented by the MongoDB adapter and by an
//! in-process store used in tests.

mod aggregation;
mod memory;
mod mongo;

use std::fmt::Debug;

use mongodb::bson::Document;

pub use aggregation::{Accumulator, Aggregation, GroupBy, GroupRow, DAY_FORMAT};
pub use memory::InMemoryStore;
pub use mongo::MongoStore;

/// Collections whose raw document counts feed the system KPIs.
pub const TRACKED_COLLECTIONS: [&str; 8] = [
    "companies",
    "employees",
    "applications",
    "job_postings",
    "documents",
    "payrolls",
    "performance_reviews",
    "workflows",
];

/// Document selection for plain counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountFilter {
    All,
    FieldEquals { field: String, value: String },
}

impl CountFilter {
    pub fn field_equals(field: &str, value: &str) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub trait DocumentStore: Debug {
    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<GroupRow>, StoreError>;
    fn count(&self, collection: &str, filter: &CountFilter) -> Result<u64, StoreError>;
}

pub trait CollectionWriter: Debug {
    /// Deletes every document in the collection, returning how many were removed.
    fn clear(&self, collection: &str) -> Result<u64, StoreError>;
    fn insert_many(&self, collection: &str, documents: Vec<Document>)
        -> Result<usize, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to connect to document store: {0}")]
    Connection(String),
    #[error("query on '{collection}' failed: {message}")]
    Query { collection: String, message: String },
    #[error("write to '{collection}' failed: {message}")]
    Write { collection: String, message: String },
    #[error("store runtime unavailable: {0}")]
    Runtime(String),
}
