use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};

use super::{
    Accumulator, Aggregation, CollectionWriter, CountFilter, DocumentStore, GroupBy, GroupRow,
    StoreError, DAY_FORMAT,
};

/// Process-local store that evaluates aggregations with MongoDB `$group`
/// semantics. Groups are returned in first-seen order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, collection: &str, documents: Vec<Document>) -> Self {
        if let Ok(mut guard) = self.collections.lock() {
            guard
                .entry(collection.to_string())
                .or_default()
                .extend(documents);
        }
        self
    }

    pub fn documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.guard()?.get(collection).cloned().unwrap_or_default())
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Runtime("in-memory store lock poisoned".to_string()))
    }
}

impl DocumentStore for InMemoryStore {
    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<GroupRow>, StoreError> {
        let guard = self.guard()?;
        let documents = guard
            .get(&aggregation.collection)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut groups: Vec<(Bson, Vec<&Document>)> = Vec::new();
        for document in documents {
            let key = group_key(&aggregation.collection, &aggregation.group_by, document)?;
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, members)) => members.push(document),
                None => groups.push((key, vec![document])),
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, members)| {
                let mut values = Document::new();
                for (output, accumulator) in &aggregation.outputs {
                    values.insert(output.as_str(), accumulate(accumulator, &members));
                }
                GroupRow { key, values }
            })
            .collect())
    }

    fn count(&self, collection: &str, filter: &CountFilter) -> Result<u64, StoreError> {
        let guard = self.guard()?;
        let documents = guard.get(collection).map(Vec::as_slice).unwrap_or_default();
        let matching = match filter {
            CountFilter::All => documents.len(),
            CountFilter::FieldEquals { field, value } => documents
                .iter()
                .filter(|document| matches!(document.get(field), Some(Bson::String(s)) if s == value))
                .count(),
        };
        Ok(matching as u64)
    }
}

impl CollectionWriter for InMemoryStore {
    fn clear(&self, collection: &str) -> Result<u64, StoreError> {
        let mut guard = self.guard()?;
        let removed = guard.remove(collection).map(|docs| docs.len()).unwrap_or(0);
        Ok(removed as u64)
    }

    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let inserted = documents.len();
        self.guard()?
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(inserted)
    }
}

fn group_key(collection: &str, group_by: &GroupBy, document: &Document) -> Result<Bson, StoreError> {
    match group_by {
        GroupBy::Nothing => Ok(Bson::Null),
        GroupBy::Field(field) => Ok(document.get(field).cloned().unwrap_or(Bson::Null)),
        GroupBy::Day(field) => match document.get(field) {
            None | Some(Bson::Null) | Some(Bson::Undefined) => Ok(Bson::Null),
            Some(Bson::DateTime(value)) => {
                let day = DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis())
                    .map(|instant| instant.format(DAY_FORMAT).to_string())
                    .ok_or_else(|| StoreError::Query {
                        collection: collection.to_string(),
                        message: format!("'{field}' is outside the representable date range"),
                    })?;
                Ok(Bson::String(day))
            }
            Some(other) => Err(StoreError::Query {
                collection: collection.to_string(),
                message: format!(
                    "$dateToString requires a date for '{field}', found {:?}",
                    other.element_type()
                ),
            }),
        },
    }
}

fn accumulate(accumulator: &Accumulator, members: &[&Document]) -> Bson {
    match accumulator {
        Accumulator::Count => match i32::try_from(members.len()) {
            Ok(count) => Bson::Int32(count),
            Err(_) => Bson::Int64(members.len() as i64),
        },
        Accumulator::Sum(field) => {
            let numbers: Vec<Number> = members
                .iter()
                .filter_map(|document| document.get(field).and_then(Number::from_bson))
                .collect();
            sum(&numbers)
        }
        Accumulator::Avg(field) => {
            let numbers: Vec<f64> = members
                .iter()
                .filter_map(|document| document.get(field).and_then(Number::from_bson))
                .map(Number::as_f64)
                .collect();
            if numbers.is_empty() {
                Bson::Null
            } else {
                Bson::Double(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Self::Int(i64::from(*v))),
            Bson::Int64(v) => Some(Self::Int(*v)),
            Bson::Double(v) => Some(Self::Float(*v)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

fn sum(numbers: &[Number]) -> Bson {
    if numbers.iter().any(|n| matches!(n, Number::Float(_))) {
        return Bson::Double(numbers.iter().map(|n| n.as_f64()).sum());
    }

    let mut total: i64 = 0;
    for number in numbers {
        if let Number::Int(v) = number {
            match total.checked_add(*v) {
                Some(next) => total = next,
                None => return Bson::Double(numbers.iter().map(|n| n.as_f64()).sum()),
            }
        }
    }

    match i32::try_from(total) {
        Ok(small) => Bson::Int32(small),
        Err(_) => Bson::Int64(total),
    }
}
