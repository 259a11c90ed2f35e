use mongodb::bson::{doc, Bson, Document};

/// Format used for calendar-day buckets, matching `$dateToString`.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// How documents are partitioned by a `$group` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// Group on the raw value of a field.
    Field(String),
    /// Group on the UTC calendar day (`YYYY-MM-DD`) of a date field.
    Day(String),
    /// A single group spanning the whole collection.
    Nothing,
}

/// Per-group summary statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulator {
    Count,
    Sum(String),
    Avg(String),
}

/// One grouping aggregation over a named collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub collection: String,
    pub group_by: GroupBy,
    pub outputs: Vec<(String, Accumulator)>,
}

impl Aggregation {
    pub fn new(collection: impl Into<String>, group_by: GroupBy) -> Self {
        Self {
            collection: collection.into(),
            group_by,
            outputs: Vec::new(),
        }
    }

    pub fn count(mut self, output: &str) -> Self {
        self.outputs.push((output.to_string(), Accumulator::Count));
        self
    }

    pub fn sum(mut self, output: &str, field: &str) -> Self {
        self.outputs
            .push((output.to_string(), Accumulator::Sum(field.to_string())));
        self
    }

    pub fn avg(mut self, output: &str, field: &str) -> Self {
        self.outputs
            .push((output.to_string(), Accumulator::Avg(field.to_string())));
        self
    }

    /// Renders the aggregation as a MongoDB pipeline with a single `$group` stage.
    pub fn pipeline(&self) -> Vec<Document> {
        let id = match &self.group_by {
            GroupBy::Field(field) => Bson::String(format!("${field}")),
            GroupBy::Day(field) => Bson::Document(doc! {
                "$dateToString": { "format": DAY_FORMAT, "date": format!("${field}") }
            }),
            GroupBy::Nothing => Bson::Null,
        };

        let mut group = doc! { "_id": id };
        for (output, accumulator) in &self.outputs {
            let expression = match accumulator {
                Accumulator::Count => doc! { "$sum": 1 },
                Accumulator::Sum(field) => doc! { "$sum": format!("${field}") },
                Accumulator::Avg(field) => doc! { "$avg": format!("${field}") },
            };
            group.insert(output.as_str(), expression);
        }

        vec![doc! { "$group": group }]
    }
}

/// A single `$group` result: the group key plus its accumulated outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Bson,
    pub values: Document,
}

impl GroupRow {
    pub fn from_document(mut document: Document) -> Self {
        let key = document.remove("_id").unwrap_or(Bson::Null);
        Self {
            key,
            values: document,
        }
    }

    /// Accumulated output by name; absent outputs read as null.
    pub fn value(&self, output: &str) -> &Bson {
        self.values.get(output).unwrap_or(&Bson::Null)
    }

    /// The group key as it appears in a `key:value` tag.
    pub fn key_label(&self) -> String {
        match &self.key {
            Bson::String(value) => value.clone(),
            Bson::Null | Bson::Undefined => "none".to_string(),
            Bson::Int32(value) => value.to_string(),
            Bson::Int64(value) => value.to_string(),
            Bson::Double(value) => format!("{value:?}"),
            Bson::Boolean(value) => value.to_string(),
            other => other.to_string(),
        }
    }
}
