#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use socium_kpi::sink::{MetricPayload, MetricsGateway, SubmitError, FIXED_TAGS};
use socium_kpi::MetricSink;

pub const PREFIX: &str = "socium.v10";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPoint {
    pub metric: String,
    pub value: f64,
    pub timestamp: i64,
    pub tags: Vec<String>,
}

impl RecordedPoint {
    /// Tags minus the three appended to every point.
    pub fn domain_tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|tag| !FIXED_TAGS.iter().any(|fixed| fixed == tag))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    payloads: Arc<Mutex<Vec<MetricPayload>>>,
}

impl RecordingGateway {
    pub fn sink(&self) -> MetricSink {
        MetricSink::new(Box::new(self.clone()), PREFIX)
    }

    pub fn payloads(&self) -> Vec<MetricPayload> {
        self.payloads.lock().expect("payload mutex").clone()
    }

    pub fn points(&self) -> Vec<RecordedPoint> {
        self.payloads()
            .into_iter()
            .flat_map(|payload| payload.series)
            .flat_map(|series| {
                let tags = series.tags.clone();
                let metric = series.metric.clone();
                series.points.into_iter().map(move |point| RecordedPoint {
                    metric: metric.clone(),
                    value: point.value,
                    timestamp: point.timestamp,
                    tags: tags.clone(),
                })
            })
            .collect()
    }

    pub fn points_named(&self, name: &str) -> Vec<RecordedPoint> {
        let metric = format!("{PREFIX}.{name}");
        self.points()
            .into_iter()
            .filter(|point| point.metric == metric)
            .collect()
    }
}

impl MetricsGateway for RecordingGateway {
    fn submit(&self, payload: &MetricPayload) -> Result<(), SubmitError> {
        self.payloads
            .lock()
            .expect("payload mutex")
            .push(payload.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RefusingGateway;

impl MetricsGateway for RefusingGateway {
    fn submit(&self, _payload: &MetricPayload) -> Result<(), SubmitError> {
        Err(SubmitError::Rejected {
            status: 403,
            body: "{\"errors\":[\"Forbidden\"]}".to_string(),
        })
    }
}

pub fn with_status(statuses: &[(&str, usize)]) -> Vec<Document> {
    statuses
        .iter()
        .flat_map(|(status, count)| (0..*count).map(move |_| doc! { "status": *status }))
        .collect()
}

pub fn utc(rfc3339: &str) -> BsonDateTime {
    let parsed = chrono::DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp");
    BsonDateTime::from_millis(parsed.timestamp_millis())
}
