//! Gauge submission with uniform tagging and per-call outcome accounting.

mod datadog;
mod payload;

use chrono::Utc;
use mongodb::bson::Bson;
use tracing::debug;

pub use datadog::{DatadogClient, MetricsGateway, SubmitError, SERIES_PATH};
pub use payload::{MetricIntakeType, MetricPayload, MetricPoint, MetricSeries};

/// Tags appended to every emitted point.
pub const FIXED_TAGS: [&str; 3] = ["env:dev", "source:mongo", "app:socium"];

/// Why a value never reached the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    Missing,
    NonNumeric(String),
}

/// Result of a single `send` call.
#[derive(Debug)]
pub enum SendOutcome {
    Sent,
    Rejected(RejectReason),
    Failed(SubmitError),
}

/// Running counts of send outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub sent: usize,
    pub rejected: usize,
    pub submission_failures: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Sent => self.sent += 1,
            SendOutcome::Rejected(_) => self.rejected += 1,
            SendOutcome::Failed(_) => self.submission_failures += 1,
        }
    }

    pub fn merge(&mut self, other: Tally) {
        self.sent += other.sent;
        self.rejected += other.rejected;
        self.submission_failures += other.submission_failures;
    }

    /// Rejections plus submission failures.
    pub fn failed(&self) -> usize {
        self.rejected + self.submission_failures
    }
}

/// Converts a stored value into a gauge reading.
pub fn gauge_value(value: &Bson) -> Result<f64, RejectReason> {
    match value {
        Bson::Null | Bson::Undefined => Err(RejectReason::Missing),
        Bson::Double(v) => Ok(*v),
        Bson::Int32(v) => Ok(f64::from(*v)),
        Bson::Int64(v) => Ok(*v as f64),
        Bson::Boolean(v) => Ok(if *v { 1.0 } else { 0.0 }),
        Bson::Decimal128(v) => v
            .to_string()
            .parse::<f64>()
            .map_err(|_| RejectReason::NonNumeric(v.to_string())),
        Bson::String(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| RejectReason::NonNumeric(raw.clone())),
        other => Err(RejectReason::NonNumeric(format!("{:?}", other.element_type()))),
    }
}

/// Builds namespaced, uniformly tagged gauge points and hands them to a
/// [`MetricsGateway`], one series per call.
#[derive(Debug)]
pub struct MetricSink {
    gateway: Box<dyn MetricsGateway>,
    prefix: String,
}

impl MetricSink {
    pub fn new(gateway: Box<dyn MetricsGateway>, prefix: impl Into<String>) -> Self {
        Self {
            gateway,
            prefix: prefix.into(),
        }
    }

    pub fn metric_name(&self, name: &str) -> String {
        format!("{}.{name}", self.prefix)
    }

    /// Submits `value` as `<prefix>.<name>`. `timestamp` defaults to now.
    pub fn send(
        &self,
        name: &str,
        value: &Bson,
        tags: Vec<String>,
        timestamp: Option<i64>,
    ) -> SendOutcome {
        let value = match gauge_value(value) {
            Ok(value) => value,
            Err(reason) => {
                debug!(metric = name, ?reason, "metric value rejected");
                return SendOutcome::Rejected(reason);
            }
        };

        let mut tags = tags;
        tags.extend(FIXED_TAGS.iter().map(|tag| tag.to_string()));
        let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());

        let payload = MetricPayload::single_gauge(self.metric_name(name), value, timestamp, tags);
        match self.gateway.submit(&payload) {
            Ok(()) => SendOutcome::Sent,
            Err(err) => {
                debug!(metric = name, error = %err, "metric submission failed");
                SendOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Decimal128;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct CapturingGateway {
        payloads: Arc<Mutex<Vec<MetricPayload>>>,
        refuse: bool,
    }

    impl MetricsGateway for CapturingGateway {
        fn submit(&self, payload: &MetricPayload) -> Result<(), SubmitError> {
            if self.refuse {
                return Err(SubmitError::Rejected {
                    status: 403,
                    body: "Forbidden".to_string(),
                });
            }
            self.payloads.lock().expect("payload mutex").push(payload.clone());
            Ok(())
        }
    }

    #[test]
    fn coerces_numeric_shapes() {
        assert_eq!(gauge_value(&Bson::Int32(3)), Ok(3.0));
        assert_eq!(gauge_value(&Bson::Int64(500_000)), Ok(500_000.0));
        assert_eq!(gauge_value(&Bson::Double(3.25)), Ok(3.25));
        assert_eq!(gauge_value(&Bson::Boolean(true)), Ok(1.0));
        assert_eq!(gauge_value(&Bson::String(" 42 ".into())), Ok(42.0));
        let decimal: Decimal128 = "12.5".parse().expect("decimal parses");
        assert_eq!(gauge_value(&Bson::Decimal128(decimal)), Ok(12.5));
    }

    #[test]
    fn rejects_missing_and_non_numeric_values() {
        assert_eq!(gauge_value(&Bson::Null), Err(RejectReason::Missing));
        assert!(matches!(
            gauge_value(&Bson::String("seven".into())),
            Err(RejectReason::NonNumeric(_))
        ));
        assert!(matches!(
            gauge_value(&Bson::Array(vec![Bson::Int32(1)])),
            Err(RejectReason::NonNumeric(_))
        ));
    }

    #[test]
    fn rejected_values_never_reach_gateway() {
        let gateway = CapturingGateway::default();
        let sink = MetricSink::new(Box::new(gateway.clone()), "socium.v10");

        let outcome = sink.send("performance.avg_score", &Bson::Null, Vec::new(), None);

        assert!(matches!(outcome, SendOutcome::Rejected(RejectReason::Missing)));
        assert!(gateway.payloads.lock().expect("payload mutex").is_empty());
    }

    #[test]
    fn non_numeric_values_never_reach_gateway() {
        let gateway = CapturingGateway::default();
        let sink = MetricSink::new(Box::new(gateway.clone()), "socium.v10");

        let text = sink.send("workflows.pending", &Bson::String("?".into()), Vec::new(), None);
        let array = sink.send(
            "payroll.gross_salary",
            &Bson::Array(vec![Bson::Int32(1)]),
            vec!["period:2024-01".to_string()],
            None,
        );

        assert!(matches!(text, SendOutcome::Rejected(RejectReason::NonNumeric(_))));
        assert!(matches!(array, SendOutcome::Rejected(RejectReason::NonNumeric(_))));
        assert!(gateway.payloads.lock().expect("payload mutex").is_empty());
    }

    #[test]
    fn appends_fixed_tags_after_caller_tags_and_prefixes_name() {
        let gateway = CapturingGateway::default();
        let sink = MetricSink::new(Box::new(gateway.clone()), "socium.v10");

        let outcome = sink.send(
            "job.funnel",
            &Bson::Int32(7),
            vec!["status:hired".to_string(), "env:dev".to_string()],
            Some(1_700_000_000),
        );
        assert!(matches!(outcome, SendOutcome::Sent));

        let payloads = gateway.payloads.lock().expect("payload mutex");
        let series = &payloads[0].series[0];
        assert_eq!(series.metric, "socium.v10.job.funnel");
        assert_eq!(series.kind, MetricIntakeType::Gauge);
        assert_eq!(
            series.tags,
            vec!["status:hired", "env:dev", "env:dev", "source:mongo", "app:socium"]
        );
        assert_eq!(series.points, vec![MetricPoint { timestamp: 1_700_000_000, value: 7.0 }]);
    }

    #[test]
    fn defaults_timestamp_to_now() {
        let gateway = CapturingGateway::default();
        let sink = MetricSink::new(Box::new(gateway.clone()), "socium.v10");

        let before = Utc::now().timestamp();
        sink.send("documents.expired", &Bson::Int64(1), Vec::new(), None);
        let after = Utc::now().timestamp();

        let payloads = gateway.payloads.lock().expect("payload mutex");
        let timestamp = payloads[0].series[0].points[0].timestamp;
        assert!((before..=after).contains(&timestamp));
    }

    #[test]
    fn gateway_errors_become_failed_outcomes() {
        let gateway = CapturingGateway {
            refuse: true,
            ..CapturingGateway::default()
        };
        let sink = MetricSink::new(Box::new(gateway), "socium.v10");

        let mut tally = Tally::default();
        tally.record(&sink.send("workflows.pending", &Bson::Int32(2), Vec::new(), None));
        tally.record(&sink.send("workflows.pending", &Bson::String("?".into()), Vec::new(), None));

        assert_eq!(
            tally,
            Tally {
                sent: 0,
                rejected: 1,
                submission_failures: 1
            }
        );
        assert_eq!(tally.failed(), 2);
    }
}
