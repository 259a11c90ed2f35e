use super::emit::{emit_rows, GroupedMetric, Tagging};
use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{Aggregation, DocumentStore, GroupBy};

const OVERALL: [GroupedMetric; 2] = [
    GroupedMetric::new("performance.avg_score", "avg", Tagging::Untagged),
    GroupedMetric::new("performance.reviews.count", "count", Tagging::Untagged),
];

/// An empty collection yields no group, hence no points.
pub(super) fn extract(store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
    let rows = store.aggregate(
        &Aggregation::new("performance_reviews", GroupBy::Nothing)
            .avg("avg", "score")
            .count("count"),
    )?;
    emit_rows(sink, &rows[..rows.len().min(1)], &OVERALL)
}
