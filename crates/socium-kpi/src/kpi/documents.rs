use super::emit::{emit_count, emit_rows, GroupedMetric, Tagging};
use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{Aggregation, CountFilter, DocumentStore, GroupBy};

const BY_STATUS: [GroupedMetric; 1] = [GroupedMetric::new(
    "documents.count",
    "count",
    Tagging::GroupKey("status"),
)];

pub(super) fn extract(store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
    let rows = store.aggregate(
        &Aggregation::new("documents", GroupBy::Field("status".into())).count("count"),
    )?;
    let mut tally = emit_rows(sink, &rows, &BY_STATUS)?;

    let expired = store.count("documents", &CountFilter::field_equals("status", "expired"))?;
    tally.merge(emit_count(sink, "documents.expired", expired, Vec::new()));

    Ok(tally)
}
