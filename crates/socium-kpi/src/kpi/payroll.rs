use super::emit::{emit_rows, GroupedMetric, Tagging};
use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{Aggregation, DocumentStore, GroupBy};

const PER_PERIOD: [GroupedMetric; 3] = [
    GroupedMetric::new("payroll.bulletins.count", "count", Tagging::GroupKey("period")),
    GroupedMetric::new("payroll.gross_salary", "gross", Tagging::GroupKey("period")),
    GroupedMetric::new("payroll.net_salary", "net", Tagging::GroupKey("period")),
];

/// Bulletin count and salary totals for every pay period.
pub(super) fn extract(store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
    let rows = store.aggregate(
        &Aggregation::new("payrolls", GroupBy::Field("period".into()))
            .sum("gross", "gross_salary")
            .sum("net", "net_salary")
            .count("count"),
    )?;
    emit_rows(sink, &rows, &PER_PERIOD)
}
