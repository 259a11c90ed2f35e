use super::emit::{emit_rows, GroupedMetric, Tagging};
use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{Aggregation, DocumentStore, GroupBy};

const DAILY_APPLICATIONS: [GroupedMetric; 1] = [GroupedMetric::new(
    "job.applications.count",
    "count",
    Tagging::DayBucket,
)];
const FUNNEL: [GroupedMetric; 1] = [GroupedMetric::new(
    "job.funnel",
    "count",
    Tagging::GroupKey("status"),
)];
const POSTINGS_BY_TITLE: [GroupedMetric; 1] = [GroupedMetric::new(
    "job.postings.by_title",
    "count",
    Tagging::GroupKey("title"),
)];

/// Daily application volume, application funnel and postings per title.
pub(super) fn extract(store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
    let mut tally = Tally::default();

    let daily = store.aggregate(
        &Aggregation::new("applications", GroupBy::Day("applied_at".into())).count("count"),
    )?;
    tally.merge(emit_rows(sink, &daily, &DAILY_APPLICATIONS)?);

    let funnel = store.aggregate(
        &Aggregation::new("applications", GroupBy::Field("status".into())).count("count"),
    )?;
    tally.merge(emit_rows(sink, &funnel, &FUNNEL)?);

    let postings = store.aggregate(
        &Aggregation::new("job_postings", GroupBy::Field("title".into())).count("count"),
    )?;
    tally.merge(emit_rows(sink, &postings, &POSTINGS_BY_TITLE)?);

    Ok(tally)
}
