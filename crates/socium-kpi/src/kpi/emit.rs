use chrono::NaiveDate;
use mongodb::bson::Bson;

use super::ExtractError;
use crate::sink::{MetricSink, Tally};
use crate::store::{GroupRow, DAY_FORMAT};

/// How a group key is attached to the emitted point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tagging {
    Untagged,
    /// `<name>:<group key>`
    GroupKey(&'static str),
    /// Key is a `YYYY-MM-DD` day; it becomes the point timestamp.
    DayBucket,
}

/// Maps one accumulator output of every group row to a metric.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupedMetric {
    pub metric: &'static str,
    pub output: &'static str,
    pub tagging: Tagging,
}

impl GroupedMetric {
    pub const fn new(metric: &'static str, output: &'static str, tagging: Tagging) -> Self {
        Self {
            metric,
            output,
            tagging,
        }
    }
}

/// Emits one point per (row, metric) pair, row by row.
pub(crate) fn emit_rows(
    sink: &MetricSink,
    rows: &[GroupRow],
    metrics: &[GroupedMetric],
) -> Result<Tally, ExtractError> {
    let mut tally = Tally::default();
    for row in rows {
        for metric in metrics {
            let (tags, timestamp) = match metric.tagging {
                Tagging::Untagged => (Vec::new(), None),
                Tagging::GroupKey(name) => (vec![format!("{name}:{}", row.key_label())], None),
                Tagging::DayBucket => (
                    vec!["granularity:day".to_string()],
                    Some(day_bucket_timestamp(&row.key)?),
                ),
            };
            tally.record(&sink.send(metric.metric, row.value(metric.output), tags, timestamp));
        }
    }
    Ok(tally)
}

pub(crate) fn emit_count(sink: &MetricSink, metric: &str, count: u64, tags: Vec<String>) -> Tally {
    let value = Bson::Int64(i64::try_from(count).unwrap_or(i64::MAX));
    let mut tally = Tally::default();
    tally.record(&sink.send(metric, &value, tags, None));
    tally
}

/// Seconds since the epoch for UTC midnight of a `YYYY-MM-DD` bucket key.
pub fn day_bucket_timestamp(key: &Bson) -> Result<i64, ExtractError> {
    let raw = match key {
        Bson::String(raw) => raw,
        other => {
            return Err(ExtractError::DayBucket {
                key: other.to_string(),
                reason: "bucket key is not a string".to_string(),
            })
        }
    };

    let day = NaiveDate::parse_from_str(raw, DAY_FORMAT).map_err(|err| ExtractError::DayBucket {
        key: raw.clone(),
        reason: err.to_string(),
    })?;

    Ok(day.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bucket_is_utc_midnight() {
        let ts = day_bucket_timestamp(&Bson::String("2024-01-02".into())).expect("parses");
        assert_eq!(ts, 1_704_153_600);
    }

    #[test]
    fn malformed_day_bucket_is_an_error() {
        assert!(matches!(
            day_bucket_timestamp(&Bson::String("02/01/2024".into())),
            Err(ExtractError::DayBucket { .. })
        ));
        assert!(matches!(
            day_bucket_timestamp(&Bson::Null),
            Err(ExtractError::DayBucket { .. })
        ));
    }
}
