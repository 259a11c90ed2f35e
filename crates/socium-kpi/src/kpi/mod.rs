//! Business KPI extraction, one module per domain.
//!
//! Every domain is a parameterization of the same shape: run a grouping
//! aggregation, then map each accumulator output of each group to a gauge via
//! [`emit`]. Domains run in the order given by [`KpiDomain::ordered`].

mod documents;
mod emit;
mod job;
mod payroll;
mod performance;
mod system;
mod workflows;

use serde::Serialize;

use crate::sink::{MetricSink, Tally};
use crate::store::{DocumentStore, StoreError};

pub use emit::day_bucket_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiDomain {
    Job,
    Documents,
    Payroll,
    Performance,
    Workflows,
    System,
}

impl KpiDomain {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Job,
            Self::Documents,
            Self::Payroll,
            Self::Performance,
            Self::Workflows,
            Self::System,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Job => "Job",
            Self::Documents => "Documents",
            Self::Payroll => "Payroll",
            Self::Performance => "Performance",
            Self::Workflows => "Workflows",
            Self::System => "System",
        }
    }

    pub fn extract(self, store: &dyn DocumentStore, sink: &MetricSink) -> Result<Tally, ExtractError> {
        match self {
            Self::Job => job::extract(store, sink),
            Self::Documents => documents::extract(store, sink),
            Self::Payroll => payroll::extract(store, sink),
            Self::Performance => performance::extract(store, sink),
            Self::Workflows => workflows::extract(store, sink),
            Self::System => system::extract(store, sink),
        }
    }
}

impl std::str::FromStr for KpiDomain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|domain| domain.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ordered().iter().map(|d| d.label()).collect();
                format!("unknown KPI domain '{value}' (expected one of {})", known.join(", "))
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unparsable day bucket '{key}': {reason}")]
    DayBucket { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_parse_case_insensitively() {
        assert_eq!("payroll".parse::<KpiDomain>(), Ok(KpiDomain::Payroll));
        assert_eq!(" SYSTEM ".parse::<KpiDomain>(), Ok(KpiDomain::System));
        assert!("billing".parse::<KpiDomain>().is_err());
    }

    #[test]
    fn stage_order_is_fixed() {
        let labels: Vec<&str> = KpiDomain::ordered().iter().map(|d| d.label()).collect();
        assert_eq!(
            labels,
            ["Job", "Documents", "Payroll", "Performance", "Workflows", "System"]
        );
    }
}
