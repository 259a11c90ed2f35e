use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::kpi::{ExtractError, KpiDomain};
use crate::sink::{MetricSink, Tally};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub domain: KpiDomain,
    pub sent: usize,
    pub rejected: usize,
    pub submission_failures: usize,
}

impl StageSummary {
    fn new(domain: KpiDomain, tally: Tally) -> Self {
        Self {
            domain,
            sent: tally.sent,
            rejected: tally.rejected,
            submission_failures: tally.submission_failures,
        }
    }
}

/// Totals for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub stages: Vec<StageSummary>,
}

impl RunSummary {
    fn tally(&self) -> Tally {
        self.stages.iter().fold(Tally::default(), |mut acc, stage| {
            acc.merge(Tally {
                sent: stage.sent,
                rejected: stage.rejected,
                submission_failures: stage.submission_failures,
            });
            acc
        })
    }

    pub fn sent(&self) -> usize {
        self.tally().sent
    }

    pub fn rejected(&self) -> usize {
        self.tally().rejected
    }

    pub fn submission_failures(&self) -> usize {
        self.tally().submission_failures
    }

    /// Rejected values plus failed submissions.
    pub fn failed(&self) -> usize {
        self.tally().failed()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} KPIs failed: {source}", .domain.label())]
pub struct PipelineError {
    pub domain: KpiDomain,
    #[source]
    pub source: ExtractError,
}

/// Runs the KPI extractors once, sequentially, against one store and sink.
#[derive(Debug)]
pub struct KpiPipeline<'a> {
    store: &'a dyn DocumentStore,
    sink: &'a MetricSink,
    domains: Vec<KpiDomain>,
}

impl<'a> KpiPipeline<'a> {
    pub fn new(store: &'a dyn DocumentStore, sink: &'a MetricSink) -> Self {
        Self {
            store,
            sink,
            domains: KpiDomain::ordered().to_vec(),
        }
    }

    /// Restricts the run to `domains`, still in the canonical order.
    pub fn with_domains(mut self, domains: &[KpiDomain]) -> Self {
        self.domains = KpiDomain::ordered()
            .into_iter()
            .filter(|domain| domains.contains(domain))
            .collect();
        self
    }

    pub fn domains(&self) -> &[KpiDomain] {
        &self.domains
    }

    /// The first failing stage aborts the run.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let mut stages = Vec::with_capacity(self.domains.len());

        for &domain in &self.domains {
            info!(domain = domain.label(), "extracting KPIs");
            let tally = domain
                .extract(self.store, self.sink)
                .map_err(|source| PipelineError { domain, source })?;
            info!(
                domain = domain.label(),
                sent = tally.sent,
                failed = tally.failed(),
                "KPIs submitted"
            );
            stages.push(StageSummary::new(domain, tally));
        }

        Ok(RunSummary {
            elapsed: started.elapsed(),
            stages,
        })
    }
}
