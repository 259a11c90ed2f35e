use clap::Args;
use socium_kpi::config::AppConfig;
use socium_kpi::error::AppError;
use socium_kpi::sink::DatadogClient;
use socium_kpi::store::MongoStore;
use socium_kpi::{KpiDomain, KpiPipeline, MetricSink, RunSummary};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Restrict the run to these KPI domains (repeatable)
    #[arg(long = "only", value_name = "DOMAIN")]
    pub(crate) only: Vec<KpiDomain>,
}

pub(crate) fn run(config: &AppConfig, args: RunArgs) -> Result<(), AppError> {
    let runtime = Arc::new(Runtime::new()?);
    // Driver handles must be dropped with a runtime in context.
    let _guard = runtime.enter();

    let store = MongoStore::connect(
        config.store.uri_or_default(),
        &config.store.database,
        runtime.clone(),
    )?;
    let gateway = DatadogClient::from_config(&config.metrics, runtime.clone())?;
    let sink = MetricSink::new(Box::new(gateway), config.metrics.metric_prefix.clone());

    let mut pipeline = KpiPipeline::new(&store, &sink);
    if !args.only.is_empty() {
        pipeline = pipeline.with_domains(&args.only);
    }

    info!(
        database = store.database_name(),
        environment = ?config.environment,
        stages = pipeline.domains().len(),
        "starting KPI run"
    );
    let summary = pipeline.run()?;
    render_summary(&summary);
    Ok(())
}

fn render_summary(summary: &RunSummary) {
    let rule = "=".repeat(50);
    println!("{rule}");
    println!("Done in {:.2}s", summary.elapsed.as_secs_f64());
    println!("Sent: {}", summary.sent());
    println!(
        "Failed: {} ({} rejected values, {} submission errors)",
        summary.failed(),
        summary.rejected(),
        summary.submission_failures()
    );
    for stage in &summary.stages {
        println!(
            "- {}: {} sent, {} failed",
            stage.domain.label(),
            stage.sent,
            stage.rejected + stage.submission_failures
        );
    }
    println!("{rule}");
}
