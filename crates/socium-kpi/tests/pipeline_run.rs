mod support;

use chrono::{TimeZone, Utc};
use socium_kpi::fixtures::{load_fixtures, FixtureGenerator, FixtureProfile};
use socium_kpi::kpi::ExtractError;
use socium_kpi::store::{
    Aggregation, CountFilter, DocumentStore, GroupRow, InMemoryStore, StoreError,
    TRACKED_COLLECTIONS,
};
use socium_kpi::{KpiDomain, KpiPipeline, MetricSink};
use support::{RecordingGateway, RefusingGateway, PREFIX};

fn seeded_store(seed: u64) -> InMemoryStore {
    let now = Utc
        .with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("valid instant");
    let profile = FixtureProfile {
        companies: 3,
        ..FixtureProfile::default()
    };
    let fixtures = FixtureGenerator::new(seed, profile, now).generate();
    let store = InMemoryStore::new();
    load_fixtures(&store, &fixtures).expect("fixtures load");
    store
}

#[derive(Debug)]
struct BrokenCollectionStore {
    inner: InMemoryStore,
    broken: &'static str,
}

impl DocumentStore for BrokenCollectionStore {
    fn aggregate(&self, aggregation: &Aggregation) -> Result<Vec<GroupRow>, StoreError> {
        if aggregation.collection == self.broken {
            return Err(StoreError::Query {
                collection: aggregation.collection.clone(),
                message: "connection reset".to_string(),
            });
        }
        self.inner.aggregate(aggregation)
    }

    fn count(&self, collection: &str, filter: &CountFilter) -> Result<u64, StoreError> {
        self.inner.count(collection, filter)
    }
}

#[test]
fn full_run_submits_every_kpi_in_order() {
    let store = seeded_store(42);
    let gateway = RecordingGateway::default();
    let sink = gateway.sink();

    let summary = KpiPipeline::new(&store, &sink).run().expect("run succeeds");

    let domains: Vec<KpiDomain> = summary.stages.iter().map(|stage| stage.domain).collect();
    assert_eq!(domains, KpiDomain::ordered().to_vec());
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.sent(), gateway.payloads().len());

    let points = gateway.points();
    assert!(points
        .iter()
        .all(|point| point.metric.starts_with(&format!("{PREFIX}."))));
    assert!(points.iter().all(|point| point.tags.ends_with(&[
        "env:dev".to_string(),
        "source:mongo".to_string(),
        "app:socium".to_string(),
    ])));
    assert!(gateway
        .payloads()
        .iter()
        .all(|payload| payload.series.len() == 1 && payload.series[0].points.len() == 1));

    let system = gateway.points_named("system.collection.count");
    assert_eq!(system.len(), TRACKED_COLLECTIONS.len());
    for collection in TRACKED_COLLECTIONS {
        let expected = store
            .count(collection, &CountFilter::All)
            .expect("count succeeds") as f64;
        let tag = format!("collection:{collection}");
        let point = system
            .iter()
            .find(|point| point.domain_tags() == [tag.as_str()])
            .expect("point per collection");
        assert_eq!(point.value, expected);
    }
}

#[test]
fn rerun_against_unchanged_store_reports_identical_values() {
    let store = seeded_store(9);

    let first = RecordingGateway::default();
    let second = RecordingGateway::default();
    let first_sink = first.sink();
    let second_sink = second.sink();
    KpiPipeline::new(&store, &first_sink).run().expect("first run");
    KpiPipeline::new(&store, &second_sink).run().expect("second run");

    let strip = |gateway: &RecordingGateway| -> Vec<(String, Vec<String>, f64)> {
        gateway
            .points()
            .into_iter()
            .map(|point| (point.metric, point.tags, point.value))
            .collect()
    };
    assert_eq!(strip(&first), strip(&second));
    assert!(!first.points().is_empty());
}

#[test]
fn refused_submissions_are_counted_without_aborting() {
    let store = seeded_store(42);
    let sink = MetricSink::new(Box::new(RefusingGateway), PREFIX);

    let summary = KpiPipeline::new(&store, &sink).run().expect("run completes");

    assert_eq!(summary.stages.len(), 6);
    assert_eq!(summary.sent(), 0);
    assert_eq!(summary.rejected(), 0);
    assert!(summary.submission_failures() > 0);
    assert_eq!(summary.failed(), summary.submission_failures());
}

#[test]
fn store_failure_aborts_remaining_stages() {
    let store = BrokenCollectionStore {
        inner: seeded_store(42),
        broken: "payrolls",
    };
    let gateway = RecordingGateway::default();
    let sink = gateway.sink();

    let err = KpiPipeline::new(&store, &sink)
        .run()
        .expect_err("payroll stage fails");

    assert_eq!(err.domain, KpiDomain::Payroll);
    assert!(matches!(
        err.source,
        ExtractError::Store(StoreError::Query { .. })
    ));
    assert!(!gateway.points_named("documents.count").is_empty());
    assert!(gateway.points_named("workflows.count").is_empty());
    assert!(gateway.points_named("system.collection.count").is_empty());
}

#[test]
fn domain_subset_runs_in_canonical_order() {
    let store = seeded_store(42);
    let gateway = RecordingGateway::default();
    let sink = gateway.sink();

    let pipeline = KpiPipeline::new(&store, &sink)
        .with_domains(&[KpiDomain::System, KpiDomain::Documents]);
    assert_eq!(pipeline.domains(), [KpiDomain::Documents, KpiDomain::System]);

    let summary = pipeline.run().expect("subset run");
    assert_eq!(summary.stages.len(), 2);
    assert!(gateway.points_named("payroll.gross_salary").is_empty());
    assert_eq!(gateway.points_named("system.collection.count").len(), 8);
}
