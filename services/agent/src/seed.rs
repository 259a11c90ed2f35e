use chrono::Utc;
use clap::Args;
use socium_kpi::config::AppConfig;
use socium_kpi::error::AppError;
use socium_kpi::fixtures::{load_fixtures, FixtureGenerator, FixtureProfile, DEFAULT_SEED};
use socium_kpi::store::MongoStore;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Random seed; the same seed and day reproduce the same records
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
    /// Number of companies to generate
    #[arg(long, default_value_t = FixtureProfile::default().companies)]
    pub(crate) companies: usize,
}

pub(crate) fn run(config: &AppConfig, args: SeedArgs) -> Result<(), AppError> {
    let uri = config.store.require_uri()?;

    info!(seed = args.seed, companies = args.companies, "generating fixtures");
    let profile = FixtureProfile {
        companies: args.companies,
        ..FixtureProfile::default()
    };
    let fixtures = FixtureGenerator::new(args.seed, profile, Utc::now()).generate();

    let runtime = Arc::new(Runtime::new()?);
    let _guard = runtime.enter();

    info!("connecting to MongoDB");
    let store = MongoStore::connect_uri_database(uri, &config.store.database, runtime.clone())?;
    let inserted = load_fixtures(&store, &fixtures)?;

    info!(database = store.database_name(), "fixtures loaded");
    for (collection, count) in inserted {
        info!(collection, count, "collection seeded");
    }
    Ok(())
}
