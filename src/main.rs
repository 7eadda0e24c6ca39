use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use university_sqlite::display::DisplayData;
use university_sqlite::generator::{generate, seeded_rng};
use university_sqlite::{seed, with_connection, GeneratorConfig, QueryRunner, Settings};

/// Parameters for `query_1.sql` .. `query_7.sql`, in order.
const REPORT_QUERIES: [&[&str]; 7] = [
    &[],
    &["Mathematics"],
    &["Mathematics"],
    &[],
    &["John Doe"],
    &["Group A"],
    &["Group A", "Mathematics"],
];

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::load().context("Failed to load settings")?;
    info!(database = %settings.database_path.display(), seed = ?settings.seed, "starting seed run");

    let mut rng = seeded_rng(settings.seed);
    let today = Local::now().date_naive();
    let generator_config = GeneratorConfig::from(&settings);
    let mut stdout = io::stdout().lock();

    with_connection(&settings.database_path, |conn| {
        let dataset = generate(&mut rng, &generator_config, today)?;
        seed(conn, &dataset)?;
        DisplayData::new(conn).display_all(&mut stdout)
    })
    .with_context(|| {
        format!(
            "Failed to seed database at {}",
            settings.database_path.display()
        )
    })?;

    let runner = QueryRunner::new(&settings.database_path);
    for (i, params) in REPORT_QUERIES.iter().enumerate() {
        let path = settings.query_path(i + 1);
        runner
            .execute_sql_query(&path, params, &mut stdout)
            .with_context(|| format!("Query {} failed", path.display()))?;
    }

    Ok(())
}
