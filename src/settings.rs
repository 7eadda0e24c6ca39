use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, SeedError};

/// Runtime settings for a seed run.
///
/// Values are layered: built-in defaults, then an optional `university.toml`
/// in the working directory, then `UNIVERSITY_*` environment variables
/// (e.g. `UNIVERSITY_DATABASE_PATH=/tmp/u.db`, `UNIVERSITY_SEED=42`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Directory holding `query_1.sql` .. `query_7.sql`
    pub queries_dir: PathBuf,
    /// Fixed seed for the fake data generator; random when absent
    pub seed: Option<u64>,
    pub lecturer_count: usize,
    pub student_count: usize,
    pub min_grades_per_subject: usize,
    pub max_grades_per_subject: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("university.db"),
            queries_dir: PathBuf::from("queries"),
            seed: None,
            lecturer_count: 5,
            student_count: 30,
            min_grades_per_subject: 5,
            max_grades_per_subject: 20,
        }
    }
}

impl Settings {
    /// Loads settings from `university.toml` (if present) and the environment.
    ///
    /// A `.env` file in the working directory is read first so its variables
    /// take part in the environment layer.
    pub fn load() -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("university").required(false))
            .add_source(config::Environment::with_prefix("UNIVERSITY").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .map_err(|e| SeedError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_grades_per_subject > self.max_grades_per_subject {
            return Err(SeedError::Config(format!(
                "min_grades_per_subject ({}) exceeds max_grades_per_subject ({})",
                self.min_grades_per_subject, self.max_grades_per_subject
            )));
        }
        Ok(())
    }

    /// Path of the numbered report query inside `queries_dir`.
    pub fn query_path(&self, number: usize) -> PathBuf {
        self.queries_dir.join(format!("query_{number}.sql"))
    }
}
