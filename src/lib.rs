//! SQLite university database: schema, fake data and report queries.
//!
//! # Intention
//!
//! - Create the five university tables (groups, lecturers, subjects, students,
//!   grades) in a single SQLite file.
//! - Fill them with generated data and print them back.
//! - Run parameterized report queries stored as plain `.sql` files.
//!
//! # Architectural Boundaries
//!
//! - Every operation is one synchronous SQL statement on a `rusqlite`
//!   connection; there is no pooling or batching.
//! - Data generation does no I/O; the random source is passed in.

pub mod connection;
pub mod display;
pub mod error;
pub mod generator;
pub mod query;
pub mod repository;
pub mod schema;
pub mod settings;

use rusqlite::Connection;

pub use connection::{with_connection, ConnectionScope};
pub use error::{Result, SeedError};
pub use generator::{FakeDataset, GeneratorConfig};
pub use query::{QueryRunner, Row, SqlQuery, Value};
pub use repository::{Repository, SeedReport};
pub use settings::Settings;

/// Ensures the schema exists and inserts `dataset` into it.
pub fn seed(conn: &Connection, dataset: &FakeDataset) -> Result<SeedReport> {
    schema::initialize_schema(conn, &schema::university_schema())?;
    Repository::new(conn).insert_dataset(dataset)
}
