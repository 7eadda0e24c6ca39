use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::params_from_iter;
use tracing::{debug, info};

use crate::connection::open_connection;
use crate::error::{Result, SeedError};

/// Core value types for SQLite result columns
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(t) => write!(f, "{t:?}"),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// One result row.
pub type Row = Vec<Value>;

/// Tuple-style rendering: `("Group A",)`, `(1, "x", 4.5)`.
pub struct RowDisplay<'a>(pub &'a [Value]);

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        if self.0.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}

/// SQL text with positional string parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<String>,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Vec::new(),
        }
    }

    /// Reads the statement from a file. A missing file is reported as
    /// [`SeedError::QueryFileNotFound`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let statement = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SeedError::QueryFileNotFound(path.to_path_buf())
            } else {
                SeedError::QueryFileRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self {
            statement,
            params: Vec::new(),
        })
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the statement on `conn` and collects every row.
    pub fn execute(&self, conn: &rusqlite::Connection) -> Result<Vec<Row>> {
        let mut stmt = conn.prepare(self.statement.trim())?;
        let columns = stmt.column_count();
        let mut rows = if self.params.is_empty() {
            stmt.query([])?
        } else {
            stmt.query(params_from_iter(self.params.iter()))?
        };

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for i in 0..columns {
                values.push(Value::from(row.get_ref(i)?));
            }
            result.push(values);
        }
        Ok(result)
    }
}

/// Executes SQL files against the database at `db_path`, each on its own
/// short-lived connection.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    db_path: PathBuf,
}

impl QueryRunner {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Loads the statement in `query_file`, binds `params` positionally, runs
    /// it, writes each row to `out` and returns the rows.
    pub fn execute_sql_query(
        &self,
        query_file: impl AsRef<Path>,
        params: &[&str],
        out: &mut impl Write,
    ) -> Result<Vec<Row>> {
        let query_file = query_file.as_ref();
        let query = SqlQuery::from_file(query_file)?.with_params(params.iter().copied());
        debug!(file = %query_file.display(), params = ?query.params, "running query");

        let conn = open_connection(&self.db_path)?;
        let rows = query.execute(&conn)?;
        conn.close().map_err(|(_, e)| SeedError::Close(e))?;

        for row in &rows {
            writeln!(out, "{}", RowDisplay(row))?;
        }
        info!(file = %query_file.display(), rows = rows.len(), "query finished");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn single_column_row_renders_like_a_one_tuple() {
        let row = vec![Value::from("Group A")];
        assert_eq!(RowDisplay(&row).to_string(), "(\"Group A\",)");
    }

    #[test]
    fn mixed_row_renders_each_value() {
        let row = vec![
            Value::Integer(3),
            Value::Text("Ann".into()),
            Value::Real(4.5),
            Value::Null,
        ];
        assert_eq!(RowDisplay(&row).to_string(), "(3, \"Ann\", 4.5, None)");
    }

    #[test]
    fn positional_params_are_bound_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        let rows = SqlQuery::new("SELECT ?1 || '-' || ?2")
            .with_params(["a", "b"])
            .execute(&conn)
            .unwrap();
        assert_eq!(rows, vec![vec![Value::Text("a-b".into())]]);
    }

    #[test]
    fn parameter_count_mismatch_is_a_query_error() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqlQuery::new("SELECT ?1, ?2")
            .with_params(["only one"])
            .execute(&conn);
        assert!(matches!(result, Err(SeedError::Sql(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = SqlQuery::from_file("definitely/not/here.sql").unwrap_err();
        assert!(matches!(err, SeedError::QueryFileNotFound(_)));
    }
}
