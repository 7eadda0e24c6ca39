use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Schema definition for the SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<String>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            indexes: Vec::new(),
        }
    }
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }
    pub fn foreign_key(mut self, column: &str, foreign_table: &str) -> Self {
        self.foreign_keys.push(ForeignKey::new(column, foreign_table));
        self
    }
    pub fn check(mut self, expression: &str) -> Self {
        self.checks.push(expression.to_string());
        self
    }
    pub fn index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.push(IndexDefinition {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::sql).collect();
        parts.extend(self.checks.iter().map(|c| format!("CHECK ({c})")));
        parts.extend(self.foreign_keys.iter().map(ForeignKey::sql));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            parts.join(",\n    ")
        )
    }

    /// `CREATE INDEX IF NOT EXISTS` statements for this table.
    pub fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                    index.name,
                    self.name,
                    index.columns.join(", ")
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }
    /// `INTEGER PRIMARY KEY`, which SQLite aliases to the rowid.
    pub fn id() -> Self {
        Self::new("id", DataType::Integer).with_constraint(ColumnConstraint::PrimaryKey)
    }
    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    fn sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
}

impl ColumnConstraint {
    fn sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    /// Reference to the `id` column of `foreign_table`.
    pub fn new(column: &str, foreign_table: &str) -> Self {
        Self {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: "id".to_string(),
        }
    }

    fn sql(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            self.column, self.foreign_table, self.foreign_column
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
}

fn name_column() -> ColumnDefinition {
    ColumnDefinition::new("name", DataType::Text).with_constraint(ColumnConstraint::NotNull)
}

/// The five university tables, parents before children.
pub fn university_schema() -> Schema {
    Schema::new()
        .add_table(
            TableDefinition::new("groups")
                .column(ColumnDefinition::id())
                .column(name_column()),
        )
        .add_table(
            TableDefinition::new("lecturers")
                .column(ColumnDefinition::id())
                .column(name_column()),
        )
        .add_table(
            TableDefinition::new("students")
                .column(ColumnDefinition::id())
                .column(name_column())
                .column(ColumnDefinition::new("group_id", DataType::Integer))
                .foreign_key("group_id", "groups"),
        )
        .add_table(
            TableDefinition::new("subjects")
                .column(ColumnDefinition::id())
                .column(name_column())
                .column(ColumnDefinition::new("lecturer_id", DataType::Integer))
                .foreign_key("lecturer_id", "lecturers"),
        )
        .add_table(
            TableDefinition::new("grades")
                .column(ColumnDefinition::id())
                .column(ColumnDefinition::new("student_id", DataType::Integer))
                .column(ColumnDefinition::new("subject_id", DataType::Integer))
                .column(ColumnDefinition::new("grade", DataType::Integer))
                .column(ColumnDefinition::new("date", DataType::Text))
                .check("grade BETWEEN 1 AND 6")
                .foreign_key("student_id", "students")
                .foreign_key("subject_id", "subjects")
                .index("idx_grades_student", &["student_id"])
                .index("idx_grades_subject", &["subject_id"]),
        )
}

/// Create every table and index of `schema` that does not exist yet.
pub fn initialize_schema(conn: &Connection, schema: &Schema) -> Result<()> {
    for table in &schema.tables {
        conn.execute(&table.create_sql(), [])?;
        for sql in table.index_sql() {
            conn.execute(&sql, [])?;
        }
        debug!(table = %table.name, "ensured table exists");
    }
    Ok(())
}
