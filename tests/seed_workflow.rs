use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::{NamedTempFile, TempDir};

use university_sqlite::display::DisplayData;
use university_sqlite::generator::{generate, seeded_rng};
use university_sqlite::schema::{initialize_schema, university_schema};
use university_sqlite::{
    seed, with_connection, GeneratorConfig, QueryRunner, Repository, SeedError, SeedReport, Value,
};

// Helper function to create a temporary file-based database, seeded once
fn create_seeded_db(seed_value: u64) -> Result<(NamedTempFile, SeedReport)> {
    let temp_file = NamedTempFile::new()?;
    let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let report = with_connection(temp_file.path(), |conn| {
        let dataset = generate(
            &mut seeded_rng(Some(seed_value)),
            &GeneratorConfig::default(),
            today,
        )?;
        seed(conn, &dataset)
    })?;
    Ok((temp_file, report))
}

fn count(conn: &Connection, table: &str) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n)
}

fn write_query(dir: &TempDir, name: &str, sql: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    std::fs::write(&path, sql)?;
    Ok(path)
}

fn shipped_query(number: usize) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("queries")
        .join(format!("query_{number}.sql"))
}

#[test]
fn test_seed_counts() {
    test_seed_counts_impl().unwrap();
}

fn test_seed_counts_impl() -> Result<()> {
    let (db, report) = create_seeded_db(1)?;
    let conn = Connection::open(db.path())?;

    assert_eq!(count(&conn, "groups")?, 3);
    assert_eq!(count(&conn, "lecturers")?, 5);
    // Eight subjects, five lecturers: only the first five subjects are kept.
    assert_eq!(count(&conn, "subjects")?, 5);
    assert_eq!(count(&conn, "students")?, 30);
    assert_eq!(count(&conn, "grades")? as usize, report.grades_inserted);
    assert!(report.grades_skipped > 0);
    Ok(())
}

#[test]
fn test_foreign_keys_resolve() {
    test_foreign_keys_resolve_impl().unwrap();
}

fn test_foreign_keys_resolve_impl() -> Result<()> {
    let (db, _) = create_seeded_db(2)?;
    let conn = Connection::open(db.path())?;

    let orphan_students: i64 = conn.query_row(
        "SELECT COUNT(*) FROM students s LEFT JOIN groups g ON g.id = s.group_id WHERE g.id IS NULL",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(orphan_students, 0);

    let orphan_grades: i64 = conn.query_row(
        "SELECT COUNT(*) FROM grades g
         LEFT JOIN students s ON s.id = g.student_id
         LEFT JOIN subjects sub ON sub.id = g.subject_id
         WHERE s.id IS NULL OR sub.id IS NULL",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(orphan_grades, 0);

    let out_of_range: i64 = conn.query_row(
        "SELECT COUNT(*) FROM grades WHERE grade NOT BETWEEN 1 AND 6",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(out_of_range, 0);

    let outside_year: i64 = conn.query_row(
        "SELECT COUNT(*) FROM grades WHERE date < '2024-01-01' OR date > '2024-05-20'",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(outside_year, 0);
    Ok(())
}

#[test]
fn test_schema_twice_keeps_five_tables() {
    let conn = Connection::open_in_memory().unwrap();
    initialize_schema(&conn, &university_schema()).unwrap();
    initialize_schema(&conn, &university_schema()).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 5);
}

#[test]
fn test_second_run_appends() {
    test_second_run_appends_impl().unwrap();
}

fn test_second_run_appends_impl() -> Result<()> {
    let (db, _) = create_seeded_db(3)?;
    let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    with_connection(db.path(), |conn| {
        let dataset = generate(&mut seeded_rng(Some(4)), &GeneratorConfig::default(), today)?;
        seed(conn, &dataset)
    })?;

    let conn = Connection::open(db.path())?;
    assert_eq!(count(&conn, "groups")?, 6);
    assert_eq!(count(&conn, "subjects")?, 10);
    Ok(())
}

#[test]
fn test_group_round_trip_through_display() {
    let conn = Connection::open_in_memory().unwrap();
    initialize_schema(&conn, &university_schema()).unwrap();
    Repository::new(&conn).insert_group("Group Z").unwrap();

    let mut out = Vec::new();
    DisplayData::new(&conn).display_groups(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().any(|line| line == "Name: Group Z"));
}

#[test]
fn test_display_all_lists_every_table() {
    test_display_all_lists_every_table_impl().unwrap();
}

fn test_display_all_lists_every_table_impl() -> Result<()> {
    let (db, report) = create_seeded_db(5)?;
    let conn = Connection::open(db.path())?;
    let mut out = Vec::new();
    DisplayData::new(&conn).display_all(&mut out)?;
    let text = String::from_utf8(out)?;

    assert_eq!(text.matches("Student data:").count(), 30);
    assert_eq!(text.matches("Group data:").count(), 3);
    assert_eq!(text.matches("Lecturer data:").count(), 5);
    assert_eq!(text.matches("Subject data:").count(), 5);
    assert_eq!(text.matches("Grade data:").count(), report.grades_inserted);
    Ok(())
}

#[test]
fn test_runner_binds_group_name() {
    test_runner_binds_group_name_impl().unwrap();
}

fn test_runner_binds_group_name_impl() -> Result<()> {
    let (db, _) = create_seeded_db(6)?;
    let dir = TempDir::new()?;
    let query = write_query(&dir, "group.sql", "SELECT name FROM groups WHERE name = ?")?;

    let mut out = Vec::new();
    let rows = QueryRunner::new(db.path()).execute_sql_query(&query, &["Group A"], &mut out)?;

    assert_eq!(rows, vec![vec![Value::Text("Group A".to_string())]]);
    assert_eq!(String::from_utf8(out)?, "(\"Group A\",)\n");
    Ok(())
}

#[test]
fn test_runner_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let runner = QueryRunner::new(dir.path().join("university.db"));
    let err = runner
        .execute_sql_query(dir.path().join("nope.sql"), &[], &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, SeedError::QueryFileNotFound(_)));
}

#[test]
fn test_runner_malformed_sql_fails() {
    let dir = TempDir::new().unwrap();
    let query = write_query(&dir, "bad.sql", "SELEC name FROM groups").unwrap();
    let runner = QueryRunner::new(dir.path().join("university.db"));
    let err = runner
        .execute_sql_query(&query, &[], &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err, SeedError::Sql(_)));
}

#[test]
fn test_shipped_report_queries_run() {
    test_shipped_report_queries_run_impl().unwrap();
}

fn test_shipped_report_queries_run_impl() -> Result<()> {
    let (db, _) = create_seeded_db(7)?;
    let runner = QueryRunner::new(db.path());
    let mut out = Vec::new();

    let top = runner.execute_sql_query(shipped_query(1), &[], &mut out)?;
    assert_eq!(top.len(), 5);

    let best = runner.execute_sql_query(shipped_query(2), &["Mathematics"], &mut out)?;
    assert_eq!(best.len(), 1);

    let per_group = runner.execute_sql_query(shipped_query(3), &["Mathematics"], &mut out)?;
    assert!(!per_group.is_empty() && per_group.len() <= 3);

    let overall = runner.execute_sql_query(shipped_query(4), &[], &mut out)?;
    assert!(matches!(overall[0][0], Value::Real(avg) if (1.0..=6.0).contains(&avg)));

    runner.execute_sql_query(shipped_query(5), &["John Doe"], &mut out)?;

    let group_a = runner.execute_sql_query(shipped_query(6), &["Group A"], &mut out)?;
    let conn = Connection::open(db.path())?;
    let expected: i64 = conn.query_row(
        "SELECT COUNT(*) FROM students s JOIN groups g ON g.id = s.group_id WHERE g.name = 'Group A'",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(group_a.len() as i64, expected);

    let graded = runner.execute_sql_query(shipped_query(7), &["Group A", "Mathematics"], &mut out)?;
    assert!(graded.iter().all(|row| row.len() == 3));
    Ok(())
}
