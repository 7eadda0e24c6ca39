use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use crate::error::{Result, SeedError};
use crate::generator::FakeDataset;

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lecturer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub lecturer_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub id: i64,
    pub student_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub grade: Option<i64>,
    pub date: Option<String>,
}

/// Identifiers assigned while persisting a [`FakeDataset`], indexed like the
/// dataset's own vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub group_ids: Vec<i64>,
    pub lecturer_ids: Vec<i64>,
    /// `None` for subjects left without a lecturer, which are not stored
    pub subject_ids: Vec<Option<i64>>,
    pub student_ids: Vec<i64>,
    pub grades_inserted: usize,
    pub grades_skipped: usize,
}

/// Inserts and reads university rows over a borrowed connection.
///
/// Every insert is its own statement, so outside an explicit transaction each
/// row is committed as soon as it is written.
pub struct Repository<'c> {
    conn: &'c Connection,
}

impl<'c> Repository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert_group(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO groups (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_lecturer(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO lecturers (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_subject(&self, name: &str, lecturer_id: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO subjects (name, lecturer_id) VALUES (?1, ?2)",
            params![name, lecturer_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_student(&self, name: &str, group_id: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO students (name, group_id) VALUES (?1, ?2)",
            params![name, group_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// `date` is stored as ISO `YYYY-MM-DD` text.
    pub fn insert_grade(
        &self,
        student_id: i64,
        subject_id: i64,
        grade: u8,
        date: chrono::NaiveDate,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO grades (student_id, subject_id, grade, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                student_id,
                subject_id,
                grade,
                date.format("%Y-%m-%d").to_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Persists `dataset` parents first: groups, lecturers, subjects, students,
    /// then grades.
    ///
    /// Subjects are paired with lecturers by position; subjects beyond the
    /// last lecturer are not stored and their grades are skipped. A grade that
    /// points outside the dataset fails with [`SeedError::UnresolvedReference`].
    pub fn insert_dataset(&self, dataset: &FakeDataset) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for group in &dataset.groups {
            report.group_ids.push(self.insert_group(group)?);
        }
        for lecturer in &dataset.lecturers {
            report.lecturer_ids.push(self.insert_lecturer(lecturer)?);
        }

        report.subject_ids = vec![None; dataset.subjects.len()];
        for (slot, (subject, lecturer_id)) in dataset
            .subjects
            .iter()
            .zip(&report.lecturer_ids)
            .enumerate()
        {
            let id = self.insert_subject(subject, *lecturer_id)?;
            report.subject_ids[slot] = Some(id);
        }

        for (n, student) in dataset.students.iter().enumerate() {
            let group_id = report.group_ids.get(student.group).copied().ok_or(
                SeedError::UnresolvedReference {
                    record: "student",
                    position: n,
                    entity: "group",
                    index: student.group,
                },
            )?;
            report
                .student_ids
                .push(self.insert_student(&student.name, group_id)?);
        }

        for (n, grade) in dataset.grades.iter().enumerate() {
            let student_id = report.student_ids.get(grade.student).copied().ok_or(
                SeedError::UnresolvedReference {
                    record: "grade",
                    position: n,
                    entity: "student",
                    index: grade.student,
                },
            )?;
            let subject_id = report.subject_ids.get(grade.subject).copied().ok_or(
                SeedError::UnresolvedReference {
                    record: "grade",
                    position: n,
                    entity: "subject",
                    index: grade.subject,
                },
            )?;
            match subject_id {
                Some(subject_id) => {
                    self.insert_grade(student_id, subject_id, grade.grade, grade.date)?;
                    report.grades_inserted += 1;
                }
                None => report.grades_skipped += 1,
            }
        }

        if report.grades_skipped > 0 {
            warn!(
                skipped = report.grades_skipped,
                subjects = dataset.subjects.len(),
                lecturers = dataset.lecturers.len(),
                "skipped grades for subjects without a lecturer"
            );
        }
        info!(
            groups = report.group_ids.len(),
            lecturers = report.lecturer_ids.len(),
            subjects = report.subject_ids.iter().flatten().count(),
            students = report.student_ids.len(),
            grades = report.grades_inserted,
            "inserted fake data"
        );
        Ok(report)
    }

    pub fn groups(&self) -> Result<Vec<Group>> {
        self.select_all("SELECT id, name FROM groups", |row| {
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    pub fn lecturers(&self) -> Result<Vec<Lecturer>> {
        self.select_all("SELECT id, name FROM lecturers", |row| {
            Ok(Lecturer {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    pub fn subjects(&self) -> Result<Vec<Subject>> {
        self.select_all("SELECT id, name, lecturer_id FROM subjects", |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
                lecturer_id: row.get(2)?,
            })
        })
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        self.select_all("SELECT id, name, group_id FROM students", |row| {
            Ok(Student {
                id: row.get(0)?,
                name: row.get(1)?,
                group_id: row.get(2)?,
            })
        })
    }

    pub fn grades(&self) -> Result<Vec<Grade>> {
        self.select_all(
            "SELECT id, student_id, subject_id, grade, date FROM grades",
            |row| {
                Ok(Grade {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    subject_id: row.get(2)?,
                    grade: row.get(3)?,
                    date: row.get(4)?,
                })
            },
        )
    }

    fn select_all<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        debug!(sql, rows = rows.len(), "fetched rows");
        Ok(rows)
    }
}
