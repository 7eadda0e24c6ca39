use std::fmt;
use std::io::Write;

use rusqlite::Connection;

use crate::error::Result;
use crate::repository::{Grade, Group, Lecturer, Repository, Student, Subject};

const SEPARATOR: &str = "----------------------";

/// Renders `Some(v)` as `v` and `None` as `None`.
struct Nullable<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Nullable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Student data:")?;
        writeln!(f, "Student ID: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Group ID: {}", Nullable(&self.group_id))?;
        write!(f, "{SEPARATOR}")
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Group data:")?;
        writeln!(f, "Group ID: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        write!(f, "{SEPARATOR}")
    }
}

impl fmt::Display for Lecturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lecturer data:")?;
        writeln!(f, "Lecturer ID: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        write!(f, "{SEPARATOR}")
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subject data:")?;
        writeln!(f, "Subject ID: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Lecturer ID: {}", Nullable(&self.lecturer_id))?;
        write!(f, "{SEPARATOR}")
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grade data:")?;
        writeln!(f, "Grade ID: {}", self.id)?;
        writeln!(f, "Student ID: {}", Nullable(&self.student_id))?;
        writeln!(f, "Subject ID: {}", Nullable(&self.subject_id))?;
        writeln!(f, "Grade: {}", Nullable(&self.grade))?;
        writeln!(f, "Date: {}", Nullable(&self.date))?;
        write!(f, "{SEPARATOR}")
    }
}

/// Dumps university tables as labeled blocks, one block per row.
pub struct DisplayData<'c> {
    repo: Repository<'c>,
}

impl<'c> DisplayData<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            repo: Repository::new(conn),
        }
    }

    pub fn display_students(&self, out: &mut impl Write) -> Result<()> {
        write_rows(out, &self.repo.students()?)
    }

    pub fn display_groups(&self, out: &mut impl Write) -> Result<()> {
        write_rows(out, &self.repo.groups()?)
    }

    pub fn display_lecturers(&self, out: &mut impl Write) -> Result<()> {
        write_rows(out, &self.repo.lecturers()?)
    }

    pub fn display_subjects(&self, out: &mut impl Write) -> Result<()> {
        write_rows(out, &self.repo.subjects()?)
    }

    pub fn display_grades(&self, out: &mut impl Write) -> Result<()> {
        write_rows(out, &self.repo.grades()?)
    }

    /// Students, groups, lecturers, subjects, then grades.
    pub fn display_all(&self, out: &mut impl Write) -> Result<()> {
        self.display_students(out)?;
        self.display_groups(out)?;
        self.display_lecturers(out)?;
        self.display_subjects(out)?;
        self.display_grades(out)
    }
}

fn write_rows<T: fmt::Display>(out: &mut impl Write, rows: &[T]) -> Result<()> {
    for row in rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}
