//! Fake university data.
//!
//! Generated records refer to each other by position in the owning vector
//! (`StudentSeed::group` indexes `FakeDataset::groups`, and so on), so two
//! students that happen to share a generated name stay distinct.

use std::ops::RangeInclusive;

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SeedError};
use crate::settings::Settings;

pub const GROUP_NAMES: [&str; 3] = ["Group A", "Group B", "Group C"];

pub const SUBJECT_NAMES: [&str; 8] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "English",
    "Computer Science",
];

const FIRST_NAMES: [&str; 32] = [
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas",
    "Sarah", "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty",
    "Mark", "Margaret", "Steven", "Sandra", "Andrew", "Ashley",
];

const LAST_NAMES: [&str; 32] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young",
];

/// A student and the index of the group it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSeed {
    pub name: String,
    pub group: usize,
}

/// One grade, pointing at a student and a subject by index.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSeed {
    pub student: usize,
    pub subject: usize,
    pub grade: u8,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeDataset {
    pub groups: Vec<String>,
    pub lecturers: Vec<String>,
    pub subjects: Vec<String>,
    pub students: Vec<StudentSeed>,
    pub grades: Vec<GradeSeed>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub lecturer_count: usize,
    pub student_count: usize,
    /// How many grades each student receives per subject
    pub grades_per_subject: RangeInclusive<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            lecturer_count: 5,
            student_count: 30,
            grades_per_subject: 5..=20,
        }
    }
}

impl From<&Settings> for GeneratorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            lecturer_count: settings.lecturer_count,
            student_count: settings.student_count,
            grades_per_subject: settings.min_grades_per_subject
                ..=settings.max_grades_per_subject,
        }
    }
}

/// Random source for a run: reproducible when `seed` is given.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// "First Last" built from common English names.
pub fn fake_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
    format!("{first} {last}")
}

/// A date between January 1st of `today`'s year and `today`, inclusive.
pub fn date_this_year<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let days_back = rng.random_range(0..=today.ordinal0());
    today - Duration::days(i64::from(days_back))
}

/// Builds a full dataset. Grades are produced for every (student, subject)
/// pair; dates fall in the year of `today`.
///
/// Fails with [`SeedError::Config`] when `grades_per_subject` is empty.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
    today: NaiveDate,
) -> Result<FakeDataset> {
    if config.grades_per_subject.is_empty() {
        return Err(SeedError::Config(format!(
            "empty grades_per_subject range {}..={}",
            config.grades_per_subject.start(),
            config.grades_per_subject.end()
        )));
    }

    let groups: Vec<String> = GROUP_NAMES.iter().map(|g| g.to_string()).collect();
    let subjects: Vec<String> = SUBJECT_NAMES.iter().map(|s| s.to_string()).collect();
    let lecturers: Vec<String> = (0..config.lecturer_count).map(|_| fake_name(rng)).collect();

    let students: Vec<StudentSeed> = (0..config.student_count)
        .map(|_| StudentSeed {
            name: fake_name(rng),
            group: rng.random_range(0..groups.len()),
        })
        .collect();

    let mut grades = Vec::new();
    for student in 0..students.len() {
        for subject in 0..subjects.len() {
            let count = rng.random_range(config.grades_per_subject.clone());
            for _ in 0..count {
                grades.push(GradeSeed {
                    student,
                    subject,
                    grade: rng.random_range(1..=6),
                    date: date_this_year(rng, today),
                });
            }
        }
    }

    Ok(FakeDataset {
        groups,
        lecturers,
        subjects,
        students,
        grades,
    })
}
