#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Signed day offset from the subject's consent date (day 0 = consent).
pub type StudyDay = i32;

/// Largest accepted distance of any study day from consent.
///
/// Keeps all window and week arithmetic far from `i32` overflow.
pub const STUDY_DAY_LIMIT: StudyDay = 100_000;

pub fn is_plausible_day(day: StudyDay) -> bool {
    (-STUDY_DAY_LIMIT..=STUDY_DAY_LIMIT).contains(&day)
}

/// Week number on a subject's weekly grid; week 0 ends on the anchor day.
pub type StudyWeek = i32;

/// Opaque participant identifier, unique across all input tables.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(pub i64);

impl SubjectId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubjectId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Protocol (project) key, e.g. `"27"` or `"30"`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidProjectId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
