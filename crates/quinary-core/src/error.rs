use std::path::PathBuf;

use quinary_ingest::IngestError;
use quinary_model::{ProjectId, STUDY_DAY_LIMIT, StudyDay, StudyWeek, SubjectId, TrialPhase};
use thiserror::Error;

/// Errors that stop the batch. Data-quality oddities are not errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The encoder produced a non-contiguous week sequence for a phase.
    #[error(
        "week gap in {phase} word for subject {subject}: expected week {expected}, found {found}"
    )]
    WeekGap {
        subject: SubjectId,
        phase: TrialPhase,
        expected: StudyWeek,
        found: StudyWeek,
    },

    #[error("subject {subject} has study day {day}, outside -{limit}..={limit}", limit = STUDY_DAY_LIMIT)]
    DayOutOfRange { subject: SubjectId, day: StudyDay },

    #[error("subjects without a project assignment: {}", format_subjects(.subjects))]
    MissingProject { subjects: Vec<SubjectId> },

    #[error("subject {subject} is assigned to both project {first} and {second}")]
    ConflictingProject {
        subject: SubjectId,
        first: ProjectId,
        second: ProjectId,
    },

    #[error(
        "no protocol configured for project {project} (subjects: {})",
        format_subjects(.subjects)
    )]
    UnknownProject {
        project: ProjectId,
        subjects: Vec<SubjectId>,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

fn format_subjects(subjects: &[SubjectId]) -> String {
    subjects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, PipelineError>;
