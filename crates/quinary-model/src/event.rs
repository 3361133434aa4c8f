//! Canonical event records produced by ingest.

use serde::{Deserialize, Serialize};

use crate::enums::{EventKind, Source, VisitState};
use crate::ids::{ProjectId, StudyDay, SubjectId};

/// Kind-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// A substance report or test. An empty `substance` is a test that
    /// detected nothing.
    DrugUse { substance: String, source: Source },
    ClinicVisit { state: VisitState },
    /// `index` is 1 for the first randomization, 2 for the adaptive re-randomization.
    Randomization {
        index: u8,
        treatment: Option<String>,
    },
    Dose { amount: f64 },
}

/// One row of the normalized per-subject/day event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub subject: SubjectId,
    pub day: StudyDay,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(subject: SubjectId, day: StudyDay, payload: EventPayload) -> Self {
        Self {
            subject,
            day,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::DrugUse { .. } => EventKind::DrugUse,
            EventPayload::ClinicVisit { .. } => EventKind::ClinicVisit,
            EventPayload::Randomization { .. } => EventKind::Randomization,
            EventPayload::Dose { .. } => EventKind::Dose,
        }
    }
}

/// Subject-to-protocol membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssignment {
    pub subject: SubjectId,
    pub project: ProjectId,
}

/// One drug test or report after target filtering, keyed by
/// (subject, day, source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UseObservation {
    pub subject: SubjectId,
    pub day: StudyDay,
    pub source: Source,
    pub positive: bool,
}
