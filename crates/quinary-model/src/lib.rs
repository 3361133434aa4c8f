//! Domain model for weekly quinary use-pattern words.
//!
//! Input events, protocol windows and every derived table of the pipeline
//! are plain data here; the algorithms live in `quinary-core`.

pub mod enums;
pub mod error;
pub mod event;
pub mod ids;
pub mod lookup;
pub mod options;
pub mod protocol;
pub mod records;

pub use enums::{AnchorMode, EventKind, Source, TrialPhase, VisitState, VisitStatus, WeekSymbol};
pub use error::{ModelError, Result};
pub use event::{Event, EventPayload, ProjectAssignment, UseObservation};
pub use ids::{ProjectId, STUDY_DAY_LIMIT, StudyDay, StudyWeek, SubjectId, is_plausible_day};
pub use lookup::CaseInsensitiveSet;
pub use options::{DrugSelection, PipelineConfig};
pub use protocol::{CADENCE_DAYS, ProtocolSpec, ProtocolWindow};
pub use records::{BackboneEntry, ImputedVisit, InductionDelay, UsePatternWord, WeekRecord};
