//! Derived tables, one struct per row.

use serde::{Deserialize, Serialize};

use crate::enums::{TrialPhase, VisitStatus, WeekSymbol};
use crate::ids::{ProjectId, StudyDay, StudyWeek, SubjectId};

/// One protocol-expected contact day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackboneEntry {
    pub subject: SubjectId,
    pub project: ProjectId,
    pub day: StudyDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputedVisit {
    pub subject: SubjectId,
    pub day: StudyDay,
    pub status: VisitStatus,
}

/// Gap between first randomization and first nonzero dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InductionDelay {
    pub subject: SubjectId,
    pub randomization_day: Option<StudyDay>,
    pub treatment: Option<String>,
    pub treatment_start_day: Option<StudyDay>,
    /// `None` when the subject was never dosed (or never randomized).
    pub delay: Option<i32>,
}

/// Per-week tally and its encoded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub subject: SubjectId,
    pub week: StudyWeek,
    pub phase: TrialPhase,
    pub n_positive: u32,
    pub n_negative: u32,
    pub n_present: u32,
    pub n_missing: u32,
    pub expected: bool,
    pub symbol: WeekSymbol,
}

/// One subject's word for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsePatternWord {
    pub subject: SubjectId,
    pub phase: TrialPhase,
    pub start_week: StudyWeek,
    pub end_week: StudyWeek,
    pub rand_week_1: StudyWeek,
    pub rand_week_2: Option<StudyWeek>,
    pub word: String,
}

impl UsePatternWord {
    pub fn len_weeks(&self) -> usize {
        (self.end_week - self.start_week + 1).max(0) as usize
    }

    pub fn symbols(&self) -> impl Iterator<Item = WeekSymbol> + '_ {
        self.word
            .chars()
            .filter_map(|ch| WeekSymbol::try_from(ch).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_length_matches_week_span() {
        let word = UsePatternWord {
            subject: SubjectId(1),
            phase: TrialPhase::Phase1,
            start_week: 1,
            end_week: 4,
            rand_week_1: 0,
            rand_week_2: None,
            word: "o+-*".to_string(),
        };
        assert_eq!(word.len_weeks(), 4);
        assert_eq!(word.symbols().count(), 4);
    }
}
