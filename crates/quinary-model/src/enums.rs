//! Closed vocabularies used across the pipeline.
//!
//! Input tables carry these as free text; parsing happens once at ingest so
//! later stages can match exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Where a drug-use observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Timeline follow-back self report.
    #[serde(rename = "TFB")]
    Tfb,
    /// Urine drug screen.
    #[serde(rename = "UDS")]
    Uds,
    /// Urine drug screen, supplementary panel.
    #[serde(rename = "UDSAB")]
    UdsAb,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Tfb, Source::Uds, Source::UdsAb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Tfb => "TFB",
            Source::Uds => "UDS",
            Source::UdsAb => "UDSAB",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TFB" => Ok(Source::Tfb),
            "UDS" => Ok(Source::Uds),
            "UDSAB" => Ok(Source::UdsAb),
            _ => Err(ModelError::UnknownSource(s.to_string())),
        }
    }
}

/// Kind of a normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    DrugUse,
    ClinicVisit,
    Randomization,
    Dose,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DrugUse => "DrugUse",
            EventKind::ClinicVisit => "ClinicVisit",
            EventKind::Randomization => "Randomization",
            EventKind::Dose => "Dose",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded state of a clinic visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitState {
    Completed,
    Final,
    Missed,
    Other(String),
}

impl VisitState {
    /// Only completed and final visits count as observed contact.
    pub fn is_observed(&self) -> bool {
        matches!(self, VisitState::Completed | VisitState::Final)
    }

    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "completed" | "complete" | "visit completed" => VisitState::Completed,
            "final" | "final visit" => VisitState::Final,
            "missed" | "missing" | "visit missed" => VisitState::Missed,
            _ => VisitState::Other(value.trim().to_string()),
        }
    }
}

/// Imputed status of one expected contact day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitStatus {
    Present,
    Missing,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Present => "Present",
            VisitStatus::Missing => "Missing",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment of a subject's timeline. Ordered so phases never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrialPhase {
    Baseline,
    #[serde(rename = "Phase_1")]
    Phase1,
    #[serde(rename = "Phase_2")]
    Phase2,
}

impl TrialPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialPhase::Baseline => "Baseline",
            TrialPhase::Phase1 => "Phase_1",
            TrialPhase::Phase2 => "Phase_2",
        }
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One character of a quinary word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeekSymbol {
    /// Only positive observations.
    #[serde(rename = "+")]
    Positive,
    /// Only negative observations.
    #[serde(rename = "-")]
    Negative,
    /// Both positive and negative observations.
    #[serde(rename = "*")]
    Mixed,
    /// Data was expected but none was recorded.
    #[serde(rename = "o")]
    Missing,
    /// No data expected.
    #[serde(rename = "_")]
    NotExpected,
}

impl WeekSymbol {
    pub const ALL: [WeekSymbol; 5] = [
        WeekSymbol::Positive,
        WeekSymbol::Negative,
        WeekSymbol::Mixed,
        WeekSymbol::Missing,
        WeekSymbol::NotExpected,
    ];

    pub fn as_char(&self) -> char {
        match self {
            WeekSymbol::Positive => '+',
            WeekSymbol::Negative => '-',
            WeekSymbol::Mixed => '*',
            WeekSymbol::Missing => 'o',
            WeekSymbol::NotExpected => '_',
        }
    }
}

impl fmt::Display for WeekSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for WeekSymbol {
    type Error = ModelError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        WeekSymbol::ALL
            .into_iter()
            .find(|symbol| symbol.as_char() == value)
            .ok_or(ModelError::InvalidSymbol(value))
    }
}

/// Which event defines day 0 of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    /// Randomization day, regardless of when treatment started.
    #[default]
    IntentToTreat,
    /// First nonzero dose day; falls back to randomization when never dosed.
    AsTreated,
}
