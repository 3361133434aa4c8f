//! Protocol windows and their per-subject resolution.

use serde::{Deserialize, Serialize};

use crate::ids::{StudyDay, is_plausible_day};

/// Days between expected contacts.
pub const CADENCE_DAYS: i32 = 7;

/// Inclusive range of study days during which contact is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolWindow {
    pub start_day: StudyDay,
    pub end_day: StudyDay,
}

impl ProtocolWindow {
    pub fn new(start_day: StudyDay, end_day: StudyDay) -> Self {
        Self { start_day, end_day }
    }

    pub fn contains(&self, day: StudyDay) -> bool {
        (self.start_day..=self.end_day).contains(&day)
    }
}

/// Window definition for one project, as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtocolSpec {
    /// Static window relative to consent.
    Fixed {
        start_day: StudyDay,
        end_day: StudyDay,
    },
    /// Two-phase protocol whose end depends on the subject's own data.
    Adaptive {
        start_day: StudyDay,
        /// Minimum length of phase 2, counted from the second randomization.
        phase2_days: i32,
        /// Hard cap on the window end.
        max_day: StudyDay,
    },
}

impl ProtocolSpec {
    pub fn is_adaptive(&self) -> bool {
        matches!(self, ProtocolSpec::Adaptive { .. })
    }

    pub fn start_day(&self) -> StudyDay {
        match *self {
            ProtocolSpec::Fixed { start_day, .. } | ProtocolSpec::Adaptive { start_day, .. } => {
                start_day
            }
        }
    }

    /// Every configured day and length lies within the study-day limit.
    pub fn is_plausible(&self) -> bool {
        match *self {
            ProtocolSpec::Fixed { start_day, end_day } => {
                is_plausible_day(start_day) && is_plausible_day(end_day)
            }
            ProtocolSpec::Adaptive {
                start_day,
                phase2_days,
                max_day,
            } => {
                is_plausible_day(start_day)
                    && is_plausible_day(phase2_days)
                    && is_plausible_day(max_day)
            }
        }
    }

    /// Resolves the subject's window.
    ///
    /// Adaptive windows end on the subject's last observed day. With a second
    /// randomization they run at least `phase2_days` past it. The end is
    /// capped at `max_day` and never falls before `start_day`.
    pub fn window(
        &self,
        observed_max_day: Option<StudyDay>,
        second_randomization_day: Option<StudyDay>,
    ) -> ProtocolWindow {
        match *self {
            ProtocolSpec::Fixed { start_day, end_day } => ProtocolWindow::new(start_day, end_day),
            ProtocolSpec::Adaptive {
                start_day,
                phase2_days,
                max_day,
            } => {
                let observed = observed_max_day.unwrap_or(start_day);
                let end = match second_randomization_day {
                    Some(day) => observed.max(day.saturating_add(phase2_days)),
                    None => observed,
                };
                ProtocolWindow::new(start_day, end.min(max_day).max(start_day))
            }
        }
    }
}
