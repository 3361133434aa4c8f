//! Day-to-week alignment and phase segmentation.
//!
//! Weeks are numbered from an anchor day: days `anchor+1 ..= anchor+7` are
//! week 1, and week 0 is the seven days ending on the anchor itself.
//! Everything before the anchor week is baseline.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use quinary_model::{
    AnchorMode, CADENCE_DAYS, ImputedVisit, InductionDelay, ProtocolWindow, StudyDay, StudyWeek,
    TrialPhase, UseObservation, VisitStatus,
};
use tracing::debug;

use crate::subject::CONSENT_DAY;

/// Week containing `day` on the grid anchored at `anchor`.
pub fn study_week(day: StudyDay, anchor: StudyDay) -> StudyWeek {
    (day - anchor - 1).div_euclid(CADENCE_DAYS) + 1
}

/// Day 0 of the weekly grid for the chosen analysis convention.
pub fn week_anchor(mode: AnchorMode, induction: &InductionDelay) -> StudyDay {
    let intent_to_treat = induction.randomization_day.unwrap_or(CONSENT_DAY);
    match mode {
        AnchorMode::IntentToTreat => intent_to_treat,
        AnchorMode::AsTreated => match (induction.randomization_day, induction.delay) {
            (Some(randomized), Some(delay)) => randomized + delay,
            _ => intent_to_treat,
        },
    }
}

/// Assigns phases to weeks. Phase 2 exists only for adaptive protocols with
/// a second randomization, from that randomization's week onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSchedule {
    phase2_week: Option<StudyWeek>,
}

impl PhaseSchedule {
    pub fn single_phase() -> Self {
        Self { phase2_week: None }
    }

    pub fn two_phase(phase2_week: StudyWeek) -> Self {
        Self {
            phase2_week: Some(phase2_week),
        }
    }

    pub fn phase2_week(&self) -> Option<StudyWeek> {
        self.phase2_week
    }

    pub fn phase(&self, week: StudyWeek) -> TrialPhase {
        if week < 1 {
            return TrialPhase::Baseline;
        }
        match self.phase2_week {
            Some(start) if week >= start => TrialPhase::Phase2,
            _ => TrialPhase::Phase1,
        }
    }
}

/// One day on both week tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedDay {
    pub day: StudyDay,
    pub week: StudyWeek,
    /// Week counted from the second randomization, adaptive protocols only.
    pub phase2_week: Option<StudyWeek>,
    pub phase: TrialPhase,
}

/// What happened on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayRecord {
    pub status: Option<VisitStatus>,
    pub n_positive: u32,
    pub n_negative: u32,
}

/// Aggregate of one week, ready for symbol assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekTally {
    pub week: StudyWeek,
    pub phase: TrialPhase,
    pub n_positive: u32,
    pub n_negative: u32,
    pub n_present: u32,
    pub n_missing: u32,
    /// A visit was expected this week.
    pub expected: bool,
}

impl WeekTally {
    pub fn empty(week: StudyWeek, phase: TrialPhase, expected: bool) -> Self {
        Self {
            week,
            phase,
            n_positive: 0,
            n_negative: 0,
            n_present: 0,
            n_missing: 0,
            expected,
        }
    }

    pub fn has_observations(&self) -> bool {
        self.n_positive > 0 || self.n_negative > 0
    }
}

/// Maps one subject's days onto weeks and phases.
#[derive(Debug, Clone)]
pub struct WeeklyAligner {
    window: ProtocolWindow,
    anchor: StudyDay,
    second_anchor: Option<StudyDay>,
    schedule: PhaseSchedule,
}

impl WeeklyAligner {
    /// `second_randomization` opens phase 2 only when `adaptive` is set.
    pub fn new(
        window: ProtocolWindow,
        anchor: StudyDay,
        second_randomization: Option<StudyDay>,
        adaptive: bool,
    ) -> Self {
        let second_anchor = second_randomization.filter(|_| adaptive);
        let schedule = match second_anchor {
            Some(day) => PhaseSchedule::two_phase(study_week(day, anchor)),
            None => PhaseSchedule::single_phase(),
        };
        Self {
            window,
            anchor,
            second_anchor,
            schedule,
        }
    }

    pub fn anchor(&self) -> StudyDay {
        self.anchor
    }

    pub fn schedule(&self) -> PhaseSchedule {
        self.schedule
    }

    pub fn week_of(&self, day: StudyDay) -> StudyWeek {
        study_week(day, self.anchor)
    }

    /// Every week the window touches.
    pub fn week_range(&self) -> RangeInclusive<StudyWeek> {
        self.week_of(self.window.start_day)..=self.week_of(self.window.end_day)
    }

    pub fn align_day(&self, day: StudyDay) -> AlignedDay {
        let week = self.week_of(day);
        AlignedDay {
            day,
            week,
            phase2_week: self.second_anchor.map(|anchor| study_week(day, anchor)),
            phase: self.schedule.phase(week),
        }
    }

    /// Per-day merge of visit statuses and use observations, keyed by day.
    /// Days outside the window are left out.
    pub fn day_records(
        &self,
        visits: &[ImputedVisit],
        observations: &[UseObservation],
    ) -> BTreeMap<StudyDay, DayRecord> {
        let mut days: BTreeMap<StudyDay, DayRecord> = BTreeMap::new();
        for visit in visits.iter().filter(|visit| self.window.contains(visit.day)) {
            days.entry(visit.day).or_default().status = Some(visit.status);
        }
        let mut outside = 0usize;
        for observation in observations {
            if !self.window.contains(observation.day) {
                outside += 1;
                continue;
            }
            let record = days.entry(observation.day).or_default();
            if observation.positive {
                record.n_positive += 1;
            } else {
                record.n_negative += 1;
            }
        }
        if outside > 0 {
            debug!(outside, "observations outside protocol window ignored");
        }
        days
    }

    /// One tally per week in [`Self::week_range`], ascending, with no gaps.
    pub fn tally(&self, visits: &[ImputedVisit], observations: &[UseObservation]) -> Vec<WeekTally> {
        let last_week = self.week_of(self.window.end_day);
        let mut weeks: BTreeMap<StudyWeek, WeekTally> = self
            .week_range()
            .map(|week| {
                let expected = (1..=last_week).contains(&week);
                (week, WeekTally::empty(week, self.schedule.phase(week), expected))
            })
            .collect();
        for (day, record) in self.day_records(visits, observations) {
            let aligned = self.align_day(day);
            let Some(tally) = weeks.get_mut(&aligned.week) else {
                continue;
            };
            tally.n_positive += record.n_positive;
            tally.n_negative += record.n_negative;
            match record.status {
                Some(VisitStatus::Present) => tally.n_present += 1,
                Some(VisitStatus::Missing) => tally.n_missing += 1,
                None => {}
            }
        }
        weeks.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quinary_model::{Source, SubjectId};

    fn observation(day: StudyDay, positive: bool) -> UseObservation {
        UseObservation {
            subject: SubjectId(1),
            day,
            source: Source::Uds,
            positive,
        }
    }

    #[test]
    fn week_formula() {
        assert_eq!(study_week(0, 0), 0);
        assert_eq!(study_week(1, 0), 1);
        assert_eq!(study_week(7, 0), 1);
        assert_eq!(study_week(8, 0), 2);
        assert_eq!(study_week(14, 0), 2);
        assert_eq!(study_week(15, 0), 3);
        assert_eq!(study_week(-6, 0), 0);
        assert_eq!(study_week(-7, 0), -1);
        assert_eq!(study_week(40, 0), 6);
        assert_eq!(study_week(10, 3), 1);
    }

    #[test]
    fn anchor_modes() {
        let induction = InductionDelay {
            subject: SubjectId(1),
            randomization_day: Some(2),
            treatment: None,
            treatment_start_day: Some(6),
            delay: Some(4),
        };
        assert_eq!(week_anchor(AnchorMode::IntentToTreat, &induction), 2);
        assert_eq!(week_anchor(AnchorMode::AsTreated, &induction), 6);

        let never_dosed = InductionDelay {
            treatment_start_day: None,
            delay: None,
            ..induction
        };
        assert_eq!(week_anchor(AnchorMode::AsTreated, &never_dosed), 2);

        let never_randomized = InductionDelay {
            subject: SubjectId(2),
            randomization_day: None,
            treatment: None,
            treatment_start_day: Some(5),
            delay: None,
        };
        assert_eq!(week_anchor(AnchorMode::AsTreated, &never_randomized), 0);
    }

    #[test]
    fn phase_two_from_second_randomization_week() {
        let aligner = WeeklyAligner::new(ProtocolWindow::new(-14, 84), 0, Some(50), true);
        assert_eq!(aligner.schedule().phase2_week(), Some(8));
        let phases: Vec<TrialPhase> = (-2..=12)
            .map(|week| aligner.schedule().phase(week))
            .collect();
        assert!(phases.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(aligner.schedule().phase(0), TrialPhase::Baseline);
        assert_eq!(aligner.schedule().phase(1), TrialPhase::Phase1);
        assert_eq!(aligner.schedule().phase(7), TrialPhase::Phase1);
        assert_eq!(aligner.schedule().phase(8), TrialPhase::Phase2);
        assert_eq!(aligner.schedule().phase(12), TrialPhase::Phase2);
        assert_eq!(aligner.align_day(50).phase, TrialPhase::Phase2);
        assert_eq!(aligner.align_day(49).phase, TrialPhase::Phase1);
        assert_eq!(aligner.align_day(49).phase2_week, Some(0));
        assert_eq!(aligner.align_day(51).phase2_week, Some(1));
        assert_eq!(aligner.align_day(43).phase, TrialPhase::Phase1);
    }

    #[test]
    fn fixed_protocols_ignore_second_randomization() {
        let aligner = WeeklyAligner::new(ProtocolWindow::new(0, 84), 0, Some(50), false);
        assert_eq!(aligner.schedule().phase2_week(), None);
        assert_eq!(aligner.align_day(60).phase, TrialPhase::Phase1);
        assert_eq!(aligner.align_day(60).phase2_week, None);
    }

    #[test]
    fn tally_covers_every_week() {
        let aligner = WeeklyAligner::new(ProtocolWindow::new(-14, 21), 0, None, false);
        assert_eq!(aligner.week_range(), -2..=3);
        let visits = vec![
            ImputedVisit {
                subject: SubjectId(1),
                day: 7,
                status: VisitStatus::Present,
            },
            ImputedVisit {
                subject: SubjectId(1),
                day: 14,
                status: VisitStatus::Missing,
            },
        ];
        let observations = vec![observation(14, true), observation(15, false), observation(99, true)];
        let tallies = aligner.tally(&visits, &observations);
        let weeks: Vec<StudyWeek> = tallies.iter().map(|tally| tally.week).collect();
        assert_eq!(weeks, vec![-2, -1, 0, 1, 2, 3]);

        let week2 = tallies[4];
        assert_eq!(week2.n_positive, 1);
        assert_eq!(week2.n_missing, 1);
        assert_eq!(tallies[5].n_negative, 1);
        assert_eq!(tallies[3].n_present, 1);
        assert!(!tallies[2].expected);
        assert!(tallies[3].expected);
        assert_eq!(tallies.iter().map(|tally| tally.n_positive).sum::<u32>(), 1);
    }
}
