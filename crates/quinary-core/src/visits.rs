//! Visit imputation against the backbone.
//!
//! A backbone day is `Present` only when a visit happened on that exact day.
//! A visit one or more days late does not satisfy the scheduled day: the
//! scheduled day is still `Missing` and the late visit is not imputed.

use std::collections::BTreeSet;

use quinary_model::{
    BackboneEntry, CADENCE_DAYS, ImputedVisit, StudyDay, SubjectId, VisitStatus,
};

/// True when `day` falls on the weekly grid through `anchor`.
pub fn on_weekly_grid(day: StudyDay, anchor: StudyDay) -> bool {
    (day - anchor).rem_euclid(CADENCE_DAYS) == 0
}

/// Status of one backbone day; `None` drops the day.
pub fn visit_status(
    day: StudyDay,
    visit_days: &BTreeSet<StudyDay>,
    anchor: StudyDay,
) -> Option<VisitStatus> {
    if visit_days.contains(&day) {
        Some(VisitStatus::Present)
    } else if on_weekly_grid(day, anchor) {
        Some(VisitStatus::Missing)
    } else {
        None
    }
}

/// Marks each backbone day of one subject as present or missing.
pub fn impute_visits(
    subject: SubjectId,
    backbone_days: impl IntoIterator<Item = StudyDay>,
    visit_days: &BTreeSet<StudyDay>,
    anchor: StudyDay,
) -> Vec<ImputedVisit> {
    backbone_days
        .into_iter()
        .filter_map(|day| {
            visit_status(day, visit_days, anchor).map(|status| ImputedVisit {
                subject,
                day,
                status,
            })
        })
        .collect()
}

/// Imputes straight from backbone entries (all of one subject).
pub fn impute_backbone(
    backbone: &[BackboneEntry],
    visit_days: &BTreeSet<StudyDay>,
    anchor: StudyDay,
) -> Vec<ImputedVisit> {
    let Some(first) = backbone.first() else {
        return Vec::new();
    };
    impute_visits(
        first.subject,
        backbone.iter().map(|entry| entry.day),
        visit_days,
        anchor,
    )
}

/// Days already resolved as present.
pub fn present_days(imputed: &[ImputedVisit]) -> BTreeSet<StudyDay> {
    imputed
        .iter()
        .filter(|visit| visit.status == VisitStatus::Present)
        .map(|visit| visit.day)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(imputed: &[ImputedVisit]) -> Vec<(StudyDay, VisitStatus)> {
        imputed.iter().map(|visit| (visit.day, visit.status)).collect()
    }

    #[test]
    fn late_visit_leaves_scheduled_day_missing() {
        let visits = BTreeSet::from([9]);
        let imputed = impute_visits(SubjectId(1), [0, 7, 14, 21], &visits, 0);
        assert_eq!(
            statuses(&imputed),
            vec![
                (0, VisitStatus::Missing),
                (7, VisitStatus::Missing),
                (14, VisitStatus::Missing),
                (21, VisitStatus::Missing),
            ]
        );
        assert!(imputed.iter().all(|visit| visit.day != 9));
    }

    #[test]
    fn exact_visit_is_present() {
        let visits = BTreeSet::from([7, 14]);
        let imputed = impute_visits(SubjectId(1), [0, 7, 14], &visits, 0);
        assert_eq!(
            statuses(&imputed),
            vec![
                (0, VisitStatus::Missing),
                (7, VisitStatus::Present),
                (14, VisitStatus::Present),
            ]
        );
    }

    #[test]
    fn off_grid_days_without_visit_are_dropped() {
        let visits = BTreeSet::from([5]);
        let imputed = impute_visits(SubjectId(1), [3, 5, 10], &visits, 3);
        assert_eq!(
            statuses(&imputed),
            vec![(3, VisitStatus::Missing), (5, VisitStatus::Present), (10, VisitStatus::Missing)]
        );
        let imputed = impute_visits(SubjectId(1), [4, 6], &BTreeSet::new(), 3);
        assert!(imputed.is_empty());
    }

    #[test]
    fn grid_is_anchored_for_negative_days() {
        assert!(on_weekly_grid(-7, 0));
        assert!(on_weekly_grid(-4, 3));
        assert!(!on_weekly_grid(-3, 0));
    }

    #[test]
    fn rerun_keeps_present_days() {
        let visits = BTreeSet::from([0, 14]);
        let first = impute_visits(SubjectId(1), [0, 7, 14, 21], &visits, 0);
        let second = impute_visits(
            SubjectId(1),
            first.iter().map(|visit| visit.day),
            &present_days(&first),
            0,
        );
        assert_eq!(first, second);
    }
}
