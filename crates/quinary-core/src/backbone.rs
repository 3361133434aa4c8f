//! Protocol backbone: the expected contact days of each subject.
//!
//! Contact is expected every [`CADENCE_DAYS`] days within the subject's
//! protocol window, on the grid through the subject's visit anchor.

use quinary_model::{BackboneEntry, CADENCE_DAYS, ProjectId, ProtocolWindow, StudyDay, SubjectId};

/// First grid day on or after `start`, where the grid passes through `anchor`.
pub fn first_grid_day(start: StudyDay, anchor: StudyDay) -> StudyDay {
    start + (anchor - start).rem_euclid(CADENCE_DAYS)
}

/// Expected contact days for one subject, ascending.
pub fn build_backbone(
    subject: SubjectId,
    project: &ProjectId,
    window: ProtocolWindow,
    anchor: StudyDay,
) -> Vec<BackboneEntry> {
    let first = first_grid_day(window.start_day, anchor);
    if first > window.end_day {
        return Vec::new();
    }
    (first..=window.end_day)
        .step_by(CADENCE_DAYS as usize)
        .map(|day| BackboneEntry {
            subject,
            project: project.clone(),
            day,
        })
        .collect()
}

/// One subject's inputs to [`build_backbones`].
#[derive(Debug, Clone)]
pub struct BackboneRequest {
    pub subject: SubjectId,
    pub project: ProjectId,
    pub window: ProtocolWindow,
    pub anchor: StudyDay,
}

/// Backbones for many subjects, ordered by subject then day.
pub fn build_backbones(requests: &[BackboneRequest]) -> Vec<BackboneEntry> {
    let mut entries: Vec<BackboneEntry> = requests
        .iter()
        .flat_map(|request| {
            build_backbone(
                request.subject,
                &request.project,
                request.window,
                request.anchor,
            )
        })
        .collect();
    entries.sort_by_key(|entry| (entry.subject, entry.day));
    entries.dedup_by_key(|entry| (entry.subject, entry.day));
    entries
}
