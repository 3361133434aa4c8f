//! Per-subject grouping of the normalized event stream.

use std::collections::{BTreeMap, BTreeSet};

use quinary_ingest::StudyTables;
use quinary_model::{
    Event, EventPayload, ProjectAssignment, ProjectId, StudyDay, SubjectId, UseObservation,
};

use crate::error::{PipelineError, Result};

/// Day 0 of every subject's timeline.
pub const CONSENT_DAY: StudyDay = 0;

/// Everything one subject contributes to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectEvents {
    pub subject: SubjectId,
    pub project: ProjectId,
    /// Raw events, ordered by day.
    pub events: Vec<Event>,
    /// Filtered drug tests, ordered by (day, source).
    pub observations: Vec<UseObservation>,
}

impl SubjectEvents {
    pub fn new(subject: SubjectId, project: ProjectId) -> Self {
        Self {
            subject,
            project,
            events: Vec::new(),
            observations: Vec::new(),
        }
    }

    /// Earliest day of the randomization with the given index.
    pub fn randomization_day(&self, index: u8) -> Option<StudyDay> {
        self.events
            .iter()
            .filter(|event| {
                matches!(event.payload, EventPayload::Randomization { index: i, .. } if i == index)
            })
            .map(|event| event.day)
            .min()
    }

    /// Days with a completed or final clinic visit.
    pub fn visit_days(&self) -> BTreeSet<StudyDay> {
        self.events
            .iter()
            .filter_map(|event| match &event.payload {
                EventPayload::ClinicVisit { state } if state.is_observed() => Some(event.day),
                _ => None,
            })
            .collect()
    }

    /// Last study day with any recorded event.
    pub fn observed_max_day(&self) -> Option<StudyDay> {
        self.events.iter().map(|event| event.day).max()
    }

    /// Randomization-1 day, else consent.
    pub fn visit_anchor(&self) -> StudyDay {
        self.randomization_day(1).unwrap_or(CONSENT_DAY)
    }
}

fn project_map(assignments: &[ProjectAssignment]) -> Result<BTreeMap<SubjectId, ProjectId>> {
    let mut projects: BTreeMap<SubjectId, ProjectId> = BTreeMap::new();
    for assignment in assignments {
        match projects.get(&assignment.subject) {
            Some(existing) if *existing != assignment.project => {
                return Err(PipelineError::ConflictingProject {
                    subject: assignment.subject,
                    first: existing.clone(),
                    second: assignment.project.clone(),
                });
            }
            Some(_) => {}
            None => {
                projects.insert(assignment.subject, assignment.project.clone());
            }
        }
    }
    Ok(projects)
}

/// Splits the study into independent per-subject units, ordered by subject.
///
/// Every subject with events must have a project assignment; subjects with
/// an assignment but no events still get a (data-free) unit.
pub fn group_subjects(
    tables: &StudyTables,
    observations: &[UseObservation],
) -> Result<Vec<SubjectEvents>> {
    let projects = project_map(&tables.projects)?;
    let mut grouped: BTreeMap<SubjectId, SubjectEvents> = projects
        .iter()
        .map(|(subject, project)| (*subject, SubjectEvents::new(*subject, project.clone())))
        .collect();

    let mut unassigned = BTreeSet::new();
    for event in &tables.events {
        match grouped.get_mut(&event.subject) {
            Some(unit) => unit.events.push(event.clone()),
            None => {
                unassigned.insert(event.subject);
            }
        }
    }
    for observation in observations {
        match grouped.get_mut(&observation.subject) {
            Some(unit) => unit.observations.push(*observation),
            None => {
                unassigned.insert(observation.subject);
            }
        }
    }
    if !unassigned.is_empty() {
        return Err(PipelineError::MissingProject {
            subjects: unassigned.into_iter().collect(),
        });
    }

    let mut units: Vec<SubjectEvents> = grouped.into_values().collect();
    for unit in &mut units {
        unit.events.sort_by_key(|event| (event.day, event.kind()));
        unit.observations.sort();
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quinary_model::{Source, VisitState};

    fn project(subject: i64, id: &str) -> ProjectAssignment {
        ProjectAssignment {
            subject: SubjectId(subject),
            project: ProjectId::new(id).unwrap(),
        }
    }

    fn visit(subject: i64, day: StudyDay, state: VisitState) -> Event {
        Event::new(SubjectId(subject), day, EventPayload::ClinicVisit { state })
    }

    #[test]
    fn groups_events_per_subject() {
        let tables = StudyTables::new(
            vec![
                visit(2, 7, VisitState::Completed),
                visit(1, 0, VisitState::Completed),
                visit(1, 7, VisitState::Missed),
            ],
            vec![project(1, "27"), project(2, "51"), project(3, "27")],
        );
        let units = group_subjects(&tables, &[]).unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].visit_days(), BTreeSet::from([0]));
        assert_eq!(units[1].project.as_str(), "51");
        assert!(units[2].events.is_empty());
    }

    #[test]
    fn unassigned_subjects_are_fatal() {
        let tables = StudyTables::new(
            vec![visit(5, 0, VisitState::Completed)],
            vec![project(1, "27")],
        );
        let observations = [UseObservation {
            subject: SubjectId(6),
            day: 3,
            source: Source::Uds,
            positive: true,
        }];
        match group_subjects(&tables, &observations) {
            Err(PipelineError::MissingProject { subjects }) => {
                assert_eq!(subjects, vec![SubjectId(5), SubjectId(6)]);
            }
            other => panic!("expected MissingProject, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_assignments_are_fatal() {
        let tables = StudyTables::new(vec![], vec![project(1, "27"), project(1, "30")]);
        assert!(matches!(
            group_subjects(&tables, &[]),
            Err(PipelineError::ConflictingProject { .. })
        ));
    }

    #[test]
    fn randomization_days_by_index() {
        let mut unit = SubjectEvents::new(SubjectId(1), ProjectId::new("30").unwrap());
        unit.events = vec![
            Event::new(
                SubjectId(1),
                50,
                EventPayload::Randomization {
                    index: 2,
                    treatment: None,
                },
            ),
            Event::new(
                SubjectId(1),
                3,
                EventPayload::Randomization {
                    index: 1,
                    treatment: Some("BUP".to_string()),
                },
            ),
        ];
        assert_eq!(unit.randomization_day(1), Some(3));
        assert_eq!(unit.randomization_day(2), Some(50));
        assert_eq!(unit.visit_anchor(), 3);
        assert_eq!(unit.observed_max_day(), Some(50));
    }
}
