//! Target-drug filtering of drug-use records.
//!
//! Reduces substance-level records to one fact per (subject, day, source):
//! whether any target substance was recorded there.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use quinary_model::{
    CaseInsensitiveSet, DrugSelection, Event, EventPayload, Source, StudyDay, SubjectId,
    UseObservation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Target substances plus the sources allowed to report them.
#[derive(Debug, Clone)]
pub struct DrugFilter {
    requested: Vec<String>,
    targets: CaseInsensitiveSet,
    sources: BTreeSet<Source>,
}

impl DrugFilter {
    pub fn new<I, S>(targets: I, sources: impl IntoIterator<Item = Source>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<String> = targets
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self {
            targets: CaseInsensitiveSet::new(&requested),
            requested,
            sources: sources.into_iter().collect(),
        }
    }

    pub fn from_selection(selection: &DrugSelection) -> Self {
        Self::new(&selection.targets, selection.sources.iter().copied())
    }

    pub fn allows(&self, source: Source) -> bool {
        self.sources.contains(&source)
    }

    /// The target name a substance matches, in its configured spelling.
    pub fn matching_target(&self, substance: &str) -> Option<&str> {
        self.targets.get(substance)
    }
}

/// A target substance was recorded on this (subject, day, source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UseMark {
    pub subject: SubjectId,
    pub day: StudyDay,
    pub source: Source,
}

/// Some target names matched nothing; the filter proceeded with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMatchWarning {
    pub unmatched: Vec<String>,
}

impl fmt::Display for PartialMatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target substances with no matching records: {}",
            self.unmatched.join(", ")
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct UseMarks {
    /// Ordered by (subject, day, source), no duplicates.
    pub marks: Vec<UseMark>,
    pub warning: Option<PartialMatchWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct UseClassification {
    /// One observation per tested (subject, day, source), ordered.
    pub observations: Vec<UseObservation>,
    pub warning: Option<PartialMatchWarning>,
}

fn drug_records<'a>(
    events: &'a [Event],
    filter: &'a DrugFilter,
) -> impl Iterator<Item = (UseMark, &'a str)> + 'a {
    events.iter().filter_map(move |event| match &event.payload {
        EventPayload::DrugUse { substance, source } if filter.allows(*source) => Some((
            UseMark {
                subject: event.subject,
                day: event.day,
                source: *source,
            },
            substance.as_str(),
        )),
        _ => None,
    })
}

/// Returns one mark per (subject, day, source) where any target matched.
///
/// Fails with [`IngestError::NoMatch`] when no target matches a record; when
/// only some do, the unmatched names come back as a warning.
pub fn mark_use(events: &[Event], filter: &DrugFilter) -> Result<UseMarks> {
    let mut marks = BTreeSet::new();
    let mut matched = BTreeSet::new();
    for (mark, substance) in drug_records(events, filter) {
        if let Some(target) = filter.matching_target(substance) {
            matched.insert(target.to_ascii_uppercase());
            marks.insert(mark);
        }
    }
    if matched.is_empty() {
        return Err(IngestError::NoMatch {
            targets: filter.requested.clone(),
        });
    }
    let mut seen = BTreeSet::new();
    let unmatched: Vec<String> = filter
        .requested
        .iter()
        .filter(|name| !matched.contains(&name.to_ascii_uppercase()))
        .filter(|name| seen.insert(name.to_ascii_uppercase()))
        .cloned()
        .collect();
    let warning = if unmatched.is_empty() {
        None
    } else {
        let warning = PartialMatchWarning { unmatched };
        warn!(unmatched = ?warning.unmatched, "partial drug match");
        Some(warning)
    };
    debug!(marks = marks.len(), "marked target use");
    Ok(UseMarks {
        marks: marks.into_iter().collect(),
        warning,
    })
}

/// Classifies every allowed-source test as positive (a target matched) or
/// negative (recorded, but no target among its substances).
pub fn classify_tests(events: &[Event], filter: &DrugFilter) -> Result<UseClassification> {
    let UseMarks { marks, warning } = mark_use(events, filter)?;
    let positive: BTreeSet<UseMark> = marks.into_iter().collect();
    let mut tested: BTreeMap<UseMark, bool> = BTreeMap::new();
    for (mark, _) in drug_records(events, filter) {
        tested.insert(mark, positive.contains(&mark));
    }
    let observations = tested
        .into_iter()
        .map(|(mark, positive)| UseObservation {
            subject: mark.subject,
            day: mark.day,
            source: mark.source,
            positive,
        })
        .collect();
    Ok(UseClassification {
        observations,
        warning,
    })
}
