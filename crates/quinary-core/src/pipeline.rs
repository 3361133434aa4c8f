//! End-to-end batch: classified tests in, per-phase words out.

use std::collections::BTreeMap;

use quinary_ingest::{DrugFilter, PartialMatchWarning, StudyTables, classify_tests};
use quinary_model::{
    AnchorMode, BackboneEntry, ImputedVisit, InductionDelay, PipelineConfig, ProjectId,
    ProtocolSpec, STUDY_DAY_LIMIT, SubjectId, TrialPhase, UsePatternWord, WeekRecord, WeekSymbol,
    is_plausible_day,
};
use rayon::prelude::*;
use tracing::{debug, debug_span, info};

use crate::backbone::build_backbone;
use crate::encoder::{RandomizationWeeks, collapse_words, encode_weeks};
use crate::error::{PipelineError, Result};
use crate::induction::induction_delay;
use crate::subject::{SubjectEvents, group_subjects};
use crate::visits::impute_backbone;
use crate::weeks::{WeeklyAligner, week_anchor};

/// Everything derived for one subject. Produced whole or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectOutput {
    pub subject: SubjectId,
    pub backbone: Vec<BackboneEntry>,
    pub visits: Vec<ImputedVisit>,
    pub induction: InductionDelay,
    pub weeks: Vec<WeekRecord>,
    pub words: Vec<UsePatternWord>,
}

/// Concatenated outputs of the whole batch, ordered by subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub backbone: Vec<BackboneEntry>,
    pub visits: Vec<ImputedVisit>,
    pub induction: Vec<InductionDelay>,
    pub weeks: Vec<WeekRecord>,
    pub words: Vec<UsePatternWord>,
    pub warning: Option<PartialMatchWarning>,
}

impl PipelineOutput {
    pub fn subject_count(&self) -> usize {
        self.induction.len()
    }

    pub fn words_in(&self, phase: TrialPhase) -> usize {
        self.words.iter().filter(|word| word.phase == phase).count()
    }

    /// How often each symbol occurs across all words.
    pub fn symbol_counts(&self) -> BTreeMap<WeekSymbol, usize> {
        let mut counts: BTreeMap<WeekSymbol, usize> =
            WeekSymbol::ALL.iter().map(|symbol| (*symbol, 0)).collect();
        for symbol in self.words.iter().flat_map(UsePatternWord::symbols) {
            *counts.entry(symbol).or_default() += 1;
        }
        counts
    }

    fn extend(&mut self, subject: SubjectOutput) {
        self.backbone.extend(subject.backbone);
        self.visits.extend(subject.visits);
        self.induction.push(subject.induction);
        self.weeks.extend(subject.weeks);
        self.words.extend(subject.words);
    }

    fn sort(&mut self) {
        self.backbone.sort_by_key(|entry| (entry.subject, entry.day));
        self.visits.sort_by_key(|visit| (visit.subject, visit.day));
        self.induction.sort_by_key(|delay| delay.subject);
        self.weeks.sort_by_key(|record| (record.subject, record.week));
        self.words.sort_by_key(|word| (word.subject, word.phase));
    }
}

/// Rejects days that would push week arithmetic toward overflow.
fn check_days(unit: &SubjectEvents, protocol: &ProtocolSpec) -> Result<()> {
    if !protocol.is_plausible() {
        return Err(PipelineError::InvalidConfig {
            message: format!(
                "protocol {}: days must lie within -{STUDY_DAY_LIMIT}..={STUDY_DAY_LIMIT}",
                unit.project
            ),
        });
    }
    match unit.events.iter().find(|event| !is_plausible_day(event.day)) {
        Some(event) => Err(PipelineError::DayOutOfRange {
            subject: unit.subject,
            day: event.day,
        }),
        None => Ok(()),
    }
}

/// Runs every stage for one subject.
pub fn process_subject(
    unit: &SubjectEvents,
    protocol: &ProtocolSpec,
    anchor: AnchorMode,
) -> Result<SubjectOutput> {
    check_days(unit, protocol)?;
    let subject = unit.subject;
    let induction = induction_delay(subject, &unit.events);

    let visit_anchor = unit.visit_anchor();
    // never-randomized subjects stay single-phase
    let second_randomization = unit
        .randomization_day(1)
        .and_then(|_| unit.randomization_day(2));
    let window = protocol.window(unit.observed_max_day(), second_randomization);
    let backbone = build_backbone(subject, &unit.project, window, visit_anchor);
    let visits = impute_backbone(&backbone, &unit.visit_days(), visit_anchor);

    let aligner = WeeklyAligner::new(
        window,
        week_anchor(anchor, &induction),
        second_randomization,
        protocol.is_adaptive(),
    );
    let weeks = encode_weeks(subject, &aligner.tally(&visits, &unit.observations));
    let rand_weeks = RandomizationWeeks {
        first: aligner.week_of(visit_anchor),
        second: second_randomization.map(|day| aligner.week_of(day)),
    };
    let words = collapse_words(subject, &weeks, rand_weeks)?;
    debug!(
        start_day = window.start_day,
        end_day = window.end_day,
        anchor = aligner.anchor(),
        backbone = backbone.len(),
        weeks = weeks.len(),
        words = words.len(),
        "encoded subject"
    );

    Ok(SubjectOutput {
        subject,
        backbone,
        visits,
        induction,
        weeks,
        words,
    })
}

/// Resolves each subject's protocol, failing on the first unconfigured
/// project with every affected subject named.
fn resolve_protocols<'a>(
    units: &'a [SubjectEvents],
    config: &'a PipelineConfig,
) -> Result<Vec<(&'a SubjectEvents, &'a ProtocolSpec)>> {
    let mut unknown: BTreeMap<&ProjectId, Vec<SubjectId>> = BTreeMap::new();
    let mut resolved = Vec::with_capacity(units.len());
    for unit in units {
        match config.protocol(&unit.project) {
            Some(protocol) => resolved.push((unit, protocol)),
            None => unknown.entry(&unit.project).or_default().push(unit.subject),
        }
    }
    if let Some((project, subjects)) = unknown.into_iter().next() {
        return Err(PipelineError::UnknownProject {
            project: project.clone(),
            subjects,
        });
    }
    Ok(resolved)
}

/// Runs the full batch. Subjects are processed in parallel; any subject
/// error fails the whole run.
pub fn run_pipeline(tables: &StudyTables, config: &PipelineConfig) -> Result<PipelineOutput> {
    let filter = DrugFilter::from_selection(&config.drugs);
    let classification = classify_tests(&tables.events, &filter)?;
    info!(
        observations = classification.observations.len(),
        positive = classification
            .observations
            .iter()
            .filter(|observation| observation.positive)
            .count(),
        "classified drug tests"
    );

    let units = group_subjects(tables, &classification.observations)?;
    let work = resolve_protocols(&units, config)?;

    let results: Vec<SubjectOutput> = work
        .par_iter()
        .map(|(unit, protocol)| {
            let _span = debug_span!("subject", id = %unit.subject, project = %unit.project).entered();
            process_subject(unit, protocol, config.anchor)
        })
        .collect::<Result<_>>()?;

    let mut output = PipelineOutput {
        warning: classification.warning,
        ..PipelineOutput::default()
    };
    for subject in results {
        output.extend(subject);
    }
    output.sort();
    info!(
        subjects = output.subject_count(),
        words = output.words.len(),
        weeks = output.weeks.len(),
        "pipeline complete"
    );
    Ok(output)
}
