//! Output tables as polars frames.

use polars::prelude::{Column, DataFrame, PolarsResult};
use quinary_model::{BackboneEntry, ImputedVisit, InductionDelay, UsePatternWord, WeekRecord};

use crate::pipeline::PipelineOutput;

/// Column order of the word table.
pub const WORD_COLUMNS: [&str; 7] = [
    "subject_id",
    "trial_phase",
    "start_week",
    "end_week",
    "rand_week_1",
    "rand_week_2",
    "word",
];

pub fn words_frame(words: &[UsePatternWord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            WORD_COLUMNS[0].into(),
            words.iter().map(|w| w.subject.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[1].into(),
            words.iter().map(|w| w.phase.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[2].into(),
            words.iter().map(|w| w.start_week).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[3].into(),
            words.iter().map(|w| w.end_week).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[4].into(),
            words.iter().map(|w| w.rand_week_1).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[5].into(),
            words.iter().map(|w| w.rand_week_2).collect::<Vec<_>>(),
        ),
        Column::new(
            WORD_COLUMNS[6].into(),
            words.iter().map(|w| w.word.as_str()).collect::<Vec<_>>(),
        ),
    ])
}

pub fn backbone_frame(entries: &[BackboneEntry]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "subject_id".into(),
            entries.iter().map(|e| e.subject.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "project_id".into(),
            entries.iter().map(|e| e.project.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "study_day".into(),
            entries.iter().map(|e| e.day).collect::<Vec<_>>(),
        ),
    ])
}

pub fn visits_frame(visits: &[ImputedVisit]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "subject_id".into(),
            visits.iter().map(|v| v.subject.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "study_day".into(),
            visits.iter().map(|v| v.day).collect::<Vec<_>>(),
        ),
        Column::new(
            "visit_status".into(),
            visits.iter().map(|v| v.status.as_str()).collect::<Vec<_>>(),
        ),
    ])
}

pub fn induction_frame(delays: &[InductionDelay]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "subject_id".into(),
            delays.iter().map(|d| d.subject.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "randomization_day".into(),
            delays.iter().map(|d| d.randomization_day).collect::<Vec<_>>(),
        ),
        Column::new(
            "treatment".into(),
            delays
                .iter()
                .map(|d| d.treatment.as_deref())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "treatment_start_day".into(),
            delays.iter().map(|d| d.treatment_start_day).collect::<Vec<_>>(),
        ),
        Column::new(
            "induction_delay".into(),
            delays.iter().map(|d| d.delay).collect::<Vec<_>>(),
        ),
    ])
}

pub fn weeks_frame(records: &[WeekRecord]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "subject_id".into(),
            records.iter().map(|r| r.subject.get()).collect::<Vec<_>>(),
        ),
        Column::new(
            "study_week".into(),
            records.iter().map(|r| r.week).collect::<Vec<_>>(),
        ),
        Column::new(
            "trial_phase".into(),
            records.iter().map(|r| r.phase.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "n_positive".into(),
            records.iter().map(|r| r.n_positive).collect::<Vec<_>>(),
        ),
        Column::new(
            "n_negative".into(),
            records.iter().map(|r| r.n_negative).collect::<Vec<_>>(),
        ),
        Column::new(
            "n_present".into(),
            records.iter().map(|r| r.n_present).collect::<Vec<_>>(),
        ),
        Column::new(
            "n_missing".into(),
            records.iter().map(|r| r.n_missing).collect::<Vec<_>>(),
        ),
        Column::new(
            "visit_expected".into(),
            records.iter().map(|r| r.expected).collect::<Vec<_>>(),
        ),
        Column::new(
            "symbol".into(),
            records
                .iter()
                .map(|r| r.symbol.as_char().to_string())
                .collect::<Vec<_>>(),
        ),
    ])
}

/// Named output tables, in write order.
#[derive(Debug, Clone)]
pub struct OutputFrames {
    pub words: DataFrame,
    pub backbone: DataFrame,
    pub visits: DataFrame,
    pub induction: DataFrame,
    pub weeks: DataFrame,
}

impl OutputFrames {
    pub const WORDS_FILE: &'static str = "use_pattern_words.csv";

    pub fn build(output: &PipelineOutput) -> PolarsResult<Self> {
        Ok(Self {
            words: words_frame(&output.words)?,
            backbone: backbone_frame(&output.backbone)?,
            visits: visits_frame(&output.visits)?,
            induction: induction_frame(&output.induction)?,
            weeks: weeks_frame(&output.weeks)?,
        })
    }

    /// Tables to write with their file names, word table first.
    pub fn outputs_mut(&mut self, intermediate: bool) -> Vec<(&'static str, &mut DataFrame)> {
        let Self {
            words,
            backbone,
            visits,
            induction,
            weeks,
        } = self;
        let mut outputs = vec![(Self::WORDS_FILE, words)];
        if intermediate {
            outputs.extend([
                ("backbone.csv", backbone),
                ("visit_imputed.csv", visits),
                ("induction_delay.csv", induction),
                ("weekly_use.csv", weeks),
            ]);
        }
        outputs
    }
}
