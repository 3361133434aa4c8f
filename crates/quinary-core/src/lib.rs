//! Temporal alignment and quinary encoding of per-subject trial events.
//!
//! Stages run leaf-first: backbone, visit imputation, induction delay,
//! weekly alignment, then symbol encoding. [`run_pipeline`] drives them for
//! every subject in parallel.

pub mod backbone;
pub mod config;
pub mod encoder;
pub mod error;
pub mod frames;
pub mod induction;
pub mod pipeline;
pub mod subject;
pub mod visits;
pub mod weeks;

pub use backbone::{BackboneRequest, build_backbone, build_backbones, first_grid_day};
pub use config::{load_config, parse_config, validate};
pub use encoder::{
    RandomizationWeeks, SYMBOL_RULES, SymbolRule, assign_symbol, collapse_words, encode_weeks,
    evaluate,
};
pub use error::{PipelineError, Result};
pub use frames::{OutputFrames, WORD_COLUMNS, words_frame};
pub use induction::{induction_delay, induction_delays};
pub use pipeline::{PipelineOutput, SubjectOutput, process_subject, run_pipeline};
pub use subject::{CONSENT_DAY, SubjectEvents, group_subjects};
pub use visits::{impute_backbone, impute_visits, on_weekly_grid, present_days, visit_status};
pub use weeks::{
    AlignedDay, DayRecord, PhaseSchedule, WeekTally, WeeklyAligner, study_week, week_anchor,
};
