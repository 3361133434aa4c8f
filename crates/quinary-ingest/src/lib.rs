//! Loading and normalizing the input event tables.
//!
//! Each CSV is read with polars, checked for its required columns, and
//! converted into the typed [`Event`](quinary_model::Event) stream. The drug
//! filter then reduces drug-use records to per-day positive/negative facts.

pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod polars_utils;
pub mod schema;
pub mod tables;

pub use csv_table::read_table;
pub use discovery::{StudyFiles, StudyFrames, StudyTables, load_study};
pub use error::{IngestError, Result};
pub use filter::{
    DrugFilter, PartialMatchWarning, UseClassification, UseMark, UseMarks, classify_tests,
    mark_use,
};
pub use polars_utils::{any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty};
pub use schema::{TableColumns, TableKind, validate_schema};
pub use tables::{
    dose_events, drug_use_events, project_assignments, randomization_events, visit_events,
};
