use std::path::PathBuf;

use quinary_core::PipelineOutput;
use quinary_ingest::{PartialMatchWarning, TableKind};

#[derive(Debug)]
pub struct EncodeResult {
    pub study_folder: PathBuf,
    pub output_dir: PathBuf,
    /// Files actually written; empty on a dry run.
    pub written: Vec<PathBuf>,
    pub output: PipelineOutput,
}

#[derive(Debug)]
pub struct CheckResult {
    pub study_folder: PathBuf,
    pub table_rows: Vec<(TableKind, usize)>,
    pub subjects: usize,
    pub observations: usize,
    pub positive: usize,
    pub protocols: usize,
    pub warning: Option<PartialMatchWarning>,
}
