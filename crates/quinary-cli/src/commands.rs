use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{info, info_span, warn};

use quinary_core::{OutputFrames, group_subjects, load_config, run_pipeline};
use quinary_ingest::{DrugFilter, StudyTables, TableKind, classify_tests, load_study};
use quinary_model::{EventKind, PipelineConfig};

use crate::cli::{CheckArgs, EncodeArgs};
use crate::types::{CheckResult, EncodeResult};

fn load_inputs(study_folder: &Path, config_path: &Path) -> Result<(PipelineConfig, StudyTables)> {
    let config = load_config(config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;
    let tables = load_study(study_folder)
        .with_context(|| format!("load study folder {}", study_folder.display()))?;
    Ok((config, tables))
}

pub fn run_encode(args: &EncodeArgs) -> Result<EncodeResult> {
    let study_folder = &args.study_folder;
    let span = info_span!("encode", folder = %study_folder.display());
    let _guard = span.enter();

    let (mut config, tables) = load_inputs(study_folder, &args.config)?;
    if let Some(anchor) = args.anchor {
        config.anchor = anchor.into();
    }
    let output = run_pipeline(&tables, &config).context("encode subjects")?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| study_folder.join("output"));
    let mut written = Vec::new();
    if args.dry_run {
        info!("dry run, no files written");
    } else {
        let mut frames = OutputFrames::build(&output).context("build output tables")?;
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("create output dir {}", output_dir.display()))?;
        written = write_outputs(&mut frames, &output_dir, args.intermediate)?;
        info!(files = written.len(), dir = %output_dir.display(), "outputs written");
    }

    Ok(EncodeResult {
        study_folder: study_folder.clone(),
        output_dir,
        written,
        output,
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let study_folder = &args.study_folder;
    let span = info_span!("check", folder = %study_folder.display());
    let _guard = span.enter();

    let (config, tables) = load_inputs(study_folder, &args.config)?;
    let filter = DrugFilter::from_selection(&config.drugs);
    let classification = classify_tests(&tables.events, &filter).context("apply drug filter")?;
    let units = group_subjects(&tables, &classification.observations)
        .context("assign subjects to projects")?;

    let mut unconfigured: Vec<String> = units
        .iter()
        .filter(|unit| config.protocol(&unit.project).is_none())
        .map(|unit| unit.project.to_string())
        .collect();
    unconfigured.sort();
    unconfigured.dedup();
    if !unconfigured.is_empty() {
        bail!(
            "no protocol configured for project(s): {}",
            unconfigured.join(", ")
        );
    }

    let table_rows = vec![
        (TableKind::DrugUse, tables.count(EventKind::DrugUse)),
        (TableKind::Visit, tables.count(EventKind::ClinicVisit)),
        (TableKind::Randomization, tables.count(EventKind::Randomization)),
        (TableKind::Dose, tables.count(EventKind::Dose)),
        (TableKind::Project, tables.projects.len()),
    ];
    Ok(CheckResult {
        study_folder: study_folder.clone(),
        table_rows,
        subjects: units.len(),
        observations: classification.observations.len(),
        positive: classification
            .observations
            .iter()
            .filter(|observation| observation.positive)
            .count(),
        protocols: config.protocols.len(),
        warning: classification.warning,
    })
}

/// Writes the word table and, if asked, the intermediate tables. On any
/// failure the files already written are removed again.
fn write_outputs(
    frames: &mut OutputFrames,
    output_dir: &Path,
    intermediate: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, df) in frames.outputs_mut(intermediate) {
        match write_csv(df, &output_dir.join(name)) {
            Ok(path) => written.push(path),
            Err(err) => {
                for path in &written {
                    if let Err(remove_err) = fs::remove_file(path) {
                        warn!(path = %path.display(), error = %remove_err, "could not remove partial output");
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(written)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<PathBuf> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path.to_path_buf())
}
