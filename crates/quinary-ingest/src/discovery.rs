//! Loading a study folder into the canonical event stream.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use quinary_model::{Event, EventKind, ProjectAssignment, SubjectId};
use tracing::{debug, info};

use crate::csv_table::read_table;
use crate::error::{IngestError, Result};
use crate::schema::TableKind;
use crate::tables::{
    dose_events, drug_use_events, project_assignments, randomization_events, visit_events,
};

/// Paths of the five input tables.
#[derive(Debug, Clone)]
pub struct StudyFiles {
    paths: BTreeMap<TableKind, PathBuf>,
}

impl StudyFiles {
    /// Uses the fixed file names under `folder`.
    pub fn in_folder(folder: &Path) -> Self {
        let paths = TableKind::ALL
            .into_iter()
            .map(|kind| (kind, folder.join(kind.file_name())))
            .collect();
        Self { paths }
    }

    pub fn path(&self, kind: TableKind) -> &Path {
        self.paths
            .get(&kind)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(kind.file_name()))
    }

    /// Fails on the first missing file, before any table is parsed.
    pub fn check_exists(&self) -> Result<()> {
        for kind in TableKind::ALL {
            let path = self.path(kind);
            if !path.is_file() {
                return Err(IngestError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// The five raw tables, as read.
#[derive(Debug, Clone)]
pub struct StudyFrames {
    pub drug_use: DataFrame,
    pub visits: DataFrame,
    pub randomization: DataFrame,
    pub dose: DataFrame,
    pub project: DataFrame,
}

impl StudyFrames {
    pub fn read(files: &StudyFiles) -> Result<Self> {
        files.check_exists()?;
        Ok(Self {
            drug_use: read_table(files.path(TableKind::DrugUse))?,
            visits: read_table(files.path(TableKind::Visit))?,
            randomization: read_table(files.path(TableKind::Randomization))?,
            dose: read_table(files.path(TableKind::Dose))?,
            project: read_table(files.path(TableKind::Project))?,
        })
    }
}

/// Normalized inputs: every event in one stream plus project membership.
#[derive(Debug, Clone, Default)]
pub struct StudyTables {
    /// Ordered by (subject, day, kind); input order is kept within ties.
    pub events: Vec<Event>,
    pub projects: Vec<ProjectAssignment>,
}

impl StudyTables {
    pub fn new(mut events: Vec<Event>, projects: Vec<ProjectAssignment>) -> Self {
        events.sort_by_key(|event| (event.subject, event.day, event.kind()));
        Self { events, projects }
    }

    /// Validates and converts every table. Any schema problem is fatal.
    pub fn from_frames(frames: &StudyFrames) -> Result<Self> {
        let mut events = drug_use_events(&frames.drug_use)?;
        events.extend(visit_events(&frames.visits)?);
        events.extend(randomization_events(&frames.randomization)?);
        events.extend(dose_events(&frames.dose)?);
        let projects = project_assignments(&frames.project)?;
        Ok(Self::new(events, projects))
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    /// Every subject seen in either the events or the project table.
    pub fn subjects(&self) -> BTreeSet<SubjectId> {
        self.events
            .iter()
            .map(|event| event.subject)
            .chain(self.projects.iter().map(|assignment| assignment.subject))
            .collect()
    }
}

/// Loads `drug_use.csv`, `visits.csv`, `randomization.csv`, `dose.csv` and
/// `project.csv` from `folder`.
pub fn load_study(folder: &Path) -> Result<StudyTables> {
    let files = StudyFiles::in_folder(folder);
    let frames = StudyFrames::read(&files)?;
    for (kind, df) in [
        (TableKind::DrugUse, &frames.drug_use),
        (TableKind::Visit, &frames.visits),
        (TableKind::Randomization, &frames.randomization),
        (TableKind::Dose, &frames.dose),
        (TableKind::Project, &frames.project),
    ] {
        debug!(table = %kind, rows = df.height(), columns = df.width(), "read table");
    }
    let tables = StudyTables::from_frames(&frames)?;
    info!(
        folder = %folder.display(),
        events = tables.events.len(),
        subjects = tables.subjects().len(),
        "study loaded"
    );
    Ok(tables)
}
