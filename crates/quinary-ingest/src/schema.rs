//! Required columns per input table.

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::{AnyValue, Column, DataFrame};
use quinary_model::CaseInsensitiveSet;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

pub const SUBJECT_ID: &str = "subject_id";
pub const STUDY_DAY: &str = "study_day";
pub const SUBSTANCE: &str = "substance";
pub const SOURCE: &str = "source";
pub const VISIT_STATE: &str = "visit_state";
pub const RANDOMIZATION_INDEX: &str = "randomization_index";
pub const TREATMENT: &str = "treatment";
pub const AMOUNT: &str = "amount";
pub const PROJECT_ID: &str = "project_id";

/// The five input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableKind {
    DrugUse,
    Visit,
    Randomization,
    Dose,
    Project,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::DrugUse,
        TableKind::Visit,
        TableKind::Randomization,
        TableKind::Dose,
        TableKind::Project,
    ];

    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::DrugUse => &[SUBJECT_ID, STUDY_DAY, SUBSTANCE, SOURCE],
            TableKind::Visit => &[SUBJECT_ID, STUDY_DAY, VISIT_STATE],
            TableKind::Randomization => {
                &[SUBJECT_ID, STUDY_DAY, RANDOMIZATION_INDEX, TREATMENT]
            }
            TableKind::Dose => &[SUBJECT_ID, STUDY_DAY, AMOUNT],
            TableKind::Project => &[SUBJECT_ID, PROJECT_ID],
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::DrugUse => "drug_use.csv",
            TableKind::Visit => "visits.csv",
            TableKind::Randomization => "randomization.csv",
            TableKind::Dose => "dose.csv",
            TableKind::Project => "project.csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::DrugUse => "drug use",
            TableKind::Visit => "visit",
            TableKind::Randomization => "randomization",
            TableKind::Dose => "dose",
            TableKind::Project => "project",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required columns of one table, resolved against a DataFrame's headers.
#[derive(Debug)]
pub struct TableColumns<'a> {
    kind: TableKind,
    columns: BTreeMap<&'static str, &'a Column>,
}

impl<'a> TableColumns<'a> {
    /// Resolves every required column case-insensitively, failing with the
    /// full list of missing names.
    pub fn resolve(df: &'a DataFrame, kind: TableKind) -> Result<Self> {
        let lookup = CaseInsensitiveSet::new(df.get_column_names().iter().map(|name| name.as_str()));
        let missing: Vec<String> = kind
            .required_columns()
            .iter()
            .filter(|name| !lookup.contains(name))
            .map(|name| (*name).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::Schema {
                table: kind,
                missing,
            });
        }
        let mut columns = BTreeMap::new();
        for name in kind.required_columns() {
            let Some(actual) = lookup.get(name) else {
                continue;
            };
            columns.insert(*name, df.column(actual)?);
        }
        Ok(Self { kind, columns })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Cell value, `Null` when the row or column is out of range.
    pub fn value(&self, column: &str, row: usize) -> AnyValue<'a> {
        self.columns
            .get(column)
            .copied()
            .and_then(|col| col.get(row).ok())
            .unwrap_or(AnyValue::Null)
    }

    pub fn invalid(&self, column: &str, row: usize) -> IngestError {
        IngestError::InvalidValue {
            table: self.kind,
            column: column.to_string(),
            row,
            value: crate::polars_utils::any_to_string(self.value(column, row)),
        }
    }
}

/// Checks that `df` carries the columns `kind` requires.
pub fn validate_schema(df: &DataFrame, kind: TableKind) -> Result<()> {
    TableColumns::resolve(df, kind).map(|_| ())
}
