//! Typed extraction of events from validated DataFrames.

use polars::prelude::DataFrame;
use quinary_model::{
    Event, EventPayload, ProjectAssignment, ProjectId, Source, StudyDay, SubjectId, VisitState,
    is_plausible_day,
};

use crate::error::Result;
use crate::polars_utils::{any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty};
use crate::schema::{
    AMOUNT, PROJECT_ID, RANDOMIZATION_INDEX, SOURCE, STUDY_DAY, SUBJECT_ID, SUBSTANCE, TREATMENT,
    TableColumns, TableKind, VISIT_STATE,
};

fn subject_at(columns: &TableColumns<'_>, row: usize) -> Result<SubjectId> {
    any_to_i64(columns.value(SUBJECT_ID, row))
        .map(SubjectId)
        .ok_or_else(|| columns.invalid(SUBJECT_ID, row))
}

/// Study days beyond [`quinary_model::STUDY_DAY_LIMIT`] are rejected.
fn day_at(columns: &TableColumns<'_>, row: usize) -> Result<StudyDay> {
    any_to_i64(columns.value(STUDY_DAY, row))
        .and_then(|day| StudyDay::try_from(day).ok())
        .filter(|day| is_plausible_day(*day))
        .ok_or_else(|| columns.invalid(STUDY_DAY, row))
}

/// Drug-use records. A blank substance is kept as a test with no detection.
pub fn drug_use_events(df: &DataFrame) -> Result<Vec<Event>> {
    let columns = TableColumns::resolve(df, TableKind::DrugUse)?;
    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let source = any_to_string(columns.value(SOURCE, row))
            .parse::<Source>()
            .map_err(|_| columns.invalid(SOURCE, row))?;
        events.push(Event::new(
            subject_at(&columns, row)?,
            day_at(&columns, row)?,
            EventPayload::DrugUse {
                substance: any_to_string(columns.value(SUBSTANCE, row)),
                source,
            },
        ));
    }
    Ok(events)
}

pub fn visit_events(df: &DataFrame) -> Result<Vec<Event>> {
    let columns = TableColumns::resolve(df, TableKind::Visit)?;
    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let state = VisitState::parse(&any_to_string(columns.value(VISIT_STATE, row)));
        events.push(Event::new(
            subject_at(&columns, row)?,
            day_at(&columns, row)?,
            EventPayload::ClinicVisit { state },
        ));
    }
    Ok(events)
}

pub fn randomization_events(df: &DataFrame) -> Result<Vec<Event>> {
    let columns = TableColumns::resolve(df, TableKind::Randomization)?;
    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let index = any_to_i64(columns.value(RANDOMIZATION_INDEX, row))
            .and_then(|value| u8::try_from(value).ok())
            .filter(|value| *value >= 1)
            .ok_or_else(|| columns.invalid(RANDOMIZATION_INDEX, row))?;
        events.push(Event::new(
            subject_at(&columns, row)?,
            day_at(&columns, row)?,
            EventPayload::Randomization {
                index,
                treatment: any_to_string_non_empty(columns.value(TREATMENT, row)),
            },
        ));
    }
    Ok(events)
}

/// Dose records. A blank amount counts as no dose.
pub fn dose_events(df: &DataFrame) -> Result<Vec<Event>> {
    let columns = TableColumns::resolve(df, TableKind::Dose)?;
    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let value = columns.value(AMOUNT, row);
        let amount = if value.is_null() {
            0.0
        } else {
            any_to_f64(value).ok_or_else(|| columns.invalid(AMOUNT, row))?
        };
        events.push(Event::new(
            subject_at(&columns, row)?,
            day_at(&columns, row)?,
            EventPayload::Dose { amount },
        ));
    }
    Ok(events)
}

pub fn project_assignments(df: &DataFrame) -> Result<Vec<ProjectAssignment>> {
    let columns = TableColumns::resolve(df, TableKind::Project)?;
    let mut assignments = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let project = ProjectId::new(any_to_string(columns.value(PROJECT_ID, row)))
            .map_err(|_| columns.invalid(PROJECT_ID, row))?;
        assignments.push(ProjectAssignment {
            subject: subject_at(&columns, row)?,
            project,
        });
    }
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use polars::prelude::{AnyValue, Column, IntoColumn, NamedFrom, Series};

    fn text_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
        let cols: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| {
                Series::new(
                    name.into(),
                    values.iter().copied().map(String::from).collect::<Vec<_>>(),
                )
                .into_column()
            })
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn drug_use_rows_are_typed() {
        let df = text_df(vec![
            ("subject_id", vec!["1", "1"]),
            ("study_day", vec!["14", "15"]),
            ("substance", vec!["Heroin", ""]),
            ("source", vec!["uds", "UDS"]),
        ]);
        let events = drug_use_events(&df).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, SubjectId(1));
        assert_eq!(
            events[1].payload,
            EventPayload::DrugUse {
                substance: String::new(),
                source: Source::Uds
            }
        );
    }

    #[test]
    fn unknown_source_is_invalid() {
        let df = text_df(vec![
            ("subject_id", vec!["1"]),
            ("study_day", vec!["3"]),
            ("substance", vec!["Heroin"]),
            ("source", vec!["hair"]),
        ]);
        let err = drug_use_events(&df).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidValue { ref column, row: 0, .. } if column == "source"
        ));
    }

    #[test]
    fn blank_subject_is_invalid() {
        let df = text_df(vec![
            ("subject_id", vec![""]),
            ("study_day", vec!["3"]),
            ("visit_state", vec!["completed"]),
        ]);
        assert!(matches!(
            visit_events(&df),
            Err(IngestError::InvalidValue { .. })
        ));
    }

    #[test]
    fn randomization_index_must_be_positive() {
        let df = text_df(vec![
            ("subject_id", vec!["4"]),
            ("study_day", vec!["0"]),
            ("randomization_index", vec!["0"]),
            ("treatment", vec!["BUP"]),
        ]);
        assert!(randomization_events(&df).is_err());
    }

    #[test]
    fn far_out_study_day_is_invalid() {
        let df = text_df(vec![
            ("subject_id", vec!["1", "1"]),
            ("study_day", vec!["0", "2147483644"]),
            ("randomization_index", vec!["1", "2"]),
            ("treatment", vec!["BUP", "BUP"]),
        ]);
        let err = randomization_events(&df).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidValue { ref column, row: 1, .. } if column == "study_day"
        ));
    }

    #[test]
    fn numeric_columns_read_directly() {
        let df = DataFrame::new(vec![
            Series::new("subject_id".into(), vec![9i64]).into_column(),
            Series::new("study_day".into(), vec![-2i64]).into_column(),
            Series::new("amount".into(), vec![Some(16.0f64)]).into_column(),
        ])
        .unwrap();
        let events = dose_events(&df).unwrap();
        assert_eq!(events[0].day, -2);
        assert_eq!(events[0].payload, EventPayload::Dose { amount: 16.0 });
        assert_eq!(AnyValue::Int64(9), df.column("subject_id").unwrap().get(0).unwrap());
    }

    #[test]
    fn project_ids_from_integers() {
        let df = DataFrame::new(vec![
            Series::new("SUBJECT_ID".into(), vec![1i64, 2]).into_column(),
            Series::new("Project_Id".into(), vec![27i64, 30]).into_column(),
        ])
        .unwrap();
        let assignments = project_assignments(&df).unwrap();
        assert_eq!(assignments[1].project.as_str(), "30");
    }
}
