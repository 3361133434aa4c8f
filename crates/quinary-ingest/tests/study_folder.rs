use std::fs;
use std::path::Path;

use quinary_ingest::{DrugFilter, IngestError, TableKind, classify_tests, load_study};
use quinary_model::{EventKind, EventPayload, Source, SubjectId};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write fixture");
}

fn write_study(dir: &Path) {
    write(
        dir,
        "drug_use.csv",
        "subject_id,study_day,substance,source\n\
         1,14,Heroin,UDS\n\
         1,15,Cocaine,UDS\n\
         1,15,,TFB\n\
         2,40,Heroin,UDS\n",
    );
    write(
        dir,
        "visits.csv",
        "subject_id,study_day,visit_state\n\
         1,0,completed\n\
         1,9,completed\n\
         1,14,missed\n",
    );
    write(
        dir,
        "randomization.csv",
        "subject_id,study_day,randomization_index,treatment\n\
         1,0,1,BUP\n",
    );
    write(
        dir,
        "dose.csv",
        "subject_id,study_day,amount\n\
         1,0,0\n\
         1,2,8\n",
    );
    write(dir, "project.csv", "subject_id,project_id\n1,27\n2,27\n");
}

#[test]
fn loads_all_tables_into_one_stream() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_study(dir.path());

    let tables = load_study(dir.path()).expect("load study");

    assert_eq!(tables.count(EventKind::DrugUse), 4);
    assert_eq!(tables.count(EventKind::ClinicVisit), 3);
    assert_eq!(tables.count(EventKind::Randomization), 1);
    assert_eq!(tables.count(EventKind::Dose), 2);
    assert_eq!(tables.projects.len(), 2);
    assert_eq!(
        tables.subjects().into_iter().collect::<Vec<_>>(),
        vec![SubjectId(1), SubjectId(2)]
    );
    // Ordered by subject, then day.
    let keys: Vec<(i64, i32)> = tables
        .events
        .iter()
        .map(|event| (event.subject.get(), event.day))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    let blank = tables
        .events
        .iter()
        .find(|event| {
            matches!(&event.payload, EventPayload::DrugUse { source: Source::Tfb, .. })
        })
        .expect("tfb record");
    assert_eq!(
        blank.payload,
        EventPayload::DrugUse {
            substance: String::new(),
            source: Source::Tfb
        }
    );
}

#[test]
fn classifies_loaded_tests() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_study(dir.path());
    let tables = load_study(dir.path()).expect("load study");

    let filter = DrugFilter::new(["heroin"], [Source::Uds]);
    let classified = classify_tests(&tables.events, &filter).expect("classify");

    let summary: Vec<(i64, i32, bool)> = classified
        .observations
        .iter()
        .map(|obs| (obs.subject.get(), obs.day, obs.positive))
        .collect();
    assert_eq!(summary, vec![(1, 14, true), (1, 15, false), (2, 40, true)]);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_study(dir.path());
    fs::remove_file(dir.path().join("dose.csv")).expect("remove dose");

    match load_study(dir.path()) {
        Err(IngestError::FileNotFound { path }) => {
            assert!(path.ends_with("dose.csv"));
        }
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn missing_columns_fail_without_partial_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_study(dir.path());
    write(dir.path(), "visits.csv", "subject_id,day\n1,0\n");

    match load_study(dir.path()) {
        Err(IngestError::Schema { table, missing }) => {
            assert_eq!(table, TableKind::Visit);
            assert_eq!(missing, vec!["study_day", "visit_state"]);
        }
        other => panic!("expected Schema error, got {other:?}"),
    }
}
