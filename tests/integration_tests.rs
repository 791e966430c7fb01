use grade_rollup::infra::{CsvWorkbook, GridLoader, GridWriter};
use grade_rollup::pipeline::{sync_and_rollup, sync_store};
use grade_rollup::rollup::UnitId;
use grade_rollup::rollup::records::rollup_records_file;
use grade_rollup::store::{GradeRecord, GradeStore};
use grade_rollup::sync::SyncConfig;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

fn record_grades(storage: &CsvWorkbook, grades: &[(&str, &str, f64)]) {
    let mut store = GradeStore::from_workbook(storage.load().unwrap()).unwrap();
    for (sheet, title, grade) in grades {
        store.record_grade(sheet, title, *grade).unwrap();
    }
    storage.save(store.workbook()).unwrap();
}

#[test]
fn test_full_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let curriculum = CsvWorkbook::new(fixture("curriculum"));
    let store = CsvWorkbook::new(tmp.path().join("grades"));
    let config = SyncConfig::default();

    let (_, first) = sync_store(&curriculum, &store, &config).unwrap();
    assert!(first.summary.created_store);
    assert_eq!(
        first.store.titles("S1"),
        vec!["Mathématiques", "Physique", "Anglais", "Espagnol", "Projet"]
    );
    assert_eq!(first.store.titles("S2"), vec!["Algorithmique", "Réseaux"]);

    record_grades(
        &store,
        &[
            ("S1", "Mathématiques", 12.0),
            ("S1", "Mathématiques", 14.0),
            ("S1", "Physique", 9.0),
            ("S1", "Anglais", 15.0),
            ("S1", "Projet", 10.0),
        ],
    );

    let (outcome, results) = sync_and_rollup(&curriculum, &store, &config).unwrap();
    assert!(outcome.summary.is_unchanged());

    let ids: Vec<_> = results.iter().map(|r| r.unit.clone()).collect();
    assert_eq!(
        ids,
        vec![
            UnitId::new("S1", "UE11 Sciences"),
            UnitId::new("S1", "UE12 Langues"),
        ]
    );
    // (3×12 + 3×14 + 2×9) / 8
    assert!((results[0].average - 12.0).abs() < 1e-9);
    // (2×15 + 1×10) / 3; "bonus" is not a coefficient
    assert!((results[1].average - 40.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_added_subject_preserves_grades_and_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let curriculum_dir = tmp.path().join("curriculum");
    copy_dir(&fixture("curriculum"), &curriculum_dir);
    let curriculum = CsvWorkbook::new(&curriculum_dir);
    let store = CsvWorkbook::new(tmp.path().join("grades"));
    let config = SyncConfig::default();

    sync_store(&curriculum, &store, &config).unwrap();
    record_grades(&store, &[("S2", "Réseaux", 11.0)]);

    let s2 = curriculum_dir.join("S2.csv");
    let mut content = fs::read_to_string(&s2).unwrap();
    content.push_str("Bases de données;3\n");
    fs::write(&s2, content).unwrap();

    let (_, outcome) = sync_store(&curriculum, &store, &config).unwrap();
    assert_eq!(outcome.summary.added_title_count(), 1);
    assert_eq!(
        outcome.store.records("S2").unwrap(),
        vec![
            GradeRecord { title: "Algorithmique".into(), grades: vec![] },
            GradeRecord { title: "Réseaux".into(), grades: vec![11.0] },
            GradeRecord { title: "Bases de données".into(), grades: vec![] },
        ]
    );

    let before = store.load().unwrap();
    let (_, again) = sync_store(&curriculum, &store, &config).unwrap();
    assert!(again.summary.is_unchanged());
    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn test_new_period_added_to_existing_store() {
    let tmp = tempfile::tempdir().unwrap();
    let curriculum_dir = tmp.path().join("curriculum");
    copy_dir(&fixture("curriculum"), &curriculum_dir);
    let curriculum = CsvWorkbook::new(&curriculum_dir);
    let store = CsvWorkbook::new(tmp.path().join("grades"));
    let config = SyncConfig::default();

    sync_store(&curriculum, &store, &config).unwrap();

    fs::write(curriculum_dir.join("S3.csv"), "Semestre 3;UE31\n;\nStage;6\n").unwrap();
    fs::write(
        curriculum_dir.join("workbook.json"),
        r#"{"sheets":["S1","S2","S3"]}"#,
    )
    .unwrap();

    let (_, outcome) = sync_store(&curriculum, &store, &config).unwrap();
    let saved = store.load().unwrap();
    let header: Vec<String> = saved
        .sheet("S3")
        .unwrap()
        .row(1)
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(header, vec!["Subject", "Grade 1", "Grade 2", "Grade 3"]);
    assert_eq!(outcome.store.titles("S3"), vec!["Stage"]);
    assert_eq!(saved.sheet_names().collect::<Vec<_>>(), vec!["S1", "S2", "S3"]);
}

#[test]
fn test_records_file_rollup() {
    let results = rollup_records_file(&fixture("notes.csv")).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].unit, UnitId::new("S1", "UE1"));
    assert!((results[0].average - 11.2).abs() < 1e-9);
    assert_eq!(results[1].unit, UnitId::new("S2", "UE4"));
    assert_eq!(results[1].average, 13.5);
}
