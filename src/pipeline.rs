//! End-to-end runs: load, synchronize, save, roll up.
//!
//! Data flows one way: curriculum → synchronizer → store → rollup. Each run
//! either completes or returns the first terminal error; nothing is retried.

use tracing::info;

use crate::error::Result;
use crate::infra::{GridLoader, GridWriter};
use crate::parser::Curriculum;
use crate::rollup::{UnitResult, compute_rollups};
use crate::store::GradeStore;
use crate::sync::{SyncConfig, SyncOutcome, synchronize};

/// Loads both workbooks, synchronizes the store and saves it once.
pub fn sync_store<C, S>(
    curriculum_source: &C,
    store_storage: &S,
    config: &SyncConfig,
) -> Result<(Curriculum, SyncOutcome)>
where
    C: GridLoader,
    S: GridLoader + GridWriter,
{
    let curriculum = Curriculum::from_workbook(&curriculum_source.load()?)?;
    let existing = store_storage
        .load_optional()?
        .map(GradeStore::from_workbook)
        .transpose()?;

    let outcome = synchronize(&curriculum, existing, config);
    store_storage.save(outcome.store.workbook())?;

    Ok((curriculum, outcome))
}

/// Synchronizes the store, then computes unit averages over it.
pub fn sync_and_rollup<C, S>(
    curriculum_source: &C,
    store_storage: &S,
    config: &SyncConfig,
) -> Result<(SyncOutcome, Vec<UnitResult>)>
where
    C: GridLoader,
    S: GridLoader + GridWriter,
{
    let (curriculum, outcome) = sync_store(curriculum_source, store_storage, config)?;
    let results = compute_rollups(&curriculum, &outcome.store);

    info!(units = results.len(), "Rollup complete");
    Ok((outcome, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollupError;
    use crate::grid::{Cell, Grid, Workbook};
    use std::cell::RefCell;

    /// In-memory storage standing in for a file-backed workbook.
    #[derive(Default)]
    struct MemoryStorage {
        workbook: RefCell<Option<Workbook>>,
        saves: RefCell<usize>,
    }

    impl GridLoader for MemoryStorage {
        fn load(&self) -> Result<Workbook> {
            self.workbook
                .borrow()
                .clone()
                .ok_or_else(|| RollupError::SourceUnavailable {
                    path: "memory".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
        }

        fn load_optional(&self) -> Result<Option<Workbook>> {
            Ok(self.workbook.borrow().clone())
        }
    }

    impl GridWriter for MemoryStorage {
        fn save(&self, workbook: &Workbook) -> Result<()> {
            *self.workbook.borrow_mut() = Some(workbook.clone());
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn curriculum_storage() -> MemoryStorage {
        let mut wb = Workbook::new();
        wb.add_sheet(
            "S1",
            Grid::from_rows(vec![
                vec![Cell::text("Semestre 1"), Cell::text("UE1")],
                vec![],
                vec![Cell::text("A"), Cell::Number(2.0)],
                vec![Cell::text("B"), Cell::Number(1.0)],
            ]),
        );
        MemoryStorage {
            workbook: RefCell::new(Some(wb)),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_run_creates_and_saves_store() {
        let curriculum = curriculum_storage();
        let store = MemoryStorage::default();

        let (outcome, results) =
            sync_and_rollup(&curriculum, &store, &SyncConfig::default()).unwrap();

        assert!(outcome.summary.created_store);
        assert!(results.is_empty());
        assert_eq!(*store.saves.borrow(), 1);
        let saved = GradeStore::from_workbook(store.load().unwrap()).unwrap();
        assert_eq!(saved.titles("S1"), vec!["A", "B"]);
    }

    #[test]
    fn test_rollup_uses_saved_grades() {
        let curriculum = curriculum_storage();
        let store = MemoryStorage::default();
        sync_store(&curriculum, &store, &SyncConfig::default()).unwrap();

        let mut edited = GradeStore::from_workbook(store.load().unwrap()).unwrap();
        edited.record_grade("S1", "A", 10.0).unwrap();
        edited.record_grade("S1", "A", 14.0).unwrap();
        edited.record_grade("S1", "B", 8.0).unwrap();
        store.save(edited.workbook()).unwrap();

        let (outcome, results) =
            sync_and_rollup(&curriculum, &store, &SyncConfig::default()).unwrap();

        assert!(outcome.summary.is_unchanged());
        assert_eq!(results.len(), 1);
        assert!((results[0].average - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_missing_curriculum_is_fatal() {
        let store = MemoryStorage::default();
        let err = sync_store(&MemoryStorage::default(), &store, &SyncConfig::default())
            .unwrap_err();

        assert!(matches!(err, RollupError::SourceUnavailable { .. }));
        assert_eq!(*store.saves.borrow(), 0);
    }
}
