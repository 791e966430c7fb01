//! Store synchronization against the curriculum.
//!
//! Synchronization only ever adds: missing period sheets are created and
//! missing subject titles are appended. Existing rows, their order and their
//! grades are left alone, and store sheets with no curriculum counterpart are
//! kept. Running it twice with the same curriculum changes nothing the second
//! time.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::parser::Curriculum;
use crate::store::GradeStore;

pub const TITLE_HEADER: &str = "Subject";
pub const GRADE_HEADER: &str = "Grade";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Grade columns reserved in the header of sheets added to an existing store.
    pub grade_columns: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { grade_columns: 3 }
    }
}

impl SyncConfig {
    fn initial_header(&self) -> Vec<String> {
        vec![TITLE_HEADER.to_string(), GRADE_HEADER.to_string()]
    }

    fn expanded_header(&self) -> Vec<String> {
        std::iter::once(TITLE_HEADER.to_string())
            .chain((1..=self.grade_columns).map(|i| format!("{GRADE_HEADER} {i}")))
            .collect()
    }
}

/// What a synchronization pass changed, per sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetChange {
    pub sheet: String,
    pub created: bool,
    pub added_titles: Vec<String>,
}

/// A title the curriculum lists more than once in the same period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateTitle {
    pub sheet: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    pub created_store: bool,
    pub changes: Vec<SheetChange>,
    pub duplicates: Vec<DuplicateTitle>,
}

impl SyncSummary {
    /// True when the pass left an existing store as it was.
    pub fn is_unchanged(&self) -> bool {
        !self.created_store && self.changes.is_empty()
    }

    pub fn added_title_count(&self) -> usize {
        self.changes.iter().map(|c| c.added_titles.len()).sum()
    }
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub store: GradeStore,
    pub summary: SyncSummary,
}

/// Brings `existing` (or a fresh store when `None`) in line with `curriculum`.
///
/// Malformed inputs are rejected earlier, when the [`Curriculum`] and the
/// [`GradeStore`] are built from their workbooks, so this step cannot fail.
pub fn synchronize(
    curriculum: &Curriculum,
    existing: Option<GradeStore>,
    config: &SyncConfig,
) -> SyncOutcome {
    let created_store = existing.is_none();
    let mut store = existing.unwrap_or_default();
    let mut summary = SyncSummary {
        created_store,
        ..Default::default()
    };

    for period in &curriculum.periods {
        let created = !store.has_sheet(&period.name);
        if created {
            let header = if created_store {
                config.initial_header()
            } else {
                config.expanded_header()
            };
            store.add_sheet(&period.name, &header);
        }

        // Collected once, before any append.
        let present: HashSet<String> = store.titles(&period.name).into_iter().collect();
        let mut appended: HashSet<&str> = HashSet::new();
        let mut added_titles = Vec::new();

        for title in &period.subjects {
            if present.contains(title) {
                continue;
            }
            if !appended.insert(title.as_str()) {
                warn!(sheet = %period.name, title = %title, "Curriculum repeats subject title");
                summary.duplicates.push(DuplicateTitle {
                    sheet: period.name.clone(),
                    title: title.clone(),
                });
                continue;
            }
            store.append_title(&period.name, title);
            added_titles.push(title.clone());
        }

        debug!(
            sheet = %period.name,
            created,
            added = added_titles.len(),
            "Synchronized sheet"
        );

        if created || !added_titles.is_empty() {
            summary.changes.push(SheetChange {
                sheet: period.name.clone(),
                created,
                added_titles,
            });
        }
    }

    info!(
        created_store,
        changed_sheets = summary.changes.len(),
        added_titles = summary.added_title_count(),
        "Store synchronized"
    );

    SyncOutcome { store, summary }
}
