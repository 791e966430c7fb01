use crate::parser::Curriculum;
use crate::rollup::types::{TitleIndex, UnitId, UnitResult, WeightedSum};
use crate::store::GradeStore;
use tracing::debug;

/// Collects every numeric grade in the store under its row title.
///
/// All sheets share one index, so a title present in several sheets pools
/// its grades. Titles without numeric grades map to an empty list.
pub fn build_title_index(store: &GradeStore) -> TitleIndex {
    let mut index = TitleIndex::new();

    for (_, records) in store.all_records() {
        for record in records {
            index.entry(record.title).or_default().extend(record.grades);
        }
    }

    index
}

/// Computes one credit-weighted average per teaching unit.
///
/// Each grade recorded under a member title adds one term at the member's
/// coefficient. Units whose coefficients sum to exactly zero, including units
/// with no matched subject, are left out. Results follow curriculum order.
pub fn compute_rollups(curriculum: &Curriculum, store: &GradeStore) -> Vec<UnitResult> {
    let index = build_title_index(store);
    rollup_with_index(curriculum, &index)
}

/// Same as [`compute_rollups`], over a prebuilt [`TitleIndex`].
pub fn rollup_with_index(curriculum: &Curriculum, index: &TitleIndex) -> Vec<UnitResult> {
    let mut results = Vec::new();

    for period in &curriculum.periods {
        for unit in &period.units {
            let mut sum = WeightedSum::default();

            for member in &unit.members {
                let Some(grades) = index.get(&member.title) else {
                    continue;
                };
                for &grade in grades {
                    sum.add(member.coefficient, grade);
                }
            }

            let id = UnitId::new(&period.name, &unit.name);
            match sum.average() {
                Some(average) => results.push(UnitResult { unit: id, average }),
                None => debug!(unit = %id, "Unit has no weighted grades, skipping"),
            }
        }
    }

    results
}
