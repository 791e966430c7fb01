//! Data types used by the rollup pipeline.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Grades recorded under each subject title, across every store sheet.
pub type TitleIndex = HashMap<String, Vec<f64>>;

/// Identifies a teaching unit: its period sheet and its marker text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnitId {
    pub period: String,
    pub unit: String,
}

impl UnitId {
    pub fn new(period: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period, self.unit)
    }
}

/// Weighted average of one unit. Not rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitResult {
    pub unit: UnitId,
    pub average: f64,
}

/// Running numerator and denominator of a credit-weighted average.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedSum {
    numerator: f64,
    denominator: f64,
}

impl WeightedSum {
    pub fn add(&mut self, coefficient: f64, grade: f64) {
        self.numerator += coefficient * grade;
        self.denominator += coefficient;
    }

    /// The weighted average, or `None` while the denominator is exactly zero.
    pub fn average(&self) -> Option<f64> {
        if self.denominator == 0.0 {
            None
        } else {
            Some(self.numerator / self.denominator)
        }
    }
}
