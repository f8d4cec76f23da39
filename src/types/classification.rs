//! Threshold-based classification buckets
//!
//! Every histogram in the evaluator (gas size, coverage, accuracy ratio) is an
//! ascending threshold list. Bucket semantics: `[previous, threshold)` -
//! inclusive lower bound, exclusive upper bound. A value at or above the last
//! threshold lands in the explicit overflow class, which sits one slot past the
//! last threshold so every class index is a valid array position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gas-size classes (gas units)
pub const GAS_CLASSES: &[f64] = &[
    2_500.0,
    5_000.0,
    10_000.0,
    20_000.0,
    50_000.0,
    100_000.0,
    500_000.0,
    1_000_000.0,
];

/// Coverage classes (percent of instructions covered)
pub const COVERAGE_CLASSES: &[f64] = &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];

/// Accuracy-ratio classes (estimate / concrete)
pub const ACCURACY_CLASSES: &[f64] = &[0.5, 0.8, 0.9, 1.0, 1.1, 1.2, 1.5, 1.75, 3.0, 7.0];

/// Position of a value within a threshold list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketClass {
    /// Index of the first threshold strictly greater than the value
    Within(usize),
    /// Value is not below any threshold
    Overflow,
}

/// Ascending thresholds defining a set of classes
#[derive(Debug, Clone, Copy)]
pub struct ClassBuckets {
    thresholds: &'static [f64],
}

impl ClassBuckets {
    pub const fn new(thresholds: &'static [f64]) -> Self {
        Self { thresholds }
    }

    pub const fn gas() -> Self {
        Self::new(GAS_CLASSES)
    }

    pub const fn coverage() -> Self {
        Self::new(COVERAGE_CLASSES)
    }

    pub const fn accuracy() -> Self {
        Self::new(ACCURACY_CLASSES)
    }

    pub fn thresholds(&self) -> &'static [f64] {
        self.thresholds
    }

    /// Number of classes including the overflow class
    pub fn class_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Classify a value
    pub fn classify(&self, value: f64) -> BucketClass {
        match self.thresholds.iter().position(|&t| t > value) {
            Some(index) => BucketClass::Within(index),
            None => BucketClass::Overflow,
        }
    }

    /// Array slot for a value; overflow maps to `thresholds.len()`
    pub fn index_of(&self, value: f64) -> usize {
        self.slot(self.classify(value))
    }

    pub fn slot(&self, class: BucketClass) -> usize {
        match class {
            BucketClass::Within(index) => index,
            BucketClass::Overflow => self.thresholds.len(),
        }
    }

    /// One empty accumulator per class, overflow last
    pub fn empty_slots<T: Default>(&self) -> Vec<T> {
        (0..self.class_count()).map(|_| T::default()).collect()
    }
}

/// Quantity a sample is classified by when assigning gas classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasClassBasis {
    /// Concrete gas used on-chain (independent of estimator error)
    #[default]
    Observed,
    /// The estimator's figure for the called function
    Estimated,
}

impl GasClassBasis {
    pub fn pick(&self, observed: u64, estimated: u64) -> u64 {
        match self {
            GasClassBasis::Observed => observed,
            GasClassBasis::Estimated => estimated,
        }
    }
}

impl fmt::Display for GasClassBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasClassBasis::Observed => write!(f, "observed"),
            GasClassBasis::Estimated => write!(f, "estimated"),
        }
    }
}

/// Label for a gas class slot, e.g. `2K - 5K GAS`
pub fn gas_class_label(slot: usize) -> String {
    let k = |i: usize| (GAS_CLASSES[i] as u64) / 1000;
    if slot == 0 {
        format!("0 - {}K GAS", k(0))
    } else if slot < GAS_CLASSES.len() {
        format!("{}K - {}K GAS", k(slot - 1), k(slot))
    } else {
        format!(">{}K GAS", k(GAS_CLASSES.len() - 1))
    }
}

/// Label for a coverage class slot, e.g. `10% - 20%`
pub fn coverage_class_label(slot: usize) -> String {
    let pct = |i: usize| COVERAGE_CLASSES[i] as u64;
    if slot == 0 {
        format!("0% - {}%", pct(0))
    } else if slot < COVERAGE_CLASSES.len() {
        format!("{}% - {}%", pct(slot - 1), pct(slot))
    } else {
        format!(">{}%", pct(COVERAGE_CLASSES.len() - 1))
    }
}

/// Label for an accuracy class slot, e.g. `90% - 100%`
pub fn accuracy_class_label(slot: usize) -> String {
    let pct = |i: usize| (ACCURACY_CLASSES[i] * 100.0).round() as u64;
    if slot == 0 {
        format!("<{}%", pct(0))
    } else if slot < ACCURACY_CLASSES.len() {
        format!("{}% - {}%", pct(slot - 1), pct(slot))
    } else {
        format!(">{}%", pct(ACCURACY_CLASSES.len() - 1))
    }
}
