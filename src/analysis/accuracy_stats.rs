//! Accuracy, coverage and gas-class folds

use super::types::{
    AccuracyReport, ClassCount, ClassValueStats, CoverageAccuracyReport, GasClassAccuracyReport,
    ValueStats,
};
use super::OutcomeSet;
use crate::types::classification::{
    accuracy_class_label, coverage_class_label, gas_class_label, ClassBuckets,
};
use crate::types::outcome::EvalResult;

pub struct AccuracyStatsAnalyser;

impl AccuracyStatsAnalyser {
    pub fn analyse_accuracy(outcomes: &OutcomeSet) -> AccuracyReport {
        let buckets = ClassBuckets::accuracy();
        let mut function_counts: Vec<usize> = buckets.empty_slots();
        let mut contract_accuracy = Vec::new();
        let mut coverage = Vec::new();
        let mut functions_total = 0;

        for result in successes(outcomes) {
            contract_accuracy.push(result.summary.mean_percentage());
            if let Some(cov) = result.symexec_result.cov_percentage {
                coverage.push(cov);
            }
            for summary in result.functions.values() {
                function_counts[buckets.index_of(summary.mean)] += 1;
                functions_total += 1;
            }
        }

        AccuracyReport {
            records: outcomes.counts,
            contract_accuracy: ValueStats::from_values(&contract_accuracy),
            coverage: ValueStats::from_values(&coverage),
            function_accuracy: function_counts
                .into_iter()
                .enumerate()
                .map(|(slot, count)| ClassCount {
                    slot,
                    label: accuracy_class_label(slot),
                    count,
                })
                .collect(),
            functions_total,
        }
    }

    pub fn analyse_coverage(outcomes: &OutcomeSet) -> CoverageAccuracyReport {
        let buckets = ClassBuckets::coverage();
        let mut values: Vec<Vec<f64>> = buckets.empty_slots();
        let mut without_coverage = 0;

        for result in successes(outcomes) {
            match result.symexec_result.cov_percentage {
                Some(cov) => values[buckets.index_of(cov)].push(result.summary.mean_percentage()),
                None => without_coverage += 1,
            }
        }

        CoverageAccuracyReport {
            records: outcomes.counts,
            classes: class_stats(values, coverage_class_label),
            without_coverage,
        }
    }

    pub fn analyse_gas_classes(outcomes: &OutcomeSet) -> GasClassAccuracyReport {
        let buckets = ClassBuckets::gas();
        let mut values: Vec<Vec<f64>> = buckets.empty_slots();

        for result in successes(outcomes) {
            for (slot, summary) in &result.gas_class {
                if let Some(class_values) = values.get_mut(*slot) {
                    class_values.push(summary.mean_percentage());
                }
            }
        }

        GasClassAccuracyReport {
            records: outcomes.counts,
            classes: class_stats(values, gas_class_label),
        }
    }
}

fn successes(outcomes: &OutcomeSet) -> impl Iterator<Item = &EvalResult> {
    outcomes
        .records
        .iter()
        .filter_map(|(_, record)| record.eval_result())
}

fn class_stats(values: Vec<Vec<f64>>, label: fn(usize) -> String) -> Vec<ClassValueStats> {
    values
        .into_iter()
        .enumerate()
        .map(|(slot, values)| ClassValueStats {
            slot,
            label: label(slot),
            stats: ValueStats::from_values(&values),
            values,
        })
        .collect()
}
