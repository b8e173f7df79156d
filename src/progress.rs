// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::MonthSums;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub spent: i64,
    pub budget: i64,
    /// 0..=100; the raw amounts above stay unclamped.
    pub percentage: i64,
}

/// `part / whole` as a whole percentage in `0..=100`; 0 when `whole <= 0`.
pub fn clamped_percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part.saturating_mul(100) / whole).clamp(0, 100)
}

/// One row per category that has a budget or spending this month, sorted
/// by name. A category without a budget reports budget 0 and percentage 0.
pub fn budget_progress(sums: &MonthSums) -> Vec<BudgetProgress> {
    let names: BTreeSet<&String> = sums.budget.keys().chain(sums.spent.keys()).collect();
    names
        .into_iter()
        .map(|name| {
            let spent = sums.spent.get(name).copied().unwrap_or(0);
            let budget = sums.budget.get(name).copied().unwrap_or(0);
            BudgetProgress {
                category: name.clone(),
                spent,
                budget,
                percentage: clamped_percentage(spent, budget),
            }
        })
        .collect()
}
