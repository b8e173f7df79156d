// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::month::Month;
use crate::progress::clamped_percentage;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthContext {
    /// Linear projection of month-end spend.
    pub forecast: i64,
    /// Remaining budget per remaining day.
    pub per_day: i64,
    pub progress_pct: i64,
    pub days_in_month: i64,
    pub days_left: i64,
}

/// Day index of `reference` inside `month`: 1 before the month starts,
/// `days_in_month` once it is over.
pub fn days_elapsed(month: Month, reference: NaiveDate) -> i64 {
    let dim = month.days_in_month() as i64;
    let idx = (reference - month.first_day()).num_days() + 1;
    idx.clamp(1, dim)
}

pub fn month_context(budget: i64, spent: i64, month: Month, reference: NaiveDate) -> MonthContext {
    let days_in_month = month.days_in_month() as i64;
    let elapsed = days_elapsed(month, reference);
    let days_left = (days_in_month - elapsed).max(1);
    let forecast = spent.saturating_mul(days_in_month) / elapsed;
    let per_day = budget.saturating_sub(spent).max(0) / days_left;
    if budget <= 0 {
        debug!(%month, spent, "no budget set; progress reported as 0");
    }
    MonthContext {
        forecast,
        per_day,
        progress_pct: clamped_percentage(spent, budget),
        days_in_month,
        days_left,
    }
}
