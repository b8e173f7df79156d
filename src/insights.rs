// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-over-month and year-over-year spending changes per sub-category.
//!
//! Cards are recomputed on every call. Only categories that have spending in
//! the focus month and a non-zero total in the comparison month are
//! compared; everything under the threshold is dropped.

use crate::aggregate::{SubCategoryExpense, expense_by_sub_category};
use crate::error::Result;
use crate::month::Month;
use crate::utils::group_thousands;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_THRESHOLD: i64 = 10;
pub const MAX_CARDS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    PreviousMonth,
    YearAgo,
}

impl Comparison {
    fn label(&self, base: Month, focus: Month) -> String {
        let tag = match self {
            Comparison::PreviousMonth => "MoM",
            Comparison::YearAgo => "YoY",
        };
        format!("{} ({} vs {})", tag, base, focus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightOptions {
    /// Minimum absolute percent change worth a card.
    pub threshold: i64,
    pub currency_symbol: String,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            currency_symbol: "¥".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightCard {
    pub text: String,
    pub category: String,
    pub rate_pct: i64,
    pub diff_amount: i64,
    pub sub_category_id: i64,
    pub comparison: Comparison,
}

/// A card for one category/period pair, or `None` when the previous total
/// is zero or the change stays under the threshold.
pub fn delta_card(
    name: &str,
    cur: i64,
    prev: i64,
    sub_category_id: i64,
    label: &str,
    comparison: Comparison,
    opts: &InsightOptions,
) -> Option<InsightCard> {
    if prev == 0 {
        return None;
    }
    let diff = cur.saturating_sub(prev);
    // Integer division truncates toward zero. Only i64::MIN / -1 fails.
    let rate = diff.saturating_mul(100).checked_div(prev).unwrap_or(i64::MAX);
    if rate.saturating_abs() < opts.threshold {
        return None;
    }
    let sign = if rate > 0 { "+" } else { "" };
    let sign_amt = match diff.signum() {
        1 => "+",
        -1 => "-",
        _ => "",
    };
    let text = format!(
        "{}: {} {}{}% ({}{}{})",
        label,
        name,
        sign,
        rate,
        sign_amt,
        opts.currency_symbol,
        group_thousands(diff)
    );
    Some(InsightCard {
        text,
        category: name.to_string(),
        rate_pct: rate,
        diff_amount: diff,
        sub_category_id,
        comparison,
    })
}

/// Pure part of [`build_insight_cards`]: compare the focus month totals
/// against the previous month and the same month last year.
pub fn compare_totals(
    focus: Month,
    current: &BTreeMap<i64, SubCategoryExpense>,
    previous: &BTreeMap<i64, SubCategoryExpense>,
    year_ago: &BTreeMap<i64, SubCategoryExpense>,
    opts: &InsightOptions,
) -> Vec<InsightCard> {
    let mom = Comparison::PreviousMonth.label(focus.prev(), focus);
    let yoy = Comparison::YearAgo.label(focus.year_ago(), focus);

    let mut cards = Vec::new();
    for (sid, cur) in current {
        let pairs = [
            (previous, Comparison::PreviousMonth, &mom),
            (year_ago, Comparison::YearAgo, &yoy),
        ];
        for (base, comparison, label) in pairs {
            let Some(prev) = base.get(sid) else {
                continue;
            };
            if let Some(card) =
                delta_card(&cur.name, cur.total, prev.total, *sid, label, comparison, opts)
            {
                cards.push(card);
            }
        }
    }
    rank_cards(cards)
}

/// Largest absolute currency change first, at most [`MAX_CARDS`].
pub fn rank_cards(mut cards: Vec<InsightCard>) -> Vec<InsightCard> {
    cards.sort_by(|a, b| b.diff_amount.unsigned_abs().cmp(&a.diff_amount.unsigned_abs()));
    cards.truncate(MAX_CARDS);
    cards
}

pub fn build_insight_cards(
    conn: &Connection,
    tenant_id: i64,
    focus: Month,
    opts: &InsightOptions,
) -> Result<Vec<InsightCard>> {
    let current = expense_by_sub_category(conn, tenant_id, focus)?;
    let previous = expense_by_sub_category(conn, tenant_id, focus.prev())?;
    let year_ago = expense_by_sub_category(conn, tenant_id, focus.year_ago())?;
    let cards = compare_totals(focus, &current, &previous, &year_ago, opts);
    debug!(%focus, threshold = opts.threshold, cards = cards.len(), "insight cards");
    Ok(cards)
}
