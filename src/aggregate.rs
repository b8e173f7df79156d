// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Grouped sums over the ledger. All queries filter by tenant and by
//! half-open date ranges.

use crate::error::Result;
use crate::models::TxType;
use crate::month::{Month, add_months, earliest, latest};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub sub_category_id: i64,
    pub name: String,
    pub tx_type: TxType,
    pub total: i64,
}

/// Per sub-category, per type totals of one month inside one main category.
pub fn category_totals(
    conn: &Connection,
    tenant_id: i64,
    main_category: &str,
    month: Month,
) -> Result<Vec<CategoryTotal>> {
    let (start, end) = month.range();
    let mut stmt = conn.prepare_cached(
        "SELECT sc.id, sc.name, t.type, SUM(t.amount)
           FROM transactions t
           JOIN sub_categories sc ON t.sub_category_id=sc.id
           JOIN main_categories mc ON sc.main_category_id=mc.id
          WHERE mc.name=?1 AND t.aikotoba_id=?2 AND t.date>=?3 AND t.date<?4
          GROUP BY sc.id, sc.name, t.type
          ORDER BY sc.id",
    )?;
    let rows = stmt.query_map(params![main_category, tenant_id, start, end], |r| {
        Ok(CategoryTotal {
            sub_category_id: r.get(0)?,
            name: r.get(1)?,
            tx_type: r.get(2)?,
            total: r.get(3)?,
        })
    })?;
    let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(%month, main_category, rows = out.len(), "category totals");
    Ok(out)
}

/// Name-keyed expense and budget sums of a month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthSums {
    pub spent: BTreeMap<String, i64>,
    pub budget: BTreeMap<String, i64>,
}

impl MonthSums {
    pub fn from_totals(rows: &[CategoryTotal]) -> Self {
        let mut sums = MonthSums::default();
        for r in rows {
            let bucket = match r.tx_type {
                TxType::Expense => &mut sums.spent,
                TxType::Budget => &mut sums.budget,
                TxType::Income => continue,
            };
            let slot = bucket.entry(r.name.clone()).or_insert(0);
            *slot = slot.saturating_add(r.total);
        }
        sums
    }

    pub fn total_spent(&self) -> i64 {
        self.spent.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    pub fn total_budget(&self) -> i64 {
        self.budget.values().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

/// Spent and budgeted sums of `month` for the everyday main category.
pub fn budget_and_spent_of_month(
    conn: &Connection,
    tenant_id: i64,
    daily_category: &str,
    month: Month,
) -> Result<MonthSums> {
    let rows = category_totals(conn, tenant_id, daily_category, month)?;
    Ok(MonthSums::from_totals(&rows))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCategoryExpense {
    pub name: String,
    pub total: i64,
}

/// Expense totals of a month keyed by sub-category id, over every main
/// category of the tenant.
pub fn expense_by_sub_category(
    conn: &Connection,
    tenant_id: i64,
    month: Month,
) -> Result<BTreeMap<i64, SubCategoryExpense>> {
    let (start, end) = month.range();
    let mut stmt = conn.prepare_cached(
        "SELECT sc.id, sc.name, COALESCE(SUM(t.amount), 0)
           FROM transactions t
           JOIN sub_categories sc ON t.sub_category_id=sc.id
          WHERE t.type=?1 AND t.aikotoba_id=?2 AND t.date>=?3 AND t.date<?4
          GROUP BY sc.id, sc.name",
    )?;
    let rows = stmt.query_map(params![TxType::Expense, tenant_id, start, end], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            SubCategoryExpense {
                name: r.get(1)?,
                total: r.get(2)?,
            },
        ))
    })?;
    let mut out = BTreeMap::new();
    for row in rows {
        let (id, e) = row?;
        out.insert(id, e);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub month: Month,
    pub income: i64,
    pub expense: i64,
    pub budget: i64,
    pub net: i64,
    pub cumulative: i64,
}

/// Month-by-month income/expense with running net worth. `from` and `to`
/// are inclusive; months without rows are not listed.
pub fn monthly_summary(
    conn: &Connection,
    tenant_id: i64,
    from: Option<Month>,
    to: Option<Month>,
) -> Result<Vec<MonthlySummary>> {
    let start = from.map(|m| m.first_day()).unwrap_or_else(earliest);
    let end = to.map(|m| m.next().first_day()).unwrap_or_else(latest);
    let mut stmt = conn.prepare(
        "SELECT date, type, SUM(amount) FROM transactions
          WHERE aikotoba_id=?1 AND date>=?2 AND date<?3
          GROUP BY date, type",
    )?;
    let rows = stmt.query_map(params![tenant_id, start, end], |r| {
        Ok((
            r.get::<_, NaiveDate>(0)?,
            r.get::<_, TxType>(1)?,
            r.get::<_, i64>(2)?,
        ))
    })?;

    let mut by_month: BTreeMap<Month, (i64, i64, i64)> = BTreeMap::new();
    for row in rows {
        let (date, ty, total) = row?;
        let e = by_month.entry(Month::of(date)).or_insert((0, 0, 0));
        match ty {
            TxType::Income => e.0 = e.0.saturating_add(total),
            TxType::Expense => e.1 = e.1.saturating_add(total),
            TxType::Budget => e.2 = e.2.saturating_add(total),
        }
    }

    let mut cumulative = 0i64;
    let out = by_month
        .into_iter()
        .map(|(month, (income, expense, budget))| {
            let net = income.saturating_sub(expense);
            cumulative = cumulative.saturating_add(net);
            MonthlySummary {
                month,
                income,
                expense,
                budget,
                net,
                cumulative,
            }
        })
        .collect();
    Ok(out)
}

/// Months that have at least one row, newest first.
pub fn months_with_data(conn: &Connection, tenant_id: i64) -> Result<Vec<Month>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT date FROM transactions WHERE aikotoba_id=?1 ORDER BY date DESC")?;
    let rows = stmt.query_map(params![tenant_id], |r| r.get::<_, NaiveDate>(0))?;
    let mut months: Vec<Month> = Vec::new();
    for row in rows {
        let m = Month::of(row?);
        if months.last() != Some(&m) {
            months.push(m);
        }
    }
    Ok(months)
}

pub fn oldest_month(conn: &Connection, tenant_id: i64) -> Result<Option<Month>> {
    let d: Option<NaiveDate> = conn.query_row(
        "SELECT MIN(date) FROM transactions WHERE aikotoba_id=?1",
        params![tenant_id],
        |r| r.get(0),
    )?;
    Ok(d.map(Month::of))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringEntry {
    pub id: i64,
    pub sub_category_id: i64,
    pub sub_category: String,
    pub amount: i64,
    pub r#type: TxType,
    pub last_date: NaiveDate,
    pub detail: String,
}

/// Latest entry of every `detail` filed under the periodic main category.
pub fn latest_recurring(
    conn: &Connection,
    tenant_id: i64,
    periodic_category: &str,
) -> Result<Vec<RecurringEntry>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.sub_category_id, sc.name, t.amount, t.type, t.date, t.detail
           FROM transactions t
           JOIN sub_categories sc ON t.sub_category_id=sc.id
           JOIN main_categories mc ON sc.main_category_id=mc.id
          WHERE mc.name=?1 AND t.aikotoba_id=?2
          ORDER BY t.date DESC, t.id DESC",
    )?;
    let rows = stmt.query_map(params![periodic_category, tenant_id], |r| {
        Ok(RecurringEntry {
            id: r.get(0)?,
            sub_category_id: r.get(1)?,
            sub_category: r.get(2)?,
            amount: r.get(3)?,
            r#type: r.get(4)?,
            last_date: r.get(5)?,
            detail: r.get(6)?,
        })
    })?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        let e = row?;
        if seen.insert(e.detail.clone()) {
            out.push(e);
        }
    }
    Ok(out)
}

/// A recurring entry is due when a month has passed since it was last
/// entered, but not two (after that it is treated as cancelled).
pub fn is_due(entry: &RecurringEntry, today: NaiveDate) -> bool {
    let (Some(one), Some(two)) = (add_months(entry.last_date, 1), add_months(entry.last_date, 2))
    else {
        warn!(date = %entry.last_date, "recurring entry date out of range");
        return false;
    };
    today >= one && today < two && entry.amount > 0
}

pub fn unentered_recurring(
    conn: &Connection,
    tenant_id: i64,
    periodic_category: &str,
    today: NaiveDate,
) -> Result<Vec<RecurringEntry>> {
    let all = latest_recurring(conn, tenant_id, periodic_category)?;
    Ok(all.into_iter().filter(|e| is_due(e, today)).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftBalance {
    pub detail: String,
    pub gift_amount: i64,
    pub return_amount: i64,
    pub percentage: i64,
}

/// Gifts received (income) against return gifts (expense) under the gift
/// sub-category. A return counts toward every gift whose detail it contains.
pub fn gift_summary(conn: &Connection, tenant_id: i64, gift_category: &str) -> Result<Vec<GiftBalance>> {
    let mut stmt = conn.prepare(
        "SELECT t.detail, t.type, SUM(t.amount)
           FROM transactions t
           JOIN sub_categories sc ON t.sub_category_id=sc.id
          WHERE sc.name=?1 AND t.aikotoba_id=?2 AND t.type IN ('income','expense')
          GROUP BY t.detail, t.type
          ORDER BY t.detail",
    )?;
    let rows = stmt.query_map(params![gift_category, tenant_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, TxType>(1)?,
            r.get::<_, i64>(2)?,
        ))
    })?;
    let mut gifts: Vec<(String, i64)> = Vec::new();
    let mut returns: Vec<(String, i64)> = Vec::new();
    for row in rows {
        let (detail, ty, total) = row?;
        match ty {
            TxType::Income => gifts.push((detail, total)),
            _ => returns.push((detail, total)),
        }
    }
    let out = gifts
        .into_iter()
        .map(|(detail, gift_amount)| {
            let return_amount: i64 = returns
                .iter()
                .filter(|(d, _)| d.contains(detail.as_str()))
                .fold(0, |acc, (_, v)| acc.saturating_add(*v));
            let percentage = crate::progress::clamped_percentage(return_amount, gift_amount);
            GiftBalance {
                detail,
                gift_amount,
                return_amount,
                percentage,
            }
        })
        .collect();
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub amount: i64,
    pub detail: String,
    pub date: NaiveDate,
    pub sub_category: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub since_my_id: i64,
    pub month: Option<Month>,
    pub items: Vec<ActivityEntry>,
}

/// Income/expense rows entered by others after the user's latest entry.
/// `month` restricts both the "latest entry" and the result to one month.
pub fn others_since_my_last(
    conn: &Connection,
    tenant_id: i64,
    me: &str,
    month: Option<Month>,
    limit: usize,
) -> Result<Activity> {
    let limit = limit.clamp(1, 20) as i64;
    let (start, end) = month
        .map(|m| m.range())
        .unwrap_or_else(|| (earliest(), latest()));
    let since_my_id: i64 = conn.query_row(
        "SELECT COALESCE(MAX(id), 0) FROM transactions
          WHERE aikotoba_id=?1 AND created_by=?2 AND date>=?3 AND date<?4",
        params![tenant_id, me, start, end],
        |r| r.get(0),
    )?;
    let mut stmt = conn.prepare(
        "SELECT t.id, t.amount, t.detail, t.date, sc.name, t.created_by
           FROM transactions t
           JOIN sub_categories sc ON sc.id=t.sub_category_id
          WHERE t.aikotoba_id=?1
            AND (t.created_by IS NULL OR t.created_by<>?2)
            AND t.id>?3
            AND t.type IN ('income','expense')
            AND t.date>=?4 AND t.date<?5
          ORDER BY t.id DESC
          LIMIT ?6",
    )?;
    let rows = stmt.query_map(params![tenant_id, me, since_my_id, start, end, limit], |r| {
        Ok(ActivityEntry {
            id: r.get(0)?,
            amount: r.get(1)?,
            detail: r.get(2)?,
            date: r.get(3)?,
            sub_category: r.get(4)?,
            author: r.get(5)?,
        })
    })?;
    Ok(Activity {
        since_my_id,
        month,
        items: rows.collect::<rusqlite::Result<Vec<_>>>()?,
    })
}
