// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{month_or_current, required, resolve_sub};
use crate::aggregate::budget_and_spent_of_month;
use crate::auth;
use crate::config::{self, Setting};
use crate::month::Month;
use crate::progress::{BudgetProgress, budget_progress, clamped_percentage};
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("progress", sub)) => progress(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    let month = month_or_current(sub)?;
    let sc = resolve_sub(conn, tenant, sub.get_one::<String>("main"), required(sub, "sub")?)?;
    let amount = parse_amount(required(sub, "amount")?)?;
    if amount < 0 {
        bail!("Budget must not be negative");
    }
    let by = auth::current_user(conn)?.map(|u| u.username);
    store::set_budget(conn, tenant, sc.id, month, amount, by.as_deref())?;
    let symbol = config::get_or_default(conn, Setting::CurrencySymbol)?;
    println!(
        "Budget set for {} / {} = {}",
        month,
        sc.name,
        fmt_money(amount, &symbol)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub month: Month,
    pub rows: Vec<BudgetProgress>,
    pub total_spent: i64,
    pub total_budget: i64,
    pub total_percentage: i64,
}

pub fn progress_report(conn: &Connection, month: Month) -> Result<ProgressReport> {
    let tenant = auth::current_tenant(conn)?;
    let daily = config::get_or_default(conn, Setting::DailyCategory)?;
    let sums = budget_and_spent_of_month(conn, tenant, &daily, month)?;
    let total_spent = sums.total_spent();
    let total_budget = sums.total_budget();
    Ok(ProgressReport {
        month,
        rows: budget_progress(&sums),
        total_spent,
        total_budget,
        total_percentage: clamped_percentage(total_spent, total_budget),
    })
}

fn progress(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = progress_report(conn, month_or_current(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report.rows)? {
        let symbol = config::get_or_default(conn, Setting::CurrencySymbol)?;
        let mut rows: Vec<Vec<String>> = report
            .rows
            .iter()
            .map(|p| {
                vec![
                    p.category.clone(),
                    fmt_money(p.spent, &symbol),
                    fmt_money(p.budget, &symbol),
                    format!("{}%", p.percentage),
                ]
            })
            .collect();
        rows.push(vec![
            "Total".into(),
            fmt_money(report.total_spent, &symbol),
            fmt_money(report.total_budget, &symbol),
            format!("{}%", report.total_percentage),
        ]);
        println!("Budget progress for {}", report.month);
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "Budget", "Progress"], rows)
        );
    }
    Ok(())
}
