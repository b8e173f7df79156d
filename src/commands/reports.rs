// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::month_or_current;
use crate::aggregate::{
    GiftBalance, MonthlySummary, budget_and_spent_of_month, gift_summary, monthly_summary,
    months_with_data, oldest_month,
};
use crate::auth;
use crate::config::{self, Setting};
use crate::forecast::{MonthContext, month_context};
use crate::insights::{InsightCard, InsightOptions, build_insight_cards};
use crate::month::Month;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("context", sub)) => context(conn, sub)?,
        Some(("insights", sub)) => insights(conn, sub)?,
        Some(("gifts", sub)) => gifts(conn, sub)?,
        Some(("months", sub)) => months(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn symbol(conn: &Connection) -> Result<String> {
    config::get_or_default(conn, Setting::CurrencySymbol)
}

pub fn summary_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<MonthlySummary>> {
    let tenant = auth::current_tenant(conn)?;
    let from = sub.get_one::<String>("from").map(|s| parse_month(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_month(s)).transpose()?;
    Ok(monthly_summary(conn, tenant, from, to)?)
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = summary_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let sym = symbol(conn)?;
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.month.to_string(),
                    fmt_money(s.income, &sym),
                    fmt_money(s.expense, &sym),
                    fmt_money(s.budget, &sym),
                    fmt_money(s.net, &sym),
                    fmt_money(s.cumulative, &sym),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Expense", "Budget", "Net", "Balance"],
                rows
            )
        );
    }
    Ok(())
}

/// Forecast for `month` of the everyday category as of `reference`.
pub fn context_for(conn: &Connection, month: Month, reference: NaiveDate) -> Result<MonthContext> {
    let tenant = auth::current_tenant(conn)?;
    let daily = config::get_or_default(conn, Setting::DailyCategory)?;
    let sums = budget_and_spent_of_month(conn, tenant, &daily, month)?;
    Ok(month_context(
        sums.total_budget(),
        sums.total_spent(),
        month,
        reference,
    ))
}

fn context(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let ctx = context_for(conn, month, today())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ctx)? {
        let sym = symbol(conn)?;
        let rows = vec![
            vec!["Forecast".into(), fmt_money(ctx.forecast, &sym)],
            vec!["Per day".into(), fmt_money(ctx.per_day, &sym)],
            vec!["Progress".into(), format!("{}%", ctx.progress_pct)],
            vec!["Days in month".into(), ctx.days_in_month.to_string()],
            vec!["Days left".into(), ctx.days_left.to_string()],
        ];
        println!("Month context for {}", month);
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}

pub fn insight_cards(conn: &Connection, month: Month) -> Result<Vec<InsightCard>> {
    let tenant = auth::current_tenant(conn)?;
    let opts = InsightOptions {
        threshold: config::insight_threshold(conn)?,
        currency_symbol: symbol(conn)?,
    };
    Ok(build_insight_cards(conn, tenant, month, &opts)?)
}

fn insights(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cards = insight_cards(conn, month_or_current(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cards)? {
        if cards.is_empty() {
            println!("No notable changes");
        }
        for c in &cards {
            println!("{}", c.text);
        }
    }
    Ok(())
}

pub fn gift_rows(conn: &Connection) -> Result<Vec<GiftBalance>> {
    let tenant = auth::current_tenant(conn)?;
    let gift = config::get_or_default(conn, Setting::GiftCategory)?;
    Ok(gift_summary(conn, tenant, &gift)?)
}

fn gifts(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = gift_rows(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let sym = symbol(conn)?;
        let rows = data
            .iter()
            .map(|g| {
                vec![
                    g.detail.clone(),
                    fmt_money(g.gift_amount, &sym),
                    fmt_money(g.return_amount, &sym),
                    format!("{}%", g.percentage),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Gift", "Received", "Returned", "Returned %"], rows)
        );
    }
    Ok(())
}

fn months(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    let data = months_with_data(conn, tenant)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data.iter().map(|m| vec![m.to_string()]).collect();
        println!("{}", pretty_table(&["Month"], rows));
        if let Some(oldest) = oldest_month(conn, tenant)? {
            println!("Data since {}", oldest);
        }
    }
    Ok(())
}
