// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{RecurringEntry, is_due, latest_recurring, unentered_recurring};
use crate::auth;
use crate::config::{self, Setting};
use crate::models::NewTransaction;
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table, today};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("due", sub)) => due(conn, sub)?,
        Some(("fill", sub)) => fill(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn reference_date(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(d) => Ok(parse_date(d)?),
        None => Ok(today()),
    }
}

pub fn due_rows(conn: &Connection, on: NaiveDate) -> Result<Vec<RecurringEntry>> {
    let tenant = auth::current_tenant(conn)?;
    let periodic = config::get_or_default(conn, Setting::PeriodicCategory)?;
    Ok(unentered_recurring(conn, tenant, &periodic, on)?)
}

fn due(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = due_rows(conn, reference_date(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = config::get_or_default(conn, Setting::CurrencySymbol)?;
        let rows = data
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.last_date.to_string(),
                    e.sub_category.clone(),
                    e.detail.clone(),
                    fmt_money(e.amount, &symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Last entered", "Category", "Detail", "Amount"], rows)
        );
    }
    Ok(())
}

/// Copy a due recurring entry to `date` (default today), optionally with a
/// new amount. Returns the new transaction id.
pub fn fill_entry(
    conn: &Connection,
    id: i64,
    date: NaiveDate,
    amount: Option<i64>,
) -> Result<i64> {
    let tenant = auth::current_tenant(conn)?;
    let periodic = config::get_or_default(conn, Setting::PeriodicCategory)?;
    let entry = latest_recurring(conn, tenant, &periodic)?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("#{} is not the latest entry of a recurring bill", id))?;
    if !is_due(&entry, date) {
        bail!("'{}' is not due on {}", entry.detail, date);
    }
    let new_id = store::insert_transaction(
        conn,
        tenant,
        &NewTransaction {
            sub_category_id: entry.sub_category_id,
            amount: amount.unwrap_or(entry.amount),
            r#type: entry.r#type,
            date,
            detail: entry.detail.clone(),
            created_by: auth::current_user(conn)?.map(|u| u.username),
        },
    )?;
    Ok(new_id)
}

fn fill(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    let date = reference_date(sub)?;
    let amount = sub
        .get_one::<String>("amount")
        .map(|a| parse_amount(a))
        .transpose()?;
    let new_id = fill_entry(conn, id, date, amount)?;
    println!("Recorded #{} from recurring #{} on {}", new_id, id, date);
    Ok(())
}
