// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{required, resolve_sub};
use crate::aggregate::{Activity, others_since_my_last};
use crate::auth;
use crate::config::{self, Setting};
use crate::models::{NewTransaction, Transaction, TransactionPatch, TxType};
use crate::store::{self, TransactionFilter};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, parse_month, pretty_table, today};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("others", sub)) => others(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    let sc = resolve_sub(conn, tenant, sub.get_one::<String>("main"), required(sub, "sub")?)?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let r#type: TxType = required(sub, "type")?.parse()?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let detail = sub.get_one::<String>("detail").cloned().unwrap_or_default();
    let created_by = auth::current_user(conn)?.map(|u| u.username);

    let id = store::insert_transaction(
        conn,
        tenant,
        &NewTransaction {
            sub_category_id: sc.id,
            amount,
            r#type,
            date,
            detail,
            created_by,
        },
    )?;
    let symbol = config::get_or_default(conn, Setting::CurrencySymbol)?;
    println!(
        "Recorded #{} {} {} on {} ({} / {})",
        id,
        r#type,
        fmt_money(amount, &symbol),
        date,
        sc.main_category_name,
        sc.name
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (data, total) = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.main_category.clone(),
                    t.sub_category.clone(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.detail.clone(),
                    t.created_by.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Main", "Sub", "Type", "Amount", "Detail", "By"],
                rows,
            )
        );
        println!("{} of {} rows", data.len(), total);
    }
    Ok(())
}

/// Rows matching the `tx list` flags, newest first, with the unpaged count.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Vec<Transaction>, i64)> {
    let tenant = auth::current_tenant(conn)?;
    let mut filter = TransactionFilter {
        query: sub.get_one::<String>("query").cloned(),
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied(),
        ..Default::default()
    };
    if let Some(month) = sub.get_one::<String>("month") {
        let month = parse_month(month)?;
        filter.start = Some(month.first_day());
        filter.end = Some(month.last_day());
    }
    if let Some(from) = sub.get_one::<String>("from") {
        filter.start = Some(parse_date(from)?);
    }
    if let Some(to) = sub.get_one::<String>("to") {
        filter.end = Some(parse_date(to)?);
    }
    match (sub.get_one::<String>("main"), sub.get_one::<String>("sub")) {
        (main, Some(name)) => filter.sub_category_id = Some(resolve_sub(conn, tenant, main, name)?.id),
        (Some(main), None) => {
            filter.main_category_id = Some(store::main_category_by_name(conn, tenant, main)?.id)
        }
        (None, None) => {}
    }
    Ok(store::list_transactions(conn, tenant, &filter)?)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    let mut patch = TransactionPatch {
        detail: sub.get_one::<String>("detail").cloned(),
        ..Default::default()
    };
    if let Some(a) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_amount(a)?);
    }
    if let Some(t) = sub.get_one::<String>("type") {
        patch.r#type = Some(t.parse()?);
    }
    if let Some(d) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(d)?);
    }
    if let Some(name) = sub.get_one::<String>("sub") {
        patch.sub_category_id = Some(resolve_sub(conn, tenant, sub.get_one::<String>("main"), name)?.id);
    }
    store::update_transaction(conn, tenant, id, &patch)?;
    println!("Updated transaction #{}", id);
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing transaction id"))?;
    store::delete_transaction(conn, tenant, id)?;
    println!("Removed transaction #{}", id);
    Ok(())
}

/// Entries by others since the active user's latest entry.
pub fn others_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Activity> {
    let me = auth::current_user(conn)?.ok_or_else(|| anyhow!("Not logged in; run `user login`"))?;
    let month = sub.get_one::<String>("month").map(|s| parse_month(s)).transpose()?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(5);
    Ok(others_since_my_last(conn, me.tenant_id, &me.username, month, limit)?)
}

fn others(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let activity = others_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &activity.items)? {
        let symbol = config::get_or_default(conn, Setting::CurrencySymbol)?;
        let rows: Vec<Vec<String>> = activity
            .items
            .iter()
            .map(|e| {
                vec![
                    e.date.to_string(),
                    e.author.clone().unwrap_or_else(|| "-".into()),
                    e.sub_category.clone(),
                    fmt_money(e.amount, &symbol),
                    e.detail.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "By", "Category", "Amount", "Detail"], rows)
        );
    }
    Ok(())
}
