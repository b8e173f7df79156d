// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth;
use crate::models::{NewTransaction, TxType};
use crate::store;
use crate::utils::{parse_amount, parse_date};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::collections::{HashMap, hash_map::Entry};
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?.trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tenant = auth::current_tenant(conn)?;
    let created_by = auth::current_user(conn)?.map(|u| u.username);

    // Every row lands or none do.
    let tx = conn.transaction()?;
    let mut category_cache: HashMap<(String, String), i64> = HashMap::new();
    let mut count = 0usize;

    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?;
        let main = rec.get(1).context("main_category missing")?;
        let sub_name = rec.get(2).context("sub_category missing")?;
        let type_raw = rec.get(3).context("type missing")?;
        let amount_raw = rec.get(4).context("amount missing")?;
        let detail = rec.get(5).unwrap_or("").to_string();

        let date = parse_date(date_raw)
            .with_context(|| format!("Line {}: invalid transaction date '{}'", line, date_raw))?;
        let r#type: TxType = type_raw
            .parse()
            .with_context(|| format!("Line {}: unknown type '{}'", line, type_raw))?;
        let amount = parse_amount(amount_raw)
            .with_context(|| format!("Line {}: invalid amount '{}'", line, amount_raw))?;

        let sub_category_id = match category_cache.entry((main.to_string(), sub_name.to_string())) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let sc = store::sub_category_by_name(&tx, tenant, main, sub_name)
                    .with_context(|| format!("Line {}", line))?;
                *entry.insert(sc.id)
            }
        };

        store::insert_transaction(
            &tx,
            tenant,
            &NewTransaction {
                sub_category_id,
                amount,
                r#type,
                date,
                detail,
                created_by: created_by.clone(),
            },
        )?;
        count += 1;
    }
    tx.commit()?;
    info!(tenant, count, path, "imported transactions");
    println!("Imported {} transactions from {}", count, path);
    Ok(())
}
