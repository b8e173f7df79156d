// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth;
use crate::store::{self, TransactionFilter};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

/// Column order shared with `import transactions`.
pub const COLUMNS: [&str; 6] = ["date", "main_category", "sub_category", "type", "amount", "detail"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let tenant = auth::current_tenant(conn)?;
    let (mut rows, _) = store::list_transactions(conn, tenant, &TransactionFilter::default())?;
    // Oldest first, the order they were entered in.
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(COLUMNS)?;
            for t in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    t.main_category.clone(),
                    t.sub_category.clone(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.detail.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|t| {
                    json!({
                        "date": t.date, "main_category": t.main_category,
                        "sub_category": t.sub_category, "type": t.r#type,
                        "amount": t.amount, "detail": t.detail
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    info!(tenant, rows = rows.len(), out, "exported transactions");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
