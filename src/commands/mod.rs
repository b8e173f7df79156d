// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod recurring;
pub mod reports;
pub mod settings;
pub mod tenants;
pub mod transactions;
pub mod users;

use crate::config::{self, Setting};
use crate::models::SubCategory;
use crate::month::Month;
use crate::store;
use crate::utils::{parse_month, today};
use anyhow::{Context, Result};
use rusqlite::Connection;

/// Value of a required argument.
pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.as_str())
        .with_context(|| format!("Missing required argument '{}'", name))
}

/// `--month`, or the current month when absent.
pub(crate) fn month_or_current(m: &clap::ArgMatches) -> Result<Month> {
    match m.get_one::<String>("month") {
        Some(s) => Ok(parse_month(s)?),
        None => Ok(Month::of(today())),
    }
}

/// Resolve `--main`/`--sub` names; the main category defaults to the
/// configured daily category.
pub(crate) fn resolve_sub(
    conn: &Connection,
    tenant_id: i64,
    main: Option<&String>,
    sub: &str,
) -> Result<SubCategory> {
    let main = match main {
        Some(m) => m.clone(),
        None => config::get_or_default(conn, Setting::DailyCategory)?,
    };
    Ok(store::sub_category_by_name(conn, tenant_id, &main, sub)?)
}
