// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::month::Month;
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;

// Optional sign, optional currency symbol, digits with or without
// thousands separators, optional trailing "円".
static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-)?\s*[¥￥$]?\s*([0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)\s*円?$").unwrap()
});

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let t = s.trim();
    if t.len() != 10 {
        return Err(Error::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn parse_month(s: &str) -> Result<Month> {
    s.parse()
}

/// Parse a user-entered amount in minor units. Accepts "1500", "¥1,500",
/// "-300円". Anything else, fractions and stray letters included, is
/// rejected.
pub fn parse_amount(s: &str) -> Result<i64> {
    let invalid = || Error::InvalidAmount(s.to_string());
    let caps = AMOUNT.captures(s.trim()).ok_or_else(invalid)?;
    let digits = caps[2].replace(',', "");
    let value: i64 = digits.parse().map_err(|_| invalid())?;
    Ok(if caps.get(1).is_some() { -value } else { value })
}

/// `1234567` -> `1,234,567`; the sign is not rendered.
pub fn group_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn fmt_money(v: i64, symbol: &str) -> String {
    let sign = if v < 0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_thousands(v))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Print `v` as pretty JSON or as JSON lines when one of the flags is set.
/// Returns false when neither is set and the caller should render a table.
pub fn maybe_print_json<T: serde::Serialize>(
    json: bool,
    jsonl: bool,
    v: &T,
) -> anyhow::Result<bool> {
    if !json && !jsonl {
        return Ok(false);
    }
    let val = serde_json::to_value(v)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&val)?);
        return Ok(true);
    }
    match val {
        serde_json::Value::Array(items) => {
            for item in items {
                println!("{}", item);
            }
        }
        other => println!("{}", other),
    }
    Ok(true)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
