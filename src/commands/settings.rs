// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::config::{self, Setting};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SettingRow {
    pub key: &'static str,
    pub value: Option<String>,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let setting = Setting::from_key(required(sub, "key")?)?;
            println!("{}", config::get(conn, setting)?.unwrap_or_default());
        }
        Some(("set", sub)) => {
            let setting = Setting::from_key(required(sub, "key")?)?;
            if setting == Setting::CurrentUser {
                bail!("Use `user login` to change the active user");
            }
            let value = required(sub, "value")?;
            config::set(conn, setting, value)?;
            println!("{} = {}", setting.key(), value.trim());
        }
        Some(("list", sub)) => {
            let data = list_rows(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|r| vec![r.key.to_string(), r.value.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn list_rows(conn: &Connection) -> Result<Vec<SettingRow>> {
    Setting::ALL
        .into_iter()
        .map(|s| {
            Ok(SettingRow {
                key: s.key(),
                value: config::get(conn, s)?,
            })
        })
        .collect()
}
