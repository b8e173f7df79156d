// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let tenant = auth::current_tenant(conn)?;
    match m.subcommand() {
        Some(("main", sub)) => main_categories(conn, tenant, sub)?,
        Some(("sub", sub)) => sub_categories(conn, tenant, sub)?,
        _ => {}
    }
    Ok(())
}

fn id_of(m: &clap::ArgMatches) -> Result<i64> {
    m.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("Missing category id"))
}

fn main_categories(conn: &Connection, tenant: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let id = store::add_main_category(conn, tenant, name)?;
            println!("Added main category '{}' (#{})", name, id);
        }
        Some(("list", sub)) => {
            let data = store::list_main_categories(conn, tenant)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Main category"], rows));
            }
        }
        Some(("rename", sub)) => {
            let id = id_of(sub)?;
            let name = required(sub, "name")?;
            store::rename_main_category(conn, tenant, id, name)?;
            println!("Renamed main category #{} to '{}'", id, name);
        }
        _ => {}
    }
    Ok(())
}

fn sub_categories(conn: &Connection, tenant: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let main = store::main_category_by_name(conn, tenant, required(sub, "main")?)?;
            let name = required(sub, "name")?;
            let id = store::add_sub_category(conn, tenant, main.id, name)?;
            println!("Added '{} / {}' (#{})", main.name, name, id);
        }
        Some(("list", sub)) => {
            let main_id = match sub.get_one::<String>("main") {
                Some(name) => Some(store::main_category_by_name(conn, tenant, name)?.id),
                None => None,
            };
            let data = store::list_sub_categories(conn, tenant, main_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.main_category_name, c.name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Main", "Sub"], rows));
            }
        }
        Some(("rename", sub)) => {
            let id = id_of(sub)?;
            let name = required(sub, "name")?;
            store::rename_sub_category(conn, tenant, id, name)?;
            println!("Renamed sub category #{} to '{}'", id, name);
        }
        Some(("move", sub)) => {
            let id = id_of(sub)?;
            let main = store::main_category_by_name(conn, tenant, required(sub, "to")?)?;
            store::move_sub_category(conn, tenant, id, main.id)?;
            println!("Moved sub category #{} under '{}'", id, main.name);
        }
        Some(("rm", sub)) => {
            let id = id_of(sub)?;
            let removed = store::delete_sub_category(conn, tenant, id)?;
            println!(
                "Removed sub category #{} and {} transaction(s)",
                id, removed
            );
        }
        _ => {}
    }
    Ok(())
}
