// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth;
use crate::store::{self, PUBLIC_TENANT};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => {
            let code = required(sub, "code")?;
            let label = sub.get_one::<String>("label").map(String::as_str).unwrap_or(code);
            let id = store::create_tenant(conn, code, label)?;
            println!("Created aikotoba '{}' (#{})", code, id);
        }
        Some(("join", sub)) => {
            let code = required(sub, "code")?;
            join(conn, code)?;
            println!("Joined aikotoba '{}'", code.trim());
        }
        Some(("leave", _)) => {
            leave(conn)?;
            println!("Back in the {} ledger", PUBLIC_TENANT);
        }
        Some(("current", _)) => {
            let t = store::tenant_by_id(conn, auth::current_tenant(conn)?)?;
            println!("{} ({})", t.code, t.label);
        }
        Some(("list", sub)) => {
            let data = store::list_tenants(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            t.code,
                            t.label,
                            if t.active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Code", "Label", "Active"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Move the logged-in user into the aikotoba with `code`.
pub fn join(conn: &Connection, code: &str) -> Result<()> {
    let user = auth::current_user(conn)?.ok_or_else(|| anyhow!("Not logged in; run `user login`"))?;
    let tenant = store::tenant_by_code(conn, code)?;
    if !tenant.active {
        bail!("Aikotoba '{}' is not active", tenant.code);
    }
    store::set_user_tenant(conn, &user.username, tenant.id)?;
    Ok(())
}

pub fn leave(conn: &Connection) -> Result<()> {
    let user = auth::current_user(conn)?.ok_or_else(|| anyhow!("Not logged in; run `user login`"))?;
    store::set_user_tenant(conn, &user.username, store::public_tenant_id(conn)?)?;
    Ok(())
}
