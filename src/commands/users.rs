// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth;
use crate::store;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let username = required(sub, "username")?;
            auth::register(conn, username, required(sub, "password")?)?;
            println!("Added user '{}'", username.trim());
        }
        Some(("login", sub)) => {
            let user = auth::login(conn, required(sub, "username")?, required(sub, "password")?)?;
            println!("Logged in as {}", user.username);
        }
        Some(("logout", _)) => {
            auth::logout(conn)?;
            println!("Logged out");
        }
        Some(("whoami", _)) => match auth::current_user(conn)? {
            Some(u) => {
                let t = store::tenant_by_id(conn, u.tenant_id)?;
                println!("{} (aikotoba: {})", u.username, t.code);
            }
            None => println!("Not logged in"),
        },
        _ => {}
    }
    Ok(())
}
