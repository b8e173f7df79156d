// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use tracing::{debug, info};

/// Schema migrations, applied in order. The index + 1 is the
/// `PRAGMA user_version` reached after the step runs.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS aikotoba(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        label TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        aikotoba_id INTEGER NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(aikotoba_id) REFERENCES aikotoba(id)
    );

    CREATE TABLE IF NOT EXISTS main_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        aikotoba_id INTEGER NOT NULL,
        UNIQUE(aikotoba_id, name),
        FOREIGN KEY(aikotoba_id) REFERENCES aikotoba(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS sub_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        main_category_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        aikotoba_id INTEGER NOT NULL,
        FOREIGN KEY(main_category_id) REFERENCES main_categories(id) ON DELETE CASCADE,
        FOREIGN KEY(aikotoba_id) REFERENCES aikotoba(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sub_category_id INTEGER NOT NULL,
        amount INTEGER NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('expense','income','budget')),
        date TEXT NOT NULL CHECK(date IS strftime('%Y-%m-%d', date)),
        detail TEXT NOT NULL DEFAULT '',
        aikotoba_id INTEGER NOT NULL,
        created_by TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(sub_category_id) REFERENCES sub_categories(id),
        FOREIGN KEY(aikotoba_id) REFERENCES aikotoba(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_sub ON transactions(sub_category_id);

    INSERT OR IGNORE INTO aikotoba(code, label) VALUES('public', 'Public');
    INSERT OR IGNORE INTO main_categories(name, aikotoba_id)
        SELECT n.name, a.id
          FROM aikotoba a,
               (SELECT 'Daily' AS name UNION ALL SELECT 'Periodic'
                UNION ALL SELECT 'Special' UNION ALL SELECT 'Travel') n
         WHERE a.code = 'public';
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_tenant_date ON transactions(aikotoba_id, date);
    CREATE INDEX IF NOT EXISTS idx_sub_categories_main ON sub_categories(main_category_id);
    "#,
    // Older ledgers may hold duplicate sub-category names; the later ones
    // get their id appended before the unique index goes on.
    r#"
    UPDATE sub_categories SET name = name || ' #' || id
     WHERE id NOT IN (SELECT MIN(id) FROM sub_categories GROUP BY main_category_id, name);
    CREATE UNIQUE INDEX IF NOT EXISTS idx_sub_categories_main_name
        ON sub_categories(main_category_id, name);
    "#,
];

pub fn schema_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn open(config: &Config) -> Result<Connection> {
    let path = &config.db_path;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create data dir")?;
        }
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(config.busy_timeout)?;
    init_schema(&mut conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= current {
            continue;
        }
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("Schema migration {} failed", version))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(version, "applied schema migration");
    }
    Ok(())
}
