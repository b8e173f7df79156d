// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration.
//!
//! Where the database lives comes from the environment (`KAKEIBO_DB`,
//! `KAKEIBO_DATA_DIR`, `--db`). Everything the user tunes after that is a
//! row in the `settings` table, addressed through the fixed [`Setting`] keys.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "KAKEIBO_DATA_DIR";
pub const ENV_DB: &str = "KAKEIBO_DB";
pub const ENV_BUSY_TIMEOUT_MS: &str = "KAKEIBO_BUSY_TIMEOUT_MS";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
const DB_FILE: &str = "kakeibo.sqlite";

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Kakeibo", "kakeibo"));

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
}

impl Config {
    /// Resolve the configuration. `db_override` is the `--db` flag.
    pub fn load(db_override: Option<&str>) -> Result<Self> {
        let db_path = match db_override {
            Some(p) => PathBuf::from(p),
            None => match std::env::var(ENV_DB) {
                Ok(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
                _ => data_dir()?.join(DB_FILE),
            },
        };
        let busy_timeout = match std::env::var(ENV_BUSY_TIMEOUT_MS) {
            Ok(v) => {
                let ms: u64 = v
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {} '{}'", ENV_BUSY_TIMEOUT_MS, v))?;
                Duration::from_millis(ms)
            }
            Err(_) => Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        };
        Ok(Self {
            db_path,
            busy_timeout,
        })
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

/// Keys of the `settings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    DailyCategory,
    PeriodicCategory,
    GiftCategory,
    InsightThreshold,
    CurrencySymbol,
    CurrentUser,
}

impl Setting {
    pub const ALL: [Setting; 6] = [
        Setting::DailyCategory,
        Setting::PeriodicCategory,
        Setting::GiftCategory,
        Setting::InsightThreshold,
        Setting::CurrencySymbol,
        Setting::CurrentUser,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Setting::DailyCategory => "daily_category",
            Setting::PeriodicCategory => "periodic_category",
            Setting::GiftCategory => "gift_category",
            Setting::InsightThreshold => "insight_threshold",
            Setting::CurrencySymbol => "currency_symbol",
            Setting::CurrentUser => "current_user",
        }
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            Setting::DailyCategory => Some("Daily"),
            Setting::PeriodicCategory => Some("Periodic"),
            Setting::GiftCategory => Some("Gifts"),
            Setting::InsightThreshold => Some("10"),
            Setting::CurrencySymbol => Some("¥"),
            Setting::CurrentUser => None,
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Setting::ALL
            .into_iter()
            .find(|s| s.key() == key.trim())
            .ok_or_else(|| anyhow!("Unknown setting '{}'", key))
    }
}

pub fn get(conn: &Connection, setting: Setting) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![setting.key()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.or_else(|| setting.default_value().map(str::to_string)))
}

pub fn get_or_default(conn: &Connection, setting: Setting) -> Result<String> {
    Ok(get(conn, setting)?.unwrap_or_default())
}

pub fn set(conn: &Connection, setting: Setting, value: &str) -> Result<()> {
    if setting == Setting::InsightThreshold {
        value
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid insight threshold '{}'", value))?;
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![setting.key(), value.trim()],
    )?;
    Ok(())
}

pub fn clear(conn: &Connection, setting: Setting) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![setting.key()])?;
    Ok(())
}

pub fn insight_threshold(conn: &Connection) -> Result<i64> {
    let raw = get_or_default(conn, Setting::InsightThreshold)?;
    raw.parse::<i64>()
        .with_context(|| format!("Invalid insight threshold '{}' in settings", raw))
}
