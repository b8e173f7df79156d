// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Data access for tenants, users, categories and transactions.
//!
//! Every function takes the connection and the tenant id explicitly; rows of
//! another tenant are reported as [`Error::TenantMismatch`] rather than
//! silently touched.

use crate::error::{Error, Result};
use crate::models::{
    MainCategory, NewTransaction, SubCategory, Tenant, Transaction, TransactionPatch, TxType, User,
};
use crate::month::Month;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

pub const PUBLIC_TENANT: &str = "public";
pub const DEFAULT_MAIN_CATEGORIES: [&str; 4] = ["Daily", "Periodic", "Special", "Travel"];

// ---------------------------------------------------------------------------
// Tenants

fn tenant_from_row(r: &Row<'_>) -> rusqlite::Result<Tenant> {
    Ok(Tenant {
        id: r.get(0)?,
        code: r.get(1)?,
        label: r.get(2)?,
        active: r.get::<_, i64>(3)? != 0,
    })
}

pub fn public_tenant_id(conn: &Connection) -> Result<i64> {
    Ok(tenant_by_code(conn, PUBLIC_TENANT)?.id)
}

pub fn tenant_by_code(conn: &Connection, code: &str) -> Result<Tenant> {
    conn.query_row(
        "SELECT id, code, label, active FROM aikotoba WHERE code=?1",
        params![code.trim()],
        tenant_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("Aikotoba '{}'", code.trim())))
}

pub fn tenant_by_id(conn: &Connection, id: i64) -> Result<Tenant> {
    conn.query_row(
        "SELECT id, code, label, active FROM aikotoba WHERE id=?1",
        params![id],
        tenant_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("Aikotoba #{}", id)))
}

pub fn list_tenants(conn: &Connection) -> Result<Vec<Tenant>> {
    let mut stmt = conn.prepare("SELECT id, code, label, active FROM aikotoba ORDER BY id")?;
    let rows = stmt.query_map([], tenant_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Create a tenant and seed its default main categories.
pub fn create_tenant(conn: &Connection, code: &str, label: &str) -> Result<i64> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::Invalid("Aikotoba code must not be empty".into()));
    }
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO aikotoba(code, label) VALUES (?1, ?2)",
        params![code, label.trim()],
    )?;
    let id = tx.last_insert_rowid();
    for name in DEFAULT_MAIN_CATEGORIES {
        tx.execute(
            "INSERT INTO main_categories(name, aikotoba_id) VALUES (?1, ?2)",
            params![name, id],
        )?;
    }
    tx.commit()?;
    info!(tenant = id, code, "created aikotoba");
    Ok(id)
}

// ---------------------------------------------------------------------------
// Users

pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    tenant_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users(username, password_hash, aikotoba_id) VALUES (?1, ?2, ?3)",
        params![username.trim(), password_hash, tenant_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The user and their stored password hash.
pub fn user_by_name(conn: &Connection, username: &str) -> Result<Option<(User, String)>> {
    let v = conn
        .query_row(
            "SELECT id, username, aikotoba_id, password_hash FROM users WHERE username=?1",
            params![username.trim()],
            |r| {
                Ok((
                    User {
                        id: r.get(0)?,
                        username: r.get(1)?,
                        tenant_id: r.get(2)?,
                    },
                    r.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    Ok(v)
}

pub fn set_user_tenant(conn: &Connection, username: &str, tenant_id: i64) -> Result<()> {
    let n = conn.execute(
        "UPDATE users SET aikotoba_id=?1 WHERE username=?2",
        params![tenant_id, username.trim()],
    )?;
    if n == 0 {
        return Err(Error::NotFound(format!("User '{}'", username.trim())));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories

pub fn list_main_categories(conn: &Connection, tenant_id: i64) -> Result<Vec<MainCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, aikotoba_id FROM main_categories WHERE aikotoba_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![tenant_id], |r| {
        Ok(MainCategory {
            id: r.get(0)?,
            name: r.get(1)?,
            tenant_id: r.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn main_category(conn: &Connection, tenant_id: i64, id: i64) -> Result<MainCategory> {
    let mc = conn
        .query_row(
            "SELECT id, name, aikotoba_id FROM main_categories WHERE id=?1",
            params![id],
            |r| {
                Ok(MainCategory {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    tenant_id: r.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Main category #{}", id)))?;
    if mc.tenant_id != tenant_id {
        return Err(Error::TenantMismatch(format!("Main category #{}", id)));
    }
    Ok(mc)
}

pub fn main_category_by_name(conn: &Connection, tenant_id: i64, name: &str) -> Result<MainCategory> {
    conn.query_row(
        "SELECT id, name, aikotoba_id FROM main_categories WHERE aikotoba_id=?1 AND name=?2",
        params![tenant_id, name.trim()],
        |r| {
            Ok(MainCategory {
                id: r.get(0)?,
                name: r.get(1)?,
                tenant_id: r.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("Main category '{}'", name.trim())))
}

fn category_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Invalid("Category name must not be empty".into()));
    }
    Ok(name)
}

pub fn add_main_category(conn: &Connection, tenant_id: i64, name: &str) -> Result<i64> {
    let name = category_name(name)?;
    conn.execute(
        "INSERT INTO main_categories(name, aikotoba_id) VALUES (?1, ?2)",
        params![name, tenant_id],
    )?;
    let id = conn.last_insert_rowid();
    info!(tenant = tenant_id, id, name, "added main category");
    Ok(id)
}

pub fn rename_main_category(conn: &Connection, tenant_id: i64, id: i64, name: &str) -> Result<()> {
    let name = category_name(name)?;
    main_category(conn, tenant_id, id)?;
    conn.execute(
        "UPDATE main_categories SET name=?1 WHERE id=?2 AND aikotoba_id=?3",
        params![name, id, tenant_id],
    )?;
    Ok(())
}

const SUB_SELECT: &str = "SELECT sc.id, sc.main_category_id, mc.name, sc.name, sc.aikotoba_id
     FROM sub_categories sc JOIN main_categories mc ON sc.main_category_id=mc.id";

fn sub_from_row(r: &Row<'_>) -> rusqlite::Result<SubCategory> {
    Ok(SubCategory {
        id: r.get(0)?,
        main_category_id: r.get(1)?,
        main_category_name: r.get(2)?,
        name: r.get(3)?,
        tenant_id: r.get(4)?,
    })
}

pub fn list_sub_categories(
    conn: &Connection,
    tenant_id: i64,
    main_category_id: Option<i64>,
) -> Result<Vec<SubCategory>> {
    let mut sql = format!("{} WHERE sc.aikotoba_id=?1", SUB_SELECT);
    let mut vals: Vec<Value> = vec![Value::Integer(tenant_id)];
    if let Some(mid) = main_category_id {
        sql.push_str(" AND sc.main_category_id=?2");
        vals.push(Value::Integer(mid));
    }
    sql.push_str(" ORDER BY mc.id, sc.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(vals), sub_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn sub_category(conn: &Connection, tenant_id: i64, id: i64) -> Result<SubCategory> {
    let sc = conn
        .query_row(
            &format!("{} WHERE sc.id=?1", SUB_SELECT),
            params![id],
            sub_from_row,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Sub category #{}", id)))?;
    if sc.tenant_id != tenant_id {
        return Err(Error::TenantMismatch(format!("Sub category #{}", id)));
    }
    Ok(sc)
}

pub fn sub_category_by_name(
    conn: &Connection,
    tenant_id: i64,
    main_name: &str,
    sub_name: &str,
) -> Result<SubCategory> {
    conn.query_row(
        &format!(
            "{} WHERE sc.aikotoba_id=?1 AND mc.name=?2 AND sc.name=?3 ORDER BY sc.id LIMIT 1",
            SUB_SELECT
        ),
        params![tenant_id, main_name.trim(), sub_name.trim()],
        sub_from_row,
    )
    .optional()?
    .ok_or_else(|| {
        Error::NotFound(format!(
            "Sub category '{} / {}'",
            main_name.trim(),
            sub_name.trim()
        ))
    })
}

/// Sub-category names are unique within their main category.
fn ensure_sub_name_free(conn: &Connection, main: &MainCategory, name: &str, except: i64) -> Result<()> {
    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM sub_categories WHERE main_category_id=?1 AND name=?2 AND id<>?3",
            params![main.id, name, except],
            |r| r.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(Error::Invalid(format!(
            "Sub category '{}' already exists under '{}'",
            name, main.name
        )));
    }
    Ok(())
}

/// The new sub-category inherits the tenant of its main category.
pub fn add_sub_category(
    conn: &Connection,
    tenant_id: i64,
    main_category_id: i64,
    name: &str,
) -> Result<i64> {
    let name = category_name(name)?;
    let main = main_category(conn, tenant_id, main_category_id)?;
    ensure_sub_name_free(conn, &main, name, 0)?;
    conn.execute(
        "INSERT INTO sub_categories(main_category_id, name, aikotoba_id) VALUES (?1, ?2, ?3)",
        params![main.id, name, main.tenant_id],
    )?;
    let id = conn.last_insert_rowid();
    info!(tenant = tenant_id, id, main = %main.name, name, "added sub category");
    Ok(id)
}

pub fn rename_sub_category(conn: &Connection, tenant_id: i64, id: i64, name: &str) -> Result<()> {
    let name = category_name(name)?;
    let sc = sub_category(conn, tenant_id, id)?;
    let main = main_category(conn, tenant_id, sc.main_category_id)?;
    ensure_sub_name_free(conn, &main, name, id)?;
    conn.execute(
        "UPDATE sub_categories SET name=?1 WHERE id=?2",
        params![name, id],
    )?;
    Ok(())
}

pub fn move_sub_category(
    conn: &Connection,
    tenant_id: i64,
    id: i64,
    new_main_category_id: i64,
) -> Result<()> {
    let sc = sub_category(conn, tenant_id, id)?;
    let main = main_category(conn, tenant_id, new_main_category_id)?;
    ensure_sub_name_free(conn, &main, &sc.name, id)?;
    conn.execute(
        "UPDATE sub_categories SET main_category_id=?1, aikotoba_id=?2 WHERE id=?3",
        params![main.id, main.tenant_id, id],
    )?;
    Ok(())
}

/// Remove a sub-category and its transactions in one SQL transaction.
/// Returns the number of transactions removed with it.
pub fn delete_sub_category(conn: &Connection, tenant_id: i64, id: i64) -> Result<usize> {
    sub_category(conn, tenant_id, id)?;
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute(
        "DELETE FROM transactions WHERE sub_category_id=?1",
        params![id],
    )?;
    tx.execute("DELETE FROM sub_categories WHERE id=?1", params![id])?;
    tx.commit()?;
    info!(tenant = tenant_id, id, removed, "deleted sub category");
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Transactions

const TX_SELECT: &str = "SELECT t.id, t.sub_category_id, sc.name, mc.name, t.amount, t.type,
            t.date, t.detail, t.aikotoba_id, t.created_by
       FROM transactions t
       JOIN sub_categories sc ON t.sub_category_id=sc.id
       JOIN main_categories mc ON sc.main_category_id=mc.id";

fn tx_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        sub_category_id: r.get(1)?,
        sub_category: r.get(2)?,
        main_category: r.get(3)?,
        amount: r.get(4)?,
        r#type: r.get(5)?,
        date: r.get(6)?,
        detail: r.get(7)?,
        tenant_id: r.get(8)?,
        created_by: r.get(9)?,
    })
}

/// Insert a row; the tenant is inherited from the sub-category, which must
/// belong to `tenant_id`.
pub fn insert_transaction(conn: &Connection, tenant_id: i64, t: &NewTransaction) -> Result<i64> {
    let sc = sub_category(conn, tenant_id, t.sub_category_id)?;
    conn.execute(
        "INSERT INTO transactions(sub_category_id, amount, type, date, detail, aikotoba_id, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            sc.id,
            t.amount,
            t.r#type,
            t.date,
            t.detail.trim(),
            sc.tenant_id,
            t.created_by
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(tenant = tenant_id, id, amount = t.amount, kind = %t.r#type, "recorded transaction");
    Ok(id)
}

pub fn get_transaction(conn: &Connection, tenant_id: i64, id: i64) -> Result<Transaction> {
    let t = conn
        .query_row(&format!("{} WHERE t.id=?1", TX_SELECT), params![id], tx_from_row)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Transaction #{}", id)))?;
    if t.tenant_id != tenant_id {
        return Err(Error::TenantMismatch(format!("Transaction #{}", id)));
    }
    Ok(t)
}

pub fn update_transaction(
    conn: &Connection,
    tenant_id: i64,
    id: i64,
    patch: &TransactionPatch,
) -> Result<usize> {
    if patch.is_empty() {
        return Err(Error::Invalid("No fields to update".into()));
    }
    get_transaction(conn, tenant_id, id)?;

    let mut sets: Vec<&str> = Vec::new();
    let mut vals: Vec<Value> = Vec::new();
    if let Some(sid) = patch.sub_category_id {
        sub_category(conn, tenant_id, sid)?;
        sets.push("sub_category_id=?");
        vals.push(Value::Integer(sid));
    }
    if let Some(amount) = patch.amount {
        sets.push("amount=?");
        vals.push(Value::Integer(amount));
    }
    if let Some(ty) = patch.r#type {
        sets.push("type=?");
        vals.push(Value::Text(ty.as_str().to_string()));
    }
    if let Some(date) = patch.date {
        sets.push("date=?");
        vals.push(Value::Text(date.to_string()));
    }
    if let Some(detail) = &patch.detail {
        sets.push("detail=?");
        vals.push(Value::Text(detail.trim().to_string()));
    }
    vals.push(Value::Integer(id));
    vals.push(Value::Integer(tenant_id));
    let sql = format!(
        "UPDATE transactions SET {} WHERE id=? AND aikotoba_id=?",
        sets.join(", ")
    );
    let n = conn.execute(&sql, params_from_iter(vals))?;
    info!(tenant = tenant_id, id, "updated transaction");
    Ok(n)
}

pub fn delete_transaction(conn: &Connection, tenant_id: i64, id: i64) -> Result<usize> {
    get_transaction(conn, tenant_id, id)?;
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND aikotoba_id=?2",
        params![id, tenant_id],
    )?;
    info!(tenant = tenant_id, id, "deleted transaction");
    Ok(n)
}

/// Replace the budget rows of one sub-category for `month` with a single
/// row dated the first of the month.
pub fn set_budget(
    conn: &Connection,
    tenant_id: i64,
    sub_category_id: i64,
    month: Month,
    amount: i64,
    created_by: Option<&str>,
) -> Result<i64> {
    let sc = sub_category(conn, tenant_id, sub_category_id)?;
    let (start, end) = month.range();
    let tx = conn.unchecked_transaction()?;
    let replaced = tx.execute(
        "DELETE FROM transactions
          WHERE sub_category_id=?1 AND aikotoba_id=?2 AND type=?3 AND date>=?4 AND date<?5",
        params![sc.id, sc.tenant_id, TxType::Budget, start, end],
    )?;
    tx.execute(
        "INSERT INTO transactions(sub_category_id, amount, type, date, detail, aikotoba_id, created_by)
         VALUES (?1, ?2, ?3, ?4, '', ?5, ?6)",
        params![sc.id, amount, TxType::Budget, start, sc.tenant_id, created_by],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    info!(tenant = tenant_id, %month, sub = %sc.name, amount, replaced, "set budget");
    Ok(id)
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub main_category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub start: Option<NaiveDate>,
    /// Inclusive.
    pub end: Option<NaiveDate>,
    /// Substring of `detail`.
    pub query: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Matching rows (newest first) and the total count before limit/offset.
pub fn list_transactions(
    conn: &Connection,
    tenant_id: i64,
    filter: &TransactionFilter,
) -> Result<(Vec<Transaction>, i64)> {
    let mut cond = String::from(" WHERE t.aikotoba_id=?");
    let mut vals: Vec<Value> = vec![Value::Integer(tenant_id)];
    if let Some(mid) = filter.main_category_id {
        cond.push_str(" AND mc.id=?");
        vals.push(Value::Integer(mid));
    }
    if let Some(sid) = filter.sub_category_id {
        cond.push_str(" AND t.sub_category_id=?");
        vals.push(Value::Integer(sid));
    }
    if let Some(start) = filter.start {
        cond.push_str(" AND t.date>=?");
        vals.push(Value::Text(start.to_string()));
    }
    if let Some(end) = filter.end {
        cond.push_str(" AND t.date<=?");
        vals.push(Value::Text(end.to_string()));
    }
    if let Some(q) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
        cond.push_str(" AND t.detail LIKE ?");
        vals.push(Value::Text(format!("%{}%", q.trim())));
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM transactions t
           JOIN sub_categories sc ON t.sub_category_id=sc.id
           JOIN main_categories mc ON sc.main_category_id=mc.id{}",
        cond
    );
    let total: i64 = conn.query_row(&count_sql, params_from_iter(vals.iter()), |r| r.get(0))?;

    let mut sql = format!("{}{} ORDER BY t.date DESC, t.id DESC", TX_SELECT, cond);
    // LIMIT is required by SQLite before OFFSET; -1 means unbounded.
    if filter.limit.is_some() || filter.offset.is_some() {
        sql.push_str(" LIMIT ? OFFSET ?");
        vals.push(Value::Integer(filter.limit.map(|l| l as i64).unwrap_or(-1)));
        vals.push(Value::Integer(filter.offset.unwrap_or(0) as i64));
    }
    debug!(%sql, "list transactions");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(vals), tx_from_row)?;
    Ok((rows.collect::<rusqlite::Result<Vec<_>>>()?, total))
}
