// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Error;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Expense,
    Income,
    Budget,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Expense => "expense",
            TxType::Income => "income",
            TxType::Budget => "budget",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "支出" => Ok(TxType::Expense),
            "income" | "収入" => Ok(TxType::Income),
            "budget" | "予算" => Ok(TxType::Budget),
            _ => Err(Error::UnknownType(s.to_string())),
        }
    }
}

impl ToSql for TxType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TxType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub code: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub tenant_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainCategory {
    pub id: i64,
    pub name: String,
    pub tenant_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: i64,
    pub main_category_id: i64,
    pub main_category_name: String,
    pub name: String,
    pub tenant_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub sub_category_id: i64,
    pub sub_category: String,
    pub main_category: String,
    pub amount: i64,
    pub r#type: TxType,
    pub date: NaiveDate,
    pub detail: String,
    pub tenant_id: i64,
    pub created_by: Option<String>,
}

/// Input for a new ledger row. The tenant is taken from the sub-category.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub sub_category_id: i64,
    pub amount: i64,
    pub r#type: TxType,
    pub date: NaiveDate,
    pub detail: String,
    pub created_by: Option<String>,
}

/// In-place edit of an existing row; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub sub_category_id: Option<i64>,
    pub amount: Option<i64>,
    pub r#type: Option<TxType>,
    pub date: Option<NaiveDate>,
    pub detail: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.sub_category_id.is_none()
            && self.amount.is_none()
            && self.r#type.is_none()
            && self.date.is_none()
            && self.detail.is_none()
    }
}
