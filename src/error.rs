// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Domain errors for the ledger layer. Command handlers wrap these in
//! `anyhow` with extra context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Unknown transaction type '{0}' (use expense|income|budget)")]
    UnknownType(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} belongs to another aikotoba")]
    TenantMismatch(String),

    #[error("Authentication failed")]
    Auth,

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
