// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local accounts and the active session.
//!
//! Passwords are stored as Argon2id PHC strings. The logged-in user name is
//! kept in the `current_user` setting; their aikotoba scopes every command.

use crate::config::{self, Setting};
use crate::error::{Error, Result};
use crate::models::User;
use crate::store;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::Connection;
use tracing::{info, warn};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Invalid(format!("Failed to create salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Invalid(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(stored: &str, provided: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(provided.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

/// Register a user in the public aikotoba.
pub fn register(conn: &Connection, username: &str, password: &str) -> Result<i64> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::Invalid("Username and password are required".into()));
    }
    if store::user_by_name(conn, username)?.is_some() {
        return Err(Error::Invalid(format!("User '{}' already exists", username)));
    }
    let hash = hash_password(password)?;
    let public = store::public_tenant_id(conn)?;
    let id = store::create_user(conn, username, &hash, public)?;
    info!(id, username, "registered user");
    Ok(id)
}

/// Check the credentials. Unknown user and wrong password fail the same way.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<User> {
    match store::user_by_name(conn, username)? {
        Some((user, stored)) if verify_password(&stored, password) => Ok(user),
        _ => Err(Error::Auth),
    }
}

pub fn login(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let user = authenticate(conn, username, password)?;
    config::set(conn, Setting::CurrentUser, &user.username)
        .map_err(|e| Error::Invalid(e.to_string()))?;
    info!(username = %user.username, "logged in");
    Ok(user)
}

pub fn logout(conn: &Connection) -> Result<()> {
    config::clear(conn, Setting::CurrentUser).map_err(|e| Error::Invalid(e.to_string()))
}

/// The logged-in user, if any. A stale name (user removed) counts as none.
pub fn current_user(conn: &Connection) -> Result<Option<User>> {
    let name = config::get(conn, Setting::CurrentUser).map_err(|e| Error::Invalid(e.to_string()))?;
    let Some(name) = name else {
        return Ok(None);
    };
    Ok(store::user_by_name(conn, &name)?.map(|(u, _)| u))
}

/// Tenant for the current session: the user's aikotoba, else `public`.
pub fn current_tenant(conn: &Connection) -> Result<i64> {
    match current_user(conn)? {
        Some(u) => Ok(u.tenant_id),
        None => store::public_tenant_id(conn),
    }
}
