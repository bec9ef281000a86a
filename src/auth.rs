// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Accounts, password hashing and the single active session.
//!
//! Passwords are hashed with Argon2id into PHC strings. The session is the
//! `session_user_id` row of the `settings` table; every data command scopes
//! its queries to the user resolved here.

use crate::error::{AuthError, ValidationError};
use crate::models::User;
use crate::utils::{delete_setting, get_setting, set_setting};
use anyhow::Result;
use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

const SESSION_KEY: &str = "session_user_id";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Returns `false` for a mismatch and for a malformed stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if name.trim().chars().count() < 2 {
        return Err(ValidationError::Name);
    }
    validate_email(email)?;
    if password.chars().count() < 6 {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        created_at: r.get(3)?,
    })
}

pub fn find_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let u = conn
        .query_row(
            "SELECT id, name, email, created_at FROM users WHERE id=?1",
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(u)
}

/// Creates the account and logs it in.
pub fn register(
    conn: &Connection,
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<User> {
    validate_registration(name, email, password, confirm)?;
    let email = normalize_email(email);
    let exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE email=?1",
            params![&email],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_some() {
        return Err(AuthError::EmailTaken(email).into());
    }
    let hash = hash_password(password)?;
    conn.execute(
        "INSERT INTO users(name, email, password_hash) VALUES (?1, ?2, ?3)",
        params![name.trim(), &email, hash],
    )?;
    let id = conn.last_insert_rowid();
    start_session(conn, id)?;
    info!(user_id = id, "registered user");
    find_user(conn, id)?.ok_or_else(|| AuthError::NotLoggedIn.into())
}

pub fn login(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);
    let row: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM users WHERE email=?1",
            params![&email],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((id, hash)) = row else {
        debug!("login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(password, &hash) {
        debug!(user_id = id, "login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }
    start_session(conn, id)?;
    info!(user_id = id, "logged in");
    find_user(conn, id)?.ok_or_else(|| AuthError::InvalidCredentials.into())
}

/// Ends the session; returns whether one was active.
pub fn logout(conn: &Connection) -> Result<bool> {
    let had = get_setting(conn, SESSION_KEY)?.is_some();
    delete_setting(conn, SESSION_KEY)?;
    Ok(had)
}

fn start_session(conn: &Connection, user_id: i64) -> Result<()> {
    set_setting(conn, SESSION_KEY, &user_id.to_string())
}

pub fn session_user_id(conn: &Connection) -> Result<Option<i64>> {
    Ok(get_setting(conn, SESSION_KEY)?.and_then(|v| v.trim().parse::<i64>().ok()))
}

pub fn current_user(conn: &Connection) -> Result<Option<User>> {
    match session_user_id(conn)? {
        Some(id) => find_user(conn, id),
        None => Ok(None),
    }
}

pub fn require_user(conn: &Connection) -> Result<User> {
    current_user(conn)?.ok_or_else(|| AuthError::NotLoggedIn.into())
}
