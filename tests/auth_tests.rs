// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbloom::error::{AuthError, ValidationError};
use budgetbloom::models::User;
use budgetbloom::{auth, db};
use rusqlite::Connection;

fn conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn registration_validation_order() {
    let v = |n, e, p, c| auth::validate_registration(n, e, p, c);
    assert_eq!(v("A", "a@b.co", "secret1", "secret1"), Err(ValidationError::Name));
    assert_eq!(v("Ada", "not-an-email", "secret1", "secret1"), Err(ValidationError::Email));
    assert_eq!(v("Ada", "a@b", "secret1", "secret1"), Err(ValidationError::Email));
    assert_eq!(v("Ada", "a@b.co", "12345", "12345"), Err(ValidationError::PasswordTooShort));
    assert_eq!(v("Ada", "a@b.co", "secret1", "secret2"), Err(ValidationError::PasswordMismatch));
    assert_eq!(v("Ada", "a@b.co", "secret1", "secret1"), Ok(()));
}

#[test]
fn password_hash_round_trip() {
    let hash = auth::hash_password("hunter22").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(auth::verify_password("hunter22", &hash));
    assert!(!auth::verify_password("hunter23", &hash));
    assert!(!auth::verify_password("hunter22", "not a phc string"));
}

#[test]
fn register_logs_in_and_normalizes_email() {
    let conn = conn();
    let user = auth::register(&conn, " Ada ", "Ada@Example.COM", "secret1", "secret1").unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(auth::current_user(&conn).unwrap().map(|u| u.id), Some(user.id));
}

#[test]
fn duplicate_email_is_rejected() {
    let conn = conn();
    auth::register(&conn, "Ada", "ada@example.com", "secret1", "secret1").unwrap();
    let err = auth::register(&conn, "Ada Two", "ADA@example.com", "secret9", "secret9").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::EmailTaken(e)) if e == "ada@example.com"
    ));
}

#[test]
fn login_checks_credentials() {
    let conn = conn();
    let user = auth::register(&conn, "Ada", "ada@example.com", "secret1", "secret1").unwrap();
    assert!(auth::logout(&conn).unwrap());
    assert!(!auth::logout(&conn).unwrap());
    assert!(auth::current_user(&conn).unwrap().is_none());

    let wrong = auth::login(&conn, "ada@example.com", "nope-nope").unwrap_err();
    assert!(matches!(
        wrong.downcast_ref::<AuthError>(),
        Some(AuthError::InvalidCredentials)
    ));
    let unknown = auth::login(&conn, "bob@example.com", "secret1").unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());

    let back = auth::login(&conn, " ADA@example.com ", "secret1").unwrap();
    assert_eq!(back.id, user.id);
    assert_eq!(auth::require_user(&conn).unwrap().id, user.id);
}

#[test]
fn require_user_without_session() {
    let conn = conn();
    let err = auth::require_user(&conn).unwrap_err();
    assert!(matches!(err.downcast_ref::<AuthError>(), Some(AuthError::NotLoggedIn)));
}

#[test]
fn logout_without_session_is_not_an_error() {
    let conn = conn();
    assert!(!auth::logout(&conn).unwrap());
    assert!(auth::session_user_id(&conn).unwrap().is_none());
}

#[test]
fn display_name_falls_back_to_email_then_user() {
    let user = |name: &str, email: &str| User {
        id: 1,
        name: name.into(),
        email: email.into(),
        created_at: "2026-10-17 09:00:00".into(),
    };
    assert_eq!(user("Ada", "ada@example.com").display_name(), "Ada");
    assert_eq!(user("  ", "grace@example.com").display_name(), "grace");
    assert_eq!(user("", "@example.com").display_name(), "User");
    assert_eq!(user("", "").display_name(), "User");
}
