// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbloom::commands::expenses::{self, ExpenseInput};
use budgetbloom::error::ValidationError;
use budgetbloom::models::{Category, User};
use budgetbloom::{auth, cli, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> (Connection, User) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let user = auth::register(&conn, "Ada", "ada@example.com", "secret1", "secret1").unwrap();
    (conn, user)
}

fn input(amount: &str, category: Category, description: &str, date: &str) -> ExpenseInput {
    ExpenseInput {
        amount: amount.parse().unwrap(),
        category,
        description: description.into(),
        note: None,
        date: d(date),
    }
}

fn seed(conn: &Connection, user_id: i64) {
    for (amount, cat, desc, date) in [
        ("12.50", Category::Food, "Lunch", "2026-10-17"),
        ("30", Category::Transport, "Train pass", "2026-10-15"),
        ("7.50", Category::Food, "Coffee", "2026-10-15"),
        ("100", Category::Shopping, "Shoes", "2026-09-20"),
        ("5", Category::Entertainment, "Arcade", "2026-10-08"),
    ] {
        expenses::insert(conn, user_id, &input(amount, cat, desc, date)).unwrap();
    }
}

fn list_matches(extra: &[&str]) -> clap::ArgMatches {
    let mut args = vec!["budgetbloom", "--today", "2026-10-17", "expense", "list"];
    args.extend_from_slice(extra);
    let m = cli::build_cli().get_matches_from(args);
    m.subcommand_matches("expense")
        .and_then(|e| e.subcommand_matches("list"))
        .unwrap()
        .clone()
}

#[test]
fn insert_rejects_invalid_input() {
    let (conn, user) = setup();
    let err = expenses::insert(&conn, user.id, &input("0", Category::Food, "Lunch", "2026-10-17"))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::Amount)
    );
    let err = expenses::insert(&conn, user.id, &input("4", Category::Food, "   ", "2026-10-17"))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::Description)
    );
    assert!(expenses::load_all(&conn, user.id).unwrap().is_empty());
}

#[test]
fn load_all_is_newest_first_and_keeps_precision() {
    let (conn, user) = setup();
    seed(&conn, user.id);
    let all = expenses::load_all(&conn, user.id).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].description, "Lunch");
    assert_eq!(all[0].amount, "12.50".parse::<Decimal>().unwrap());
    // same date: higher id first
    assert_eq!(all[1].description, "Coffee");
    assert_eq!(all[4].description, "Shoes");
}

#[test]
fn update_and_delete_are_scoped_to_owner() {
    let (conn, ada) = setup();
    let id = expenses::insert(&conn, ada.id, &input("9", Category::Health, "Vitamins", "2026-10-10"))
        .unwrap();
    let bob = auth::register(&conn, "Bob", "bob@example.com", "secret2", "secret2").unwrap();

    assert!(expenses::load_all(&conn, bob.id).unwrap().is_empty());
    assert!(expenses::find(&conn, bob.id, id).unwrap().is_none());
    let err = expenses::update(&conn, bob.id, id, &input("1", Category::Other, "x", "2026-10-10"))
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(expenses::delete(&conn, bob.id, id).is_err());

    let mut changed = input("11", Category::Health, "Vitamins D", "2026-10-11");
    changed.note = Some("pharmacy".into());
    expenses::update(&conn, ada.id, id, &changed).unwrap();
    let got = expenses::find(&conn, ada.id, id).unwrap().unwrap();
    assert_eq!(got.amount, Decimal::from(11));
    assert_eq!(got.note.as_deref(), Some("pharmacy"));
    assert_eq!(got.date, d("2026-10-11"));

    expenses::delete(&conn, ada.id, id).unwrap();
    assert!(expenses::find(&conn, ada.id, id).unwrap().is_none());
}

#[test]
fn list_filters_by_category_and_range() {
    let (conn, user) = setup();
    seed(&conn, user.id);

    let (rows, overall) = expenses::query_rows(&conn, &list_matches(&["-c", "food"])).unwrap();
    assert_eq!(overall, 5);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|e| e.category == Category::Food));

    let (rows, _) = expenses::query_rows(&conn, &list_matches(&["--category", "all"])).unwrap();
    assert_eq!(rows.len(), 5);

    let (rows, _) = expenses::query_rows(
        &conn,
        &list_matches(&["--from", "2026-10-08", "--to", "2026-10-15"]),
    )
    .unwrap();
    assert_eq!(rows.len(), 3);

    let (rows, _) = expenses::query_rows(&conn, &list_matches(&["--month", "2026-09"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Shoes");
}

#[test]
fn list_presets_use_today_override() {
    let (conn, user) = setup();
    seed(&conn, user.id);

    // 2026-10-11 ..= 2026-10-17
    let (rows, _) = expenses::query_rows(&conn, &list_matches(&["--last7"])).unwrap();
    assert_eq!(rows.len(), 3);

    let (rows, _) = expenses::query_rows(&conn, &list_matches(&["--this-month"])).unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn list_sorts_by_amount_and_limits() {
    let (conn, user) = setup();
    seed(&conn, user.id);
    let (rows, overall) =
        expenses::query_rows(&conn, &list_matches(&["--sort", "amount", "--limit", "2"])).unwrap();
    assert_eq!(overall, 5);
    let names: Vec<&str> = rows.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["Shoes", "Train pass"]);
}

#[test]
fn list_requires_a_session() {
    let (conn, user) = setup();
    seed(&conn, user.id);
    auth::logout(&conn).unwrap();
    let err = expenses::query_rows(&conn, &list_matches(&[])).unwrap_err();
    assert!(err.to_string().contains("Not logged in"));
}
