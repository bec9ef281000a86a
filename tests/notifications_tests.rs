// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbloom::commands::expenses::{self, ExpenseInput};
use budgetbloom::commands::{goals, notifications, settings};
use budgetbloom::models::{Category, NotificationKind, User};
use budgetbloom::rules;
use budgetbloom::{auth, db};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn today() -> NaiveDate {
    d("2026-10-17")
}

fn setup() -> (Connection, User) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let user = auth::register(&conn, "Ada", "ada@example.com", "secret1", "secret1").unwrap();
    (conn, user)
}

/// Goal of 100 for October with 52 spent puts the user in the halfway window.
fn halfway(conn: &Connection, user_id: i64) {
    goals::set_monthly_goal(conn, user_id, Decimal::from(100), 2026, 10).unwrap();
    let input = ExpenseInput {
        amount: Decimal::from(52),
        category: Category::Shopping,
        description: "Jacket".into(),
        note: None,
        date: d("2026-10-02"),
    };
    expenses::insert(conn, user_id, &input).unwrap();
}

#[test]
fn refresh_stores_new_notifications_once() {
    let (conn, user) = setup();
    halfway(&conn, user.id);

    let created = notifications::refresh(&conn, user.id, today()).unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, rules::HALFWAY_NUDGE_TITLE);

    assert!(notifications::refresh(&conn, user.id, today()).unwrap().is_empty());
    let stored = notifications::load_all(&conn, user.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_read);
    assert_eq!(stored[0].kind, NotificationKind::Nudge);
    assert_eq!(notifications::unread_count(&conn, user.id).unwrap(), 1);
}

#[test]
fn disabled_kinds_are_not_created() {
    let (conn, user) = setup();
    halfway(&conn, user.id);
    settings::set_preference(&conn, user.id, NotificationKind::Nudge, false).unwrap();

    let prefs = settings::load_preferences(&conn, user.id).unwrap();
    assert!(!prefs.nudges);
    assert!(prefs.achievements && prefs.warnings && prefs.weekly_reports);
    assert!(notifications::refresh(&conn, user.id, today()).unwrap().is_empty());

    settings::set_preference(&conn, user.id, NotificationKind::Nudge, true).unwrap();
    assert_eq!(notifications::refresh(&conn, user.id, today()).unwrap().len(), 1);
}

#[test]
fn preferences_are_per_user() {
    let (conn, ada) = setup();
    settings::set_preference(&conn, ada.id, NotificationKind::Warning, false).unwrap();
    let bob = auth::register(&conn, "Bob", "bob@example.com", "secret2", "secret2").unwrap();
    assert!(settings::load_preferences(&conn, bob.id).unwrap().warnings);
    assert!(!settings::load_preferences(&conn, ada.id).unwrap().warnings);
}

#[test]
fn setting_keys_map_to_kinds() {
    assert_eq!(
        settings::kind_for_key("weekly_reports").unwrap(),
        NotificationKind::WeeklyReport
    );
    assert_eq!(settings::kind_for_key(" nudges ").unwrap(), NotificationKind::Nudge);
    assert!(settings::kind_for_key("sms").is_err());
}

#[test]
fn dismissed_nudges_leave_the_active_list() {
    let (conn, user) = setup();
    halfway(&conn, user.id);
    notifications::refresh(&conn, user.id, today()).unwrap();

    let active = notifications::active_nudges(&conn, user.id).unwrap();
    assert_eq!(active.len(), 1);
    notifications::dismiss(&conn, user.id, active[0].id).unwrap();
    assert!(notifications::active_nudges(&conn, user.id).unwrap().is_empty());
    // still in history
    assert_eq!(notifications::load_all(&conn, user.id).unwrap().len(), 1);
}

#[test]
fn only_nudges_can_be_dismissed() {
    let (conn, user) = setup();
    notifications::weekly_report(&conn, user.id, today()).unwrap();
    let report = &notifications::load_all(&conn, user.id).unwrap()[0];
    let err = notifications::dismiss(&conn, user.id, report.id).unwrap_err();
    assert!(err.to_string().contains("not a nudge"));
    assert!(notifications::dismiss(&conn, user.id, 4242).is_err());
}

#[test]
fn weekly_report_is_stored_once_and_respects_preference() {
    let (conn, user) = setup();
    let r = notifications::weekly_report(&conn, user.id, today()).unwrap().unwrap();
    assert_eq!(r.kind, NotificationKind::WeeklyReport);
    notifications::weekly_report(&conn, user.id, today()).unwrap();
    assert_eq!(notifications::load_all(&conn, user.id).unwrap().len(), 1);

    settings::set_preference(&conn, user.id, NotificationKind::WeeklyReport, false).unwrap();
    assert!(notifications::weekly_report(&conn, user.id, today()).unwrap().is_none());
}

#[test]
fn read_and_clear_operations() {
    let (conn, user) = setup();
    halfway(&conn, user.id);
    notifications::refresh(&conn, user.id, today()).unwrap();
    notifications::weekly_report(&conn, user.id, today()).unwrap();
    assert_eq!(notifications::unread_count(&conn, user.id).unwrap(), 2);

    let first = notifications::load_all(&conn, user.id).unwrap()[0].id;
    notifications::mark_read(&conn, user.id, first).unwrap();
    assert_eq!(notifications::unread_count(&conn, user.id).unwrap(), 1);
    assert_eq!(notifications::mark_all_read(&conn, user.id).unwrap(), 1);
    assert_eq!(notifications::unread_count(&conn, user.id).unwrap(), 0);

    notifications::clear(&conn, user.id, first).unwrap();
    assert!(notifications::clear(&conn, user.id, first).is_err());
    assert!(notifications::mark_read(&conn, user.id, first).is_err());
    assert_eq!(notifications::clear_all(&conn, user.id).unwrap(), 1);
    assert!(notifications::load_all(&conn, user.id).unwrap().is_empty());
}

#[test]
fn cleared_history_lets_rules_fire_again() {
    let (conn, user) = setup();
    halfway(&conn, user.id);
    assert_eq!(notifications::refresh(&conn, user.id, today()).unwrap().len(), 1);
    notifications::clear_all(&conn, user.id).unwrap();
    assert_eq!(notifications::refresh(&conn, user.id, today()).unwrap().len(), 1);
}
