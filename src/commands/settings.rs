// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::require_user;
use crate::commands::notifications;
use crate::models::NotificationKind;
use crate::rules::Preferences;
use crate::utils::{get_setting, pretty_table, required, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    match m.subcommand() {
        Some(("list", _)) => {
            let prefs = load_preferences(conn, user.id)?;
            let rows = NotificationKind::ALL
                .iter()
                .map(|k| {
                    vec![
                        k.pref_key().to_string(),
                        on_off(prefs.allows(*k)).to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Notification", "Enabled"], rows));
        }
        Some(("get", sub)) => {
            let kind = kind_for_key(&required(sub, "key")?)?;
            let prefs = load_preferences(conn, user.id)?;
            println!("{}", on_off(prefs.allows(kind)));
        }
        Some(("set", sub)) => {
            let kind = kind_for_key(&required(sub, "key")?)?;
            let value = required(sub, "value")?;
            set_preference(conn, user.id, kind, value == "on")?;
            println!("{} notifications turned {}", kind.pref_key(), value);
        }
        Some(("clear-notifications", _)) => {
            let n = notifications::clear_all(conn, user.id)?;
            println!("Notifications cleared: {} removed from history", n);
        }
        _ => {}
    }
    Ok(())
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn pref_setting_key(user_id: i64, kind: NotificationKind) -> String {
    format!("{}:notify.{}", user_id, kind.pref_key())
}

pub fn kind_for_key(key: &str) -> Result<NotificationKind> {
    NotificationKind::ALL
        .into_iter()
        .find(|k| k.pref_key() == key.trim())
        .ok_or_else(|| {
            anyhow!(
                "Unknown setting '{}' (use achievements|warnings|nudges|weekly_reports)",
                key
            )
        })
}

/// Missing keys default to on.
pub fn load_preferences(conn: &Connection, user_id: i64) -> Result<Preferences> {
    let enabled = |kind: NotificationKind| -> Result<bool> {
        Ok(get_setting(conn, &pref_setting_key(user_id, kind))?
            .map(|v| v != "off")
            .unwrap_or(true))
    };
    Ok(Preferences {
        achievements: enabled(NotificationKind::Achievement)?,
        warnings: enabled(NotificationKind::Warning)?,
        nudges: enabled(NotificationKind::Nudge)?,
        weekly_reports: enabled(NotificationKind::WeeklyReport)?,
    })
}

pub fn set_preference(
    conn: &Connection,
    user_id: i64,
    kind: NotificationKind,
    enabled: bool,
) -> Result<()> {
    set_setting(conn, &pref_setting_key(user_id, kind), on_off(enabled))
}
