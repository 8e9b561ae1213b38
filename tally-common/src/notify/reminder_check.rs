use chrono::{Datelike, NaiveDate};
use serde_json::json;

use crate::db::{reminder::Dao as ReminderDao, user::Dao as UserDao, DbThreadPool};
use crate::models::reminder::Reminder;
use crate::notify::NotifyError;
use crate::oplog;
use crate::push::dispatcher::Dispatcher;
use crate::push::PushKind;

/// Counters for one reminder-check run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReminderRunSummary {
    pub scanned: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

/// Whether a reminder should fire on `today`. The three clauses are
/// alternatives; a reminder matching more than one still yields a single
/// dispatch because the caller sends at most once per reminder per run.
pub fn reminder_is_due(reminder: &Reminder, today: NaiveDate) -> bool {
    if reminder.date == today {
        return true;
    }

    // days_before == 0 means "only on the day itself", never early
    if reminder.days_before > 0 {
        let diff_days = (reminder.date - today).num_days();
        if diff_days == i64::from(reminder.days_before) {
            return true;
        }
    }

    // Naive monthly recurrence on the same day-of-month
    reminder.is_repeated && reminder.date.day() == today.day()
}

/// Scans all active reminders and dispatches a notification for each one due
/// on `today`. Per-reminder failures are isolated; only a failure to fetch
/// the candidate set aborts the run.
pub async fn run(
    dispatcher: &Dispatcher,
    db_thread_pool: &DbThreadPool,
    today: NaiveDate,
) -> Result<ReminderRunSummary, NotifyError> {
    let reminder_dao = ReminderDao::new(db_thread_pool);
    let candidates =
        tokio::task::spawn_blocking(move || reminder_dao.get_scheduling_candidates(today))
            .await??;

    let mut summary = ReminderRunSummary {
        scanned: candidates.len(),
        ..Default::default()
    };

    for reminder in candidates {
        if !reminder_is_due(&reminder, today) {
            continue;
        }

        let user_dao = UserDao::new(db_thread_pool);
        let owner_id = reminder.user_id;
        let owner =
            match tokio::task::spawn_blocking(move || user_dao.get_notification_target(owner_id))
                .await
            {
                Ok(Ok(owner)) => owner,
                Ok(Err(e)) => {
                    oplog::error(
                        "Failed to look up reminder owner",
                        Some(&json!({
                            "reminder_id": reminder.id,
                            "user_id": reminder.user_id,
                            "error": e.to_string(),
                        })),
                    );
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    oplog::error(
                        "Failed to join owner lookup task",
                        Some(&json!({ "reminder_id": reminder.id, "error": e.to_string() })),
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

        let token = match owner.as_ref().and_then(|o| o.device_token.as_deref()) {
            Some(token) => token,
            None => {
                oplog::warn(
                    "Reminder owner is missing, deleted, or has no device token",
                    Some(&json!({
                        "reminder_id": reminder.id,
                        "user_id": reminder.user_id,
                    })),
                );
                summary.skipped += 1;
                continue;
            }
        };

        dispatcher
            .send_to_user(
                reminder.user_id,
                token,
                PushKind::Reminder,
                &reminder.name,
                &reminder.description,
            )
            .await;
        summary.dispatched += 1;
    }

    oplog::info(
        "Reminder check completed",
        Some(&json!({
            "date": today.to_string(),
            "scanned": summary.scanned,
            "dispatched": summary.dispatched,
            "skipped": summary.skipped,
        })),
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::SystemTime;
    use uuid::Uuid;

    fn reminder(date: NaiveDate, is_repeated: bool, days_before: i32) -> Reminder {
        Reminder {
            id: Uuid::now_v7(),
            name: String::from("Rent"),
            description: String::from("Pay the rent"),
            date,
            is_repeated,
            days_before,
            user_id: Uuid::now_v7(),
            created_timestamp: SystemTime::now(),
            deleted_timestamp: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_on_exact_date_without_repeat_or_offset() {
        let today = date(2025, 3, 10);
        let r = reminder(today, false, 0);

        assert!(reminder_is_due(&r, today));
        assert!(!reminder_is_due(&r, date(2025, 3, 9)));
        assert!(!reminder_is_due(&r, date(2025, 3, 11)));
    }

    #[test]
    fn test_days_before_fires_only_at_exact_offset() {
        let due = date(2025, 3, 10);
        let r = reminder(due, false, 3);

        assert!(reminder_is_due(&r, date(2025, 3, 7)));

        assert!(!reminder_is_due(&r, date(2025, 3, 6)));
        assert!(!reminder_is_due(&r, date(2025, 3, 8)));
        assert!(!reminder_is_due(&r, date(2025, 3, 9)));
        assert!(!reminder_is_due(&r, date(2025, 3, 11)));

        // The exact date still fires via the date clause
        assert!(reminder_is_due(&r, due));
    }

    #[test]
    fn test_zero_days_before_never_fires_early() {
        let due = date(2025, 3, 10);
        let r = reminder(due, false, 0);

        assert!(!reminder_is_due(&r, date(2025, 3, 9)));
        assert!(reminder_is_due(&r, due));
    }

    #[test]
    fn test_repeated_fires_monthly_on_same_day_of_month() {
        let r = reminder(date(2025, 1, 15), true, 0);

        assert!(reminder_is_due(&r, date(2025, 1, 15)));
        assert!(reminder_is_due(&r, date(2025, 2, 15)));
        assert!(reminder_is_due(&r, date(2026, 7, 15)));

        assert!(!reminder_is_due(&r, date(2025, 2, 14)));
        assert!(!reminder_is_due(&r, date(2025, 2, 16)));
    }

    #[test]
    fn test_overlapping_clauses_still_report_due_once() {
        // Due today, repeated, and with an offset: one boolean answer, so the
        // run loop sends at most one notification for it.
        let today = date(2025, 5, 15);
        let r = reminder(today, true, 5);

        assert!(reminder_is_due(&r, today));
    }
}
