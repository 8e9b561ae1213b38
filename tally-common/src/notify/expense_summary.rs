use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, Timelike};
use serde_json::json;

use crate::db::{expense::Dao as ExpenseDao, expense::SummaryExpense};
use crate::db::{notification_settings::Dao as SettingsDao, DbThreadPool};
use crate::notify::NotifyError;
use crate::oplog;
use crate::push::dispatcher::Dispatcher;
use crate::push::PushKind;

const SUMMARY_TITLE: &str = "Daily Expense Summary";

/// Counters for one expense-summary run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SummaryRunSummary {
    pub recipients: usize,
    pub dispatched: usize,
    pub skipped: usize,
}

/// Parses a "HH:MM" preference string. Rejects out-of-range components.
pub fn parse_summary_time(value: &str) -> Option<(u32, u32)> {
    let (hour, minute) = value.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    if hour > 23 || minute > 59 {
        return None;
    }

    Some((hour, minute))
}

/// Whether a configured summary time is due in the current hour. `None`
/// means the preference string is malformed. Only the hour is honored; the
/// runner is frequency-driven, not cron-aligned, so the minute component is
/// validated but ignored.
pub fn summary_due(daily_summary_time: &str, current_hour: u32) -> Option<bool> {
    parse_summary_time(daily_summary_time).map(|(hour, _)| hour == current_hour)
}

/// Aggregate of one user's same-day expenses.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: BigDecimal,
    pub project_names: Vec<String>,
}

impl ExpenseSummary {
    pub fn from_expenses(expenses: &[SummaryExpense]) -> Self {
        let mut total = BigDecimal::from(0);
        let mut project_names: Vec<String> = Vec::new();

        for expense in expenses {
            total += &expense.amount;

            let name = expense
                .project_name
                .clone()
                .unwrap_or_else(|| String::from("Unknown"));
            if !project_names.contains(&name) {
                project_names.push(name);
            }
        }

        Self {
            count: expenses.len(),
            total,
            project_names,
        }
    }

    /// The notification body. Totals are rendered with exactly two decimal
    /// places.
    pub fn body(&self) -> String {
        if self.count == 0 {
            return String::from("No expenses were added today.");
        }

        format!(
            "You added {} expense{} today totaling ₹{}. Projects: {}",
            self.count,
            if self.count > 1 { "s" } else { "" },
            self.total.with_scale(2),
            self.project_names.join(", "),
        )
    }
}

/// Checks every daily-summary subscriber and dispatches an aggregate of
/// today's expenses to those whose configured hour matches `now`. A failure
/// for one user never blocks the rest.
pub async fn run(
    dispatcher: &Dispatcher,
    db_thread_pool: &DbThreadPool,
    now: NaiveDateTime,
) -> Result<SummaryRunSummary, NotifyError> {
    let settings_dao = SettingsDao::new(db_thread_pool);
    let recipients =
        tokio::task::spawn_blocking(move || settings_dao.get_daily_summary_recipients()).await??;

    let mut summary = SummaryRunSummary {
        recipients: recipients.len(),
        ..Default::default()
    };

    let current_hour = now.hour();
    let today = now.date();

    for recipient in recipients {
        let token = match recipient.device_token.as_deref() {
            Some(token) => token,
            None => {
                oplog::warn(
                    "Daily summary subscriber has no device token",
                    Some(&json!({ "user_id": recipient.user_id })),
                );
                summary.skipped += 1;
                continue;
            }
        };

        match summary_due(&recipient.daily_summary_time, current_hour) {
            Some(true) => (),
            Some(false) => continue,
            None => {
                oplog::warn(
                    "Daily summary subscriber has a malformed summary time",
                    Some(&json!({
                        "user_id": recipient.user_id,
                        "daily_summary_time": recipient.daily_summary_time,
                    })),
                );
                summary.skipped += 1;
                continue;
            }
        }

        let expense_dao = ExpenseDao::new(db_thread_pool);
        let payer_id = recipient.user_id;
        let expenses = match tokio::task::spawn_blocking(move || {
            expense_dao.get_expenses_for_payer_on_day(payer_id, today)
        })
        .await
        {
            Ok(Ok(expenses)) => expenses,
            Ok(Err(e)) => {
                oplog::error(
                    "Failed to fetch expenses for daily summary",
                    Some(&json!({ "user_id": recipient.user_id, "error": e.to_string() })),
                );
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                oplog::error(
                    "Failed to join expense fetch task",
                    Some(&json!({ "user_id": recipient.user_id, "error": e.to_string() })),
                );
                summary.skipped += 1;
                continue;
            }
        };

        let body = ExpenseSummary::from_expenses(&expenses).body();

        dispatcher
            .send_to_user(
                recipient.user_id,
                token,
                PushKind::Expense,
                SUMMARY_TITLE,
                &body,
            )
            .await;
        summary.dispatched += 1;
    }

    oplog::info(
        "Daily expense summary check completed",
        Some(&json!({
            "hour": current_hour,
            "recipients": summary.recipients,
            "dispatched": summary.dispatched,
            "skipped": summary.skipped,
        })),
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;
    use uuid::Uuid;

    fn expense(amount: &str, project_name: Option<&str>) -> SummaryExpense {
        SummaryExpense {
            id: Uuid::now_v7(),
            amount: BigDecimal::from_str(amount).unwrap(),
            project_name: project_name.map(String::from),
        }
    }

    #[test]
    fn test_parse_summary_time() {
        assert_eq!(parse_summary_time("18:00"), Some((18, 0)));
        assert_eq!(parse_summary_time("06:30"), Some((6, 30)));
        assert_eq!(parse_summary_time("0:5"), Some((0, 5)));

        assert_eq!(parse_summary_time("24:00"), None);
        assert_eq!(parse_summary_time("12:60"), None);
        assert_eq!(parse_summary_time("noonish"), None);
        assert_eq!(parse_summary_time(""), None);
        assert_eq!(parse_summary_time("12"), None);
    }

    #[test]
    fn test_summary_due_matches_hour_only() {
        assert_eq!(summary_due("14:00", 14), Some(true));
        assert_eq!(summary_due("14:00", 13), Some(false));
        assert_eq!(summary_due("14:00", 15), Some(false));

        // The configured minute does not gate delivery
        assert_eq!(summary_due("14:45", 14), Some(true));

        assert_eq!(summary_due("25:00", 14), None);
    }

    #[test]
    fn test_aggregation_is_decimal_exact() {
        let expenses = [
            expense("100.50", Some("Kitchen Remodel")),
            expense("200.25", Some("Kitchen Remodel")),
            expense("50.00", Some("Garden")),
        ];

        let summary = ExpenseSummary::from_expenses(&expenses);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, BigDecimal::from_str("350.75").unwrap());
        assert_eq!(
            summary.project_names,
            vec![String::from("Kitchen Remodel"), String::from("Garden")]
        );

        let body = summary.body();
        assert!(body.contains("3 expenses"));
        assert!(body.contains("₹350.75"));
        assert!(body.contains("Kitchen Remodel, Garden"));
    }

    #[test]
    fn test_body_uses_singular_for_one_expense() {
        let summary = ExpenseSummary::from_expenses(&[expense("12.00", Some("Garden"))]);

        let body = summary.body();
        assert!(body.contains("1 expense today"));
        assert!(!body.contains("expenses"));
        assert!(body.contains("₹12.00"));
    }

    #[test]
    fn test_body_for_no_expenses() {
        let summary = ExpenseSummary::from_expenses(&[]);
        assert_eq!(summary.body(), "No expenses were added today.");
    }

    #[test]
    fn test_missing_project_falls_back_to_unknown() {
        let expenses = [expense("10.00", None), expense("5.50", None)];
        let summary = ExpenseSummary::from_expenses(&expenses);

        assert_eq!(summary.project_names, vec![String::from("Unknown")]);
        assert!(summary.body().contains("Projects: Unknown"));
    }

    #[test]
    fn test_total_renders_with_two_decimal_places() {
        let summary = ExpenseSummary::from_expenses(&[expense("100", Some("Garden"))]);
        assert!(summary.body().contains("₹100.00"));
    }
}
