use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::user::User;
use crate::schema::expense_notification_settings;

/// Time of day the daily summary defaults to when a user opts in without
/// picking one.
pub const DEFAULT_DAILY_SUMMARY_TIME: &str = "18:00";

/// Per-user expense notification preferences, one-to-one with users. A user
/// without a row gets the defaults below (everything on except the daily
/// summary), so queries that require `notify_daily_summary` can simply join
/// on existing rows.
#[derive(
    Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = expense_notification_settings, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExpenseNotificationSettings {
    pub user_id: Uuid,
    pub enabled: bool,
    pub notify_on_add: bool,
    pub notify_on_update: bool,
    pub notify_on_delete: bool,
    pub notify_daily_summary: bool,
    pub daily_summary_time: String,
    pub created_timestamp: SystemTime,
}

impl ExpenseNotificationSettings {
    /// The settings implied by an absent row.
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            enabled: true,
            notify_on_add: true,
            notify_on_update: true,
            notify_on_delete: true,
            notify_daily_summary: false,
            daily_summary_time: String::from(DEFAULT_DAILY_SUMMARY_TIME),
            created_timestamp: SystemTime::now(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = expense_notification_settings, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewExpenseNotificationSettings<'a> {
    pub user_id: Uuid,
    pub enabled: bool,
    pub notify_on_add: bool,
    pub notify_on_update: bool,
    pub notify_on_delete: bool,
    pub notify_daily_summary: bool,
    pub daily_summary_time: &'a str,
    pub created_timestamp: SystemTime,
}
