use chrono::NaiveDate;
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::user::User;
use crate::schema::reminders;

/// A user-owned reminder. `date` is date-only; `days_before` asks for the
/// notification to fire that many days ahead of `date` (0 = on the day
/// itself); `is_repeated` recurs monthly on the same day-of-month.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Associations, Identifiable, Queryable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = reminders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reminder {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub is_repeated: bool,
    pub days_before: i32,
    pub user_id: Uuid,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reminders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewReminder<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub date: NaiveDate,
    pub is_repeated: bool,
    pub days_before: i32,
    pub user_id: Uuid,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}
