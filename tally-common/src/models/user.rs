use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::users;

/// A user who can own reminders and expenses. `device_token` being `None`
/// means the user cannot be notified; senders treat that as a silent no-op.
#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub device_token: Option<String>,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub device_token: Option<&'a str>,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}
