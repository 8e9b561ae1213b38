use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::user::User;
use crate::schema::expenses;

/// A project-scoped expense. `amount` is a decimal (`Numeric` column) so
/// summary totals stay exact. `file_key` references an attached receipt in
/// object storage, if any.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable,
)]
#[diesel(belongs_to(Project, foreign_key = project_id))]
#[diesel(belongs_to(User, foreign_key = paid_by))]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Expense {
    pub id: Uuid,
    pub project_id: Uuid,
    pub description: String,
    pub amount: BigDecimal,
    pub date: NaiveDateTime,
    pub paid_by: Uuid,
    pub file_key: Option<String>,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewExpense<'a> {
    pub id: Uuid,
    pub project_id: Uuid,
    pub description: &'a str,
    pub amount: &'a BigDecimal,
    pub date: NaiveDateTime,
    pub paid_by: Uuid,
    pub file_key: Option<&'a str>,
    pub created_timestamp: SystemTime,
    pub deleted_timestamp: Option<SystemTime>,
}
