use chrono::NaiveDate;
use diesel::{BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::reminder::Reminder;

use crate::schema::reminders as reminder_fields;
use crate::schema::reminders::dsl::reminders;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Fetches the candidate set for a scheduling run: every active reminder
    /// that is due today, repeats, or carries a days-before offset. The
    /// per-reminder eligibility decision happens in the run logic; this query
    /// only narrows out soft-deleted rows.
    pub fn get_scheduling_candidates(&self, today: NaiveDate) -> Result<Vec<Reminder>, DaoError> {
        Ok(reminders
            .filter(reminder_fields::deleted_timestamp.is_null())
            .filter(
                reminder_fields::date
                    .eq(today)
                    .or(reminder_fields::is_repeated.eq(true))
                    .or(reminder_fields::days_before.ge(0)),
            )
            .load::<Reminder>(&mut self.db_thread_pool.get()?)?)
    }
}
