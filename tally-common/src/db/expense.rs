use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use diesel::{
    ExpressionMethods, JoinOnDsl, NullableExpressionMethods, QueryDsl, Queryable, RunQueryDsl,
};
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};

use crate::schema::expenses as expense_fields;
use crate::schema::expenses::dsl::expenses;
use crate::schema::projects as project_fields;
use crate::schema::projects::dsl::projects;

/// An expense row narrowed to what the daily summary needs, with the project
/// name joined in (`None` when the project row is gone).
#[derive(Clone, Debug, Queryable)]
pub struct SummaryExpense {
    pub id: Uuid,
    pub amount: BigDecimal,
    pub project_name: Option<String>,
}

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Non-soft-deleted expenses paid by `payer_id` with a date inside
    /// `[day 00:00, day+1 00:00)`.
    pub fn get_expenses_for_payer_on_day(
        &self,
        payer_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<SummaryExpense>, DaoError> {
        let day_start: NaiveDateTime = day.and_time(NaiveTime::MIN);
        let next_day_start: NaiveDateTime = day
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN);

        Ok(expenses
            .left_join(projects.on(project_fields::id.eq(expense_fields::project_id)))
            .select((
                expense_fields::id,
                expense_fields::amount,
                project_fields::name.nullable(),
            ))
            .filter(expense_fields::paid_by.eq(payer_id))
            .filter(expense_fields::deleted_timestamp.is_null())
            .filter(expense_fields::date.ge(day_start))
            .filter(expense_fields::date.lt(next_day_start))
            .load::<SummaryExpense>(&mut self.db_thread_pool.get()?)?)
    }
}
