use diesel::{ExpressionMethods, JoinOnDsl, QueryDsl, Queryable, RunQueryDsl};
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};

use crate::schema::expense_notification_settings as settings_fields;
use crate::schema::expense_notification_settings::dsl::expense_notification_settings;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

/// A user who has opted into the daily expense summary, joined to the token
/// the dispatch would use. The token stays `Option` so the run logic can log
/// a warning for tokenless users rather than silently dropping them.
#[derive(Clone, Debug, Queryable)]
pub struct DailySummaryRecipient {
    pub user_id: Uuid,
    pub user_name: String,
    pub device_token: Option<String>,
    pub daily_summary_time: String,
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

    /// Settings rows with notifications enabled and the daily summary opted
    /// in, inner-joined to their (non-soft-deleted) owning user. Users
    /// without a settings row default to the summary being off, so the inner
    /// join is exactly the defaults semantics.
    pub fn get_daily_summary_recipients(&self) -> Result<Vec<DailySummaryRecipient>, DaoError> {
        Ok(expense_notification_settings
            .inner_join(users.on(user_fields::id.eq(settings_fields::user_id)))
            .select((
                user_fields::id,
                user_fields::name,
                user_fields::device_token,
                settings_fields::daily_summary_time,
            ))
            .filter(settings_fields::enabled.eq(true))
            .filter(settings_fields::notify_daily_summary.eq(true))
            .filter(user_fields::deleted_timestamp.is_null())
            .load::<DailySummaryRecipient>(&mut self.db_thread_pool.get()?)?)
    }
}
