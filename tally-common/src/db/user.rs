use diesel::{dsl, ExpressionMethods, QueryDsl, Queryable, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};

use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

/// The subset of a user the notification path needs.
#[derive(Clone, Debug, Queryable)]
pub struct NotificationTarget {
    pub id: Uuid,
    pub name: String,
    pub device_token: Option<String>,
}

/// Device-token coverage across non-deleted users.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceTokenStats {
    pub total_users: i64,
    pub users_with_tokens: i64,
    pub users_without_tokens: i64,
    pub percentage_with_tokens: f64,
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

    /// Fetches the notification subset for a non-soft-deleted user. `None`
    /// means the user is missing or deleted; callers treat that as a lookup
    /// miss, not an error.
    pub fn get_notification_target(
        &self,
        user_id: Uuid,
    ) -> Result<Option<NotificationTarget>, DaoError> {
        use diesel::OptionalExtension;

        Ok(users
            .select((
                user_fields::id,
                user_fields::name,
                user_fields::device_token,
            ))
            .find(user_id)
            .filter(user_fields::deleted_timestamp.is_null())
            .get_result(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    /// Unconditionally nulls the stored device token. Clearing an
    /// already-cleared token is a no-op, so repeated calls are safe.
    pub fn clear_device_token(&self, user_id: Uuid) -> Result<(), DaoError> {
        dsl::update(users.find(user_id))
            .set(user_fields::device_token.eq(None::<String>))
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(())
    }

    /// Clears every stored device token. Used by operational tooling when
    /// switching push-provider projects invalidates the whole token set.
    pub fn clear_all_device_tokens(&self) -> Result<usize, DaoError> {
        Ok(dsl::update(
            users
                .filter(user_fields::device_token.is_not_null())
                .filter(user_fields::deleted_timestamp.is_null()),
        )
        .set(user_fields::device_token.eq(None::<String>))
        .execute(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_device_token_stats(&self) -> Result<DeviceTokenStats, DaoError> {
        let mut conn = self.db_thread_pool.get()?;

        let total_users = users
            .filter(user_fields::deleted_timestamp.is_null())
            .count()
            .get_result::<i64>(&mut conn)?;

        let users_with_tokens = users
            .filter(user_fields::deleted_timestamp.is_null())
            .filter(user_fields::device_token.is_not_null())
            .count()
            .get_result::<i64>(&mut conn)?;

        let percentage_with_tokens = if total_users > 0 {
            (users_with_tokens as f64 / total_users as f64) * 100.0
        } else {
            0.0
        };

        Ok(DeviceTokenStats {
            total_users,
            users_with_tokens,
            users_without_tokens: total_users - users_with_tokens,
            percentage_with_tokens,
        })
    }

    /// Lists the users a test notification could be dispatched to.
    pub fn get_users_with_device_tokens(&self) -> Result<Vec<NotificationTarget>, DaoError> {
        Ok(users
            .select((
                user_fields::id,
                user_fields::name,
                user_fields::device_token,
            ))
            .filter(user_fields::device_token.is_not_null())
            .filter(user_fields::deleted_timestamp.is_null())
            .order(user_fields::created_timestamp.asc())
            .load(&mut self.db_thread_pool.get()?)?)
    }
}
