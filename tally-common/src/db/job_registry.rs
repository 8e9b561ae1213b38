use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use std::time::SystemTime;

use crate::db::{DaoError, DbThreadPool};
use crate::models::job_registry_item::NewJobRegistryItem;
use crate::schema::job_registry as job_registry_fields;
use crate::schema::job_registry::dsl::job_registry;

/// Persistence for job run windows. The scheduler reads a job's last-run
/// timestamp at registration and writes it on every execution, so a restart
/// resumes each window instead of re-running everything immediately.
pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// `None` means the job has never run (or the registry row was pruned);
    /// callers start a fresh window.
    pub fn get_job_last_run_timestamp(&self, name: &str) -> Result<Option<SystemTime>, DaoError> {
        Ok(job_registry
            .select(job_registry_fields::last_run_timestamp)
            .filter(job_registry_fields::job_name.eq(name))
            .first(&mut self.db_thread_pool.get()?)
            .optional()?)
    }

    pub fn set_job_last_run_timestamp(
        &self,
        job_name: &str,
        timestamp: SystemTime,
    ) -> Result<(), DaoError> {
        let registry_item = NewJobRegistryItem {
            job_name,
            last_run_timestamp: timestamp,
        };

        dsl::insert_into(job_registry)
            .values(&registry_item)
            .on_conflict(job_registry_fields::job_name)
            .do_update()
            .set(job_registry_fields::last_run_timestamp.eq(timestamp))
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils::unconnected_db_pool;

    #[test]
    fn test_read_without_database_reports_pool_failure() {
        let dao = Dao::new(&unconnected_db_pool());

        let err = dao
            .get_job_last_run_timestamp("Reminder Check")
            .expect_err("checkout from an unreachable pool must fail");

        assert!(matches!(err, DaoError::DbThreadPoolFailure(_)));
    }

    #[test]
    fn test_write_without_database_reports_pool_failure() {
        let dao = Dao::new(&unconnected_db_pool());

        let err = dao
            .set_job_last_run_timestamp("Daily Expense Summary", SystemTime::now())
            .expect_err("checkout from an unreachable pool must fail");

        assert!(matches!(err, DaoError::DbThreadPoolFailure(_)));
    }
}
