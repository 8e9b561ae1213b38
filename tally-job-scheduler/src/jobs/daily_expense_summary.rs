use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use tally_common::db::DbThreadPool;
use tally_common::notify::expense_summary;
use tally_common::push::dispatcher::Dispatcher;

use crate::jobs::{Job, JobError};

use async_trait::async_trait;

/// Hourly check of daily-summary subscribers; users whose configured hour
/// matches the current one get an aggregate of today's expenses.
///
/// The job remembers the last hour slot it completed, so running it more
/// than once inside the same hour cannot double-send a summary.
pub struct DailyExpenseSummaryJob {
    db_thread_pool: DbThreadPool,
    dispatcher: Arc<Dispatcher>,
    is_running: bool,
    last_completed_slot: Option<(NaiveDate, u32)>,
}

/// The hour slot `now` falls in. One summary run per slot.
fn hour_slot(now: NaiveDateTime) -> (NaiveDate, u32) {
    (now.date(), now.hour())
}

/// The run frequency to register the summary job with. The runner only
/// re-runs a job once its frequency has elapsed, checked every update
/// interval, so a nominal one-hour frequency drifts later each cycle and can
/// step over an entire hour. Registering one update interval short keeps
/// every hour slot reachable; the job's own slot guard absorbs the
/// occasional same-hour re-run this produces.
pub fn summary_run_frequency(nominal: Duration, update_frequency: Duration) -> Duration {
    cmp::max(nominal.saturating_sub(update_frequency), update_frequency)
}

impl DailyExpenseSummaryJob {
    pub fn new(db_thread_pool: DbThreadPool, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            db_thread_pool,
            dispatcher,
            is_running: false,
            last_completed_slot: None,
        }
    }

    async fn execute_at(&mut self, now: NaiveDateTime) -> Result<(), JobError> {
        let slot = hour_slot(now);

        if self.last_completed_slot == Some(slot) {
            return Ok(());
        }

        let result = expense_summary::run(&self.dispatcher, &self.db_thread_pool, now).await;

        // A failed run does not claim the slot; the next cycle retries it
        if result.is_ok() {
            self.last_completed_slot = Some(slot);
        }

        result.map(|_| ()).map_err(JobError::from)
    }
}

#[async_trait]
impl Job for DailyExpenseSummaryJob {
    fn name(&self) -> &'static str {
        "Daily Expense Summary"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let result = self.execute_at(Local::now().naive_local()).await;

        self.is_running = false;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_common::push::senders::MockSender;

    use crate::jobs::tests::unconnected_db_pool;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_fails_cleanly_without_database_and_stays_ready() {
        let pool = unconnected_db_pool();
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(MockSender::new()), &pool));
        let mut job = DailyExpenseSummaryJob::new(pool, dispatcher);

        assert!(job.is_ready());
        assert!(job.execute().await.is_err());
        assert!(job.is_ready());
    }

    #[tokio::test]
    async fn test_completed_hour_slot_is_not_rerun() {
        let pool = unconnected_db_pool();
        let sender = Arc::new(MockSender::new());
        let dispatcher = Arc::new(Dispatcher::new(sender.clone(), &pool));
        let mut job = DailyExpenseSummaryJob::new(pool, dispatcher);

        let now = datetime(2025, 3, 10, 15, 0);

        // A failed run must not claim the slot
        assert!(job.execute_at(now).await.is_err());
        assert_eq!(job.last_completed_slot, None);

        // A claimed slot short-circuits before any database or sender work,
        // which is the only way this can succeed with an unreachable pool
        job.last_completed_slot = Some(hour_slot(now));
        assert!(job.execute_at(datetime(2025, 3, 10, 15, 59)).await.is_ok());
        assert_eq!(sender.send_attempts(), 0);

        // The next hour is a fresh slot and runs again
        assert!(job.execute_at(datetime(2025, 3, 10, 16, 0)).await.is_err());
    }

    #[test]
    fn test_hour_slot_boundaries() {
        assert_eq!(
            hour_slot(datetime(2025, 3, 10, 14, 0)),
            hour_slot(datetime(2025, 3, 10, 14, 59))
        );
        assert_ne!(
            hour_slot(datetime(2025, 3, 10, 14, 59)),
            hour_slot(datetime(2025, 3, 10, 15, 0))
        );
        assert_ne!(
            hour_slot(datetime(2025, 3, 10, 14, 0)),
            hour_slot(datetime(2025, 3, 11, 14, 0))
        );
    }

    #[test]
    fn test_summary_run_frequency_stays_inside_the_hour() {
        let hour = Duration::from_secs(3600);
        let update = Duration::from_secs(30);

        assert_eq!(
            summary_run_frequency(hour, update),
            Duration::from_secs(3570)
        );

        // Never shorter than the poll interval itself
        assert_eq!(
            summary_run_frequency(Duration::from_secs(10), update),
            update
        );
        assert_eq!(summary_run_frequency(hour, Duration::from_secs(0)), hour);
    }
}
