use chrono::Local;
use std::sync::Arc;

use tally_common::db::DbThreadPool;
use tally_common::notify::reminder_check;
use tally_common::push::dispatcher::Dispatcher;

use crate::jobs::{Job, JobError};

use async_trait::async_trait;

/// Daily scan of all active reminders; dispatches a notification for each
/// reminder due today.
pub struct ReminderCheckJob {
    db_thread_pool: DbThreadPool,
    dispatcher: Arc<Dispatcher>,
    is_running: bool,
}

impl ReminderCheckJob {
    pub fn new(db_thread_pool: DbThreadPool, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            db_thread_pool,
            dispatcher,
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ReminderCheckJob {
    fn name(&self) -> &'static str {
        "Reminder Check"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let today = Local::now().date_naive();
        let result = reminder_check::run(&self.dispatcher, &self.db_thread_pool, today).await;

        self.is_running = false;
        result.map(|_| ()).map_err(JobError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_common::push::senders::MockSender;

    use crate::jobs::tests::unconnected_db_pool;

    #[tokio::test]
    async fn test_execute_fails_cleanly_without_database_and_stays_ready() {
        let pool = unconnected_db_pool();
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(MockSender::new()), &pool));
        let mut job = ReminderCheckJob::new(pool, dispatcher);

        assert!(job.is_ready());
        assert!(job.execute().await.is_err());

        // A failed run must leave the job ready for the next cycle
        assert!(job.is_ready());
    }
}
