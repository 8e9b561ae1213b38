use tally_common::db::job_registry::Dao as JobRegistryDao;
use tally_common::db::DbThreadPool;

use futures::future;
use std::time::{Duration, Instant, SystemTime};
use tokio::time;

use crate::jobs::Job;

struct JobContainer {
    job: Box<dyn Job>,
    run_frequency: Duration,
    last_run_time: SystemTime,
}

/// Polls registered jobs on a fixed cadence and executes those whose
/// frequency has elapsed since their last recorded run. Last-run timestamps
/// are persisted in the job registry, so a restart does not re-run a job
/// before its window has passed.
pub struct JobRunner {
    jobs: Vec<JobContainer>,
    update_frequency: Duration,
    db_thread_pool: DbThreadPool,
}

impl JobRunner {
    pub fn new(update_frequency: Duration, db_thread_pool: DbThreadPool) -> Self {
        Self {
            jobs: Vec::new(),
            update_frequency,
            db_thread_pool,
        }
    }

    pub async fn register(&mut self, job: Box<dyn Job>, run_frequency: Duration) {
        let job_name = job.name();

        log::info!(
            "Registered job \"{}\" to run every {} seconds",
            job_name,
            run_frequency.as_secs()
        );

        let dao = JobRegistryDao::new(&self.db_thread_pool);
        let last_run_time = tokio::task::spawn_blocking(move || {
            dao.get_job_last_run_timestamp(job_name).unwrap_or_else(|e| {
                log::error!("Failed to get last run timestamp for job \"{job_name}\": {e}");
                None
            })
        })
        .await
        .unwrap_or_else(|e| {
            log::error!("Failed to join Tokio task: {e}");
            None
        });

        self.jobs.push(JobContainer {
            job,
            run_frequency,
            // An unknown job starts its window now rather than running
            // immediately
            last_run_time: last_run_time.unwrap_or_else(SystemTime::now),
        });
    }

    pub async fn start(&mut self) -> ! {
        loop {
            let before = Instant::now();

            let mut job_names = Vec::with_capacity(self.jobs.len());
            let mut job_futures = Vec::with_capacity(self.jobs.len());
            let mut record_run_futures = Vec::with_capacity(self.jobs.len());

            for container in &mut self.jobs {
                let elapsed_since_last_run = SystemTime::now()
                    .duration_since(container.last_run_time)
                    .unwrap_or(Duration::from_nanos(0));

                if elapsed_since_last_run < container.run_frequency || !container.job.is_ready() {
                    continue;
                }

                let name = container.job.name();
                log::info!("Executing job \"{name}\"");

                let run_time = SystemTime::now();
                container.last_run_time = run_time;

                job_names.push(name);
                job_futures.push(container.job.execute());

                let dao = JobRegistryDao::new(&self.db_thread_pool);
                record_run_futures.push(tokio::task::spawn_blocking(move || {
                    dao.set_job_last_run_timestamp(name, run_time)
                }));
            }

            let (job_results, recording_results) = future::join(
                future::join_all(job_futures),
                future::join_all(record_run_futures),
            )
            .await;

            for (i, result) in job_results.into_iter().enumerate() {
                match result {
                    Ok(()) => log::info!("Job \"{}\" finished successfully", job_names[i]),
                    Err(e) => log::error!("Job \"{}\" failed: {}", job_names[i], e),
                }
            }

            for result in recording_results.into_iter() {
                let flattened = match result {
                    Ok(r) => r.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };

                if let Err(e) = flattened {
                    log::error!("Error recording job run: {e}");
                }
            }

            let delta = Instant::now() - before;

            if delta < self.update_frequency {
                time::sleep(self.update_frequency - delta).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::jobs::tests::{unconnected_db_pool, MockJob};

    #[tokio::test]
    async fn test_register() {
        let mut job_runner = JobRunner::new(Duration::from_millis(5), unconnected_db_pool());
        assert_eq!(job_runner.update_frequency, Duration::from_millis(5));
        assert!(job_runner.jobs.is_empty());

        job_runner
            .register(Box::new(MockJob::new()), Duration::from_millis(20))
            .await;
        assert_eq!(job_runner.jobs.len(), 1);

        job_runner
            .register(Box::new(MockJob::new()), Duration::from_millis(40))
            .await;
        assert_eq!(job_runner.jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_start_runs_jobs_when_frequency_elapses() {
        let mut job_runner = JobRunner::new(Duration::from_millis(10), unconnected_db_pool());

        let job = MockJob::new();
        let run_count = Arc::clone(&job.runs);

        job_runner
            .register(Box::new(job), Duration::from_millis(60))
            .await;

        // The registry lookup failed (no database), so the job's window
        // starts at registration time
        assert_eq!(*run_count.lock().unwrap(), 0);

        tokio::task::spawn(async move { job_runner.start().await });

        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*run_count.lock().unwrap(), 0);

        time::sleep(Duration::from_millis(120)).await;
        assert!(*run_count.lock().unwrap() >= 1);
    }
}
