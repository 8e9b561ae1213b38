use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use std::sync::Arc;
use zeroize::Zeroizing;

use tally_common::db::create_db_thread_pool;
use tally_common::push::dispatcher::Dispatcher;
use tally_common::push::senders::{FcmSender, MockSender};
use tally_common::push::SendPush;

mod env;
mod jobs;
mod runner;

use jobs::{summary_run_frequency, DailyExpenseSummaryJob, ReminderCheckJob};
use runner::JobRunner;

fn main() {
    let db_uri = Zeroizing::new(format!(
        "postgres://{}:{}@{}:{}/{}",
        env::CONF.db_username,
        env::CONF.db_password,
        env::CONF.db_hostname,
        env::CONF.db_port,
        env::CONF.db_name,
    ));

    let db_thread_pool = create_db_thread_pool(
        &db_uri,
        env::CONF.db_max_connections,
        env::CONF.db_idle_timeout,
    );

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(env::CONF.worker_threads)
        .max_blocking_threads(env::CONF.max_blocking_threads)
        .enable_all()
        .build()
        .expect("Failed to launch asynchronous runtime")
        .block_on(async move {
            Logger::try_with_str(&env::CONF.log_level)
                .expect(
                    "Invalid log level. Options: ERROR, WARN, INFO, DEBUG, TRACE. \
                     Example: `info, my::critical::module=trace`",
                )
                .log_to_file(FileSpec::default().directory("./logs"))
                .rotate(
                    Criterion::Age(Age::Day),
                    Naming::Timestamps,
                    Cleanup::KeepLogAndCompressedFiles(7, env::CONF.log_retention_days),
                )
                .cleanup_in_background_thread(true)
                .duplicate_to_stdout(Duplicate::All)
                .write_mode(WriteMode::BufferAndFlush)
                .format(|writer, now, record| {
                    write!(
                        writer,
                        "{:5} | {} | {}:{} | {}",
                        record.level(),
                        now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                        record.module_path().unwrap_or("<unknown>"),
                        record.line().unwrap_or(0),
                        record.args()
                    )
                })
                .use_utc()
                .start()
                .expect("Failed to start logger");

            let push_sender: Arc<dyn SendPush> = if env::CONF.push_enabled {
                Arc::new(FcmSender::new(env::CONF.fcm_server_key.clone()))
            } else {
                log::warn!("Push delivery is disabled. Notifications will be dropped.");
                Arc::new(MockSender::new())
            };

            let dispatcher = Arc::new(Dispatcher::new(push_sender, &db_thread_pool));

            let mut job_runner =
                JobRunner::new(env::CONF.runner_update_frequency, db_thread_pool.clone());

            job_runner
                .register(
                    Box::new(ReminderCheckJob::new(
                        db_thread_pool.clone(),
                        Arc::clone(&dispatcher),
                    )),
                    env::CONF.reminder_check_frequency,
                )
                .await;

            job_runner
                .register(
                    Box::new(DailyExpenseSummaryJob::new(
                        db_thread_pool.clone(),
                        Arc::clone(&dispatcher),
                    )),
                    summary_run_frequency(
                        env::CONF.expense_summary_frequency,
                        env::CONF.runner_update_frequency,
                    ),
                )
                .await;

            job_runner.start().await;
        });

    unsafe {
        env::CONF.zeroize();
    }
}
