use actix_web::web::*;

use crate::handlers::{health, jobs, tokens};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .route("/heartbeat", get().to(health::heartbeat))
            .route("/health", get().to(health::health))
            .service(
                scope("/jobs")
                    .route("/reminder-check", get().to(jobs::run_reminder_check))
                    .route("/expense-summary", get().to(jobs::run_expense_summary)),
            )
            .service(
                scope("/tokens")
                    .route("", get().to(tokens::list_tokens))
                    .route("", delete().to(tokens::clear_all))
                    .route("/stats", get().to(tokens::get_stats))
                    .route("/test-send", post().to(tokens::test_send)),
            ),
    );
}
