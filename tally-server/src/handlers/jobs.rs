use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tally_common::db::DbThreadPool;
use tally_common::notify::{expense_summary, reminder_check};
use tally_common::push::dispatcher::Dispatcher;

use crate::env;
use crate::handlers::key_matches;

#[derive(Deserialize)]
pub struct TriggerKeyQuery {
    pub key: Option<String>,
}

pub async fn run_reminder_check(
    db_thread_pool: web::Data<DbThreadPool>,
    dispatcher: web::Data<Dispatcher>,
    query: web::Query<TriggerKeyQuery>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let today = Local::now().date_naive();

    match reminder_check::run(&dispatcher, &db_thread_pool, today).await {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Reminder check completed",
            "scanned": summary.scanned,
            "dispatched": summary.dispatched,
            "skipped": summary.skipped,
            "timestamp": Local::now().to_rfc3339(),
        })),
        Err(e) => {
            log::error!("Manually-triggered reminder check failed: {e}");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Reminder check failed",
            }))
        }
    }
}

pub async fn run_expense_summary(
    db_thread_pool: web::Data<DbThreadPool>,
    dispatcher: web::Data<Dispatcher>,
    query: web::Query<TriggerKeyQuery>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let now = Local::now().naive_local();

    match expense_summary::run(&dispatcher, &db_thread_pool, now).await {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Expense summary run completed",
            "recipients": summary.recipients,
            "dispatched": summary.dispatched,
            "skipped": summary.skipped,
            "timestamp": Local::now().to_rfc3339(),
        })),
        Err(e) => {
            log::error!("Manually-triggered expense summary run failed: {e}");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Expense summary run failed",
            }))
        }
    }
}
