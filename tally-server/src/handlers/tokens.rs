use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tally_common::db::{self, DbThreadPool};
use tally_common::push::{plausible_token_format, PushKind};
use tally_common::push::dispatcher::Dispatcher;
use uuid::Uuid;

use crate::env;
use crate::handlers::key_matches;

use super::jobs::TriggerKeyQuery;

const TOKEN_PREVIEW_LEN: usize = 20;

#[derive(Deserialize)]
pub struct TestSendInput {
    pub user_id: Uuid,
    pub title: Option<String>,
    pub body: Option<String>,
}

pub async fn get_stats(
    db_thread_pool: web::Data<DbThreadPool>,
    query: web::Query<TriggerKeyQuery>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let user_dao = db::user::Dao::new(&db_thread_pool);
    let stats = match web::block(move || user_dao.get_device_token_stats()).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            log::error!("Failed to collect device token stats: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to collect stats" }));
        }
        Err(e) => {
            log::error!("Failed to collect device token stats: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to collect stats" }));
        }
    };

    HttpResponse::Ok().json(json!({ "success": true, "stats": stats }))
}

/// Lists users that currently hold a device token. Tokens are abbreviated so
/// the full credential never leaves the server.
pub async fn list_tokens(
    db_thread_pool: web::Data<DbThreadPool>,
    query: web::Query<TriggerKeyQuery>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let user_dao = db::user::Dao::new(&db_thread_pool);
    let targets = match web::block(move || user_dao.get_users_with_device_tokens()).await {
        Ok(Ok(t)) => t,
        Ok(Err(e)) => {
            log::error!("Failed to list device tokens: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to list tokens" }));
        }
        Err(e) => {
            log::error!("Failed to list device tokens: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to list tokens" }));
        }
    };

    let users: Vec<_> = targets
        .iter()
        .map(|t| {
            let token = t.device_token.as_deref().unwrap_or_default();
            json!({
                "id": t.id,
                "name": t.name,
                "token_preview": token_preview(token),
                "token_looks_valid": plausible_token_format(token),
            })
        })
        .collect();

    HttpResponse::Ok().json(json!({ "success": true, "count": users.len(), "users": users }))
}

pub async fn clear_all(
    db_thread_pool: web::Data<DbThreadPool>,
    query: web::Query<TriggerKeyQuery>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let user_dao = db::user::Dao::new(&db_thread_pool);
    let cleared = match web::block(move || user_dao.clear_all_device_tokens()).await {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            log::error!("Failed to clear device tokens: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to clear tokens" }));
        }
        Err(e) => {
            log::error!("Failed to clear device tokens: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to clear tokens" }));
        }
    };

    log::info!("Cleared device tokens for {cleared} users");
    HttpResponse::Ok().json(json!({ "success": true, "cleared": cleared }))
}

/// Sends a single test notification to one user so operators can verify the
/// push pipeline end to end.
pub async fn test_send(
    db_thread_pool: web::Data<DbThreadPool>,
    dispatcher: web::Data<Dispatcher>,
    query: web::Query<TriggerKeyQuery>,
    input: web::Json<TestSendInput>,
) -> impl Responder {
    if !key_matches(env::CONF.trigger_key.as_deref(), query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let user_id = input.user_id;
    let user_dao = db::user::Dao::new(&db_thread_pool);
    let target = match web::block(move || user_dao.get_notification_target(user_id)).await {
        Ok(Ok(t)) => t,
        Ok(Err(e)) => {
            log::error!("Failed to look up user {user_id} for test send: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to look up user" }));
        }
        Err(e) => {
            log::error!("Failed to look up user {user_id} for test send: {e}");
            return HttpResponse::InternalServerError()
                .json(json!({ "success": false, "message": "Failed to look up user" }));
        }
    };

    let Some(target) = target else {
        return HttpResponse::NotFound()
            .json(json!({ "success": false, "message": "User not found" }));
    };

    let Some(token) = target.device_token else {
        return HttpResponse::BadRequest()
            .json(json!({ "success": false, "message": "User has no device token" }));
    };

    let title = input.title.as_deref().unwrap_or("Test Notification");
    let body = input
        .body
        .as_deref()
        .unwrap_or("If you can read this, push notifications are working.");

    let outcome = dispatcher
        .send_to_user(target.id, &token, PushKind::Test, title, body)
        .await;

    let resp_body = json!({
        "success": outcome.success,
        "message": outcome.message,
        "message_id": outcome.message_id,
        "error_code": outcome.error_code,
        "token_cleared": outcome.token_cleared,
    });

    if outcome.success {
        HttpResponse::Ok().json(resp_body)
    } else {
        HttpResponse::BadGateway().json(resp_body)
    }
}

fn token_preview(token: &str) -> String {
    if token.len() <= TOKEN_PREVIEW_LEN {
        return String::from(token);
    }

    let end = token
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= TOKEN_PREVIEW_LEN)
        .last()
        .unwrap_or(0);

    format!("{}...", &token[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview_abbreviates_long_tokens() {
        let token = "a".repeat(160);
        let preview = token_preview(&token);

        assert_eq!(preview.len(), TOKEN_PREVIEW_LEN + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_token_preview_leaves_short_tokens_alone() {
        assert_eq!(token_preview("short"), "short");
        assert_eq!(token_preview(""), "");
    }
}
