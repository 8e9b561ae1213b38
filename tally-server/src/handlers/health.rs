use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tally_common::db::DbThreadPool;

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(db_thread_pool: web::Data<DbThreadPool>) -> impl Responder {
    let pool_state = db_thread_pool.state();
    let resp_body = json!({
        "db_thread_pool_state": {
            "connections": pool_state.connections,
            "idle_connections": pool_state.idle_connections
        }
    });

    HttpResponse::Ok().json(resp_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self, TestRequest};
    use actix_web::App;

    #[actix_web::test]
    async fn test_heartbeat() {
        let app = test::init_service(
            App::new().route("/heartbeat", actix_web::web::get().to(heartbeat)),
        )
        .await;

        let req = TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }
}
