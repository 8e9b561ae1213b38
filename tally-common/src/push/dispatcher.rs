use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{user::Dao as UserDao, DbThreadPool};
use crate::oplog;
use crate::push::{PushKind, PushMessage, SendPush};

/// What happened to one dispatch attempt. Callers always get one of these;
/// the dispatcher never lets an error escape its boundary.
#[derive(Clone, Debug)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
    pub message_id: Option<String>,
    pub error_code: Option<String>,
    pub token_cleared: bool,
}

/// Sends single push messages and applies token hygiene when the provider
/// reports a permanently dead token. Delivery is fire-and-forget: at most
/// once, no retry, no backoff.
pub struct Dispatcher {
    sender: Arc<dyn SendPush>,
    db_thread_pool: DbThreadPool,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn SendPush>, db_thread_pool: &DbThreadPool) -> Self {
        Self {
            sender,
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub async fn send_to_user(
        &self,
        user_id: Uuid,
        token: &str,
        kind: PushKind,
        title: &str,
        body: &str,
    ) -> DispatchOutcome {
        let result = self
            .sender
            .send(PushMessage {
                token,
                title,
                body,
                kind,
            })
            .await;

        let error = match result {
            Ok(message_id) => {
                oplog::success(
                    "Notification sent",
                    Some(&json!({
                        "user_id": user_id,
                        "type": kind.as_str(),
                        "message_id": message_id,
                    })),
                );

                return DispatchOutcome {
                    success: true,
                    message: format!("Notification sent to user {user_id}"),
                    message_id: Some(message_id),
                    error_code: None,
                    token_cleared: false,
                };
            }
            Err(e) => e,
        };

        oplog::error(
            "Notification dispatch failed",
            Some(&json!({
                "user_id": user_id,
                "type": kind.as_str(),
                "error_code": error.code(),
                "permanent": error.is_permanent(),
                "error": error.to_string(),
            })),
        );

        let mut token_cleared = false;

        if error.is_permanent() {
            token_cleared = self.clear_dead_token(user_id).await;
        }

        DispatchOutcome {
            success: false,
            message: error.to_string(),
            message_id: None,
            error_code: Some(String::from(error.code())),
            token_cleared,
        }
    }

    /// Token hygiene for a provider-reported dead token. Failures here are
    /// logged and swallowed; the dispatch outcome has already been decided.
    async fn clear_dead_token(&self, user_id: Uuid) -> bool {
        let dao = UserDao::new(&self.db_thread_pool);

        let clear_result =
            tokio::task::spawn_blocking(move || dao.clear_device_token(user_id)).await;

        match clear_result {
            Ok(Ok(())) => {
                oplog::warn(
                    "Cleared invalid device token",
                    Some(&json!({ "user_id": user_id })),
                );
                true
            }
            Ok(Err(e)) => {
                oplog::error(
                    "Failed to clear invalid device token",
                    Some(&json!({ "user_id": user_id, "error": e.to_string() })),
                );
                false
            }
            Err(e) => {
                oplog::error(
                    "Failed to join token hygiene task",
                    Some(&json!({ "user_id": user_id, "error": e.to_string() })),
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils::unconnected_db_pool;
    use crate::push::senders::MockSender;

    const TEST_TOKEN: &str = "test-device-token";

    #[tokio::test]
    async fn test_send_to_user_success() {
        let sender = Arc::new(MockSender::new());
        let dispatcher = Dispatcher::new(sender.clone(), &unconnected_db_pool());

        let outcome = dispatcher
            .send_to_user(
                Uuid::now_v7(),
                TEST_TOKEN,
                PushKind::Reminder,
                "Rent",
                "Rent is due tomorrow",
            )
            .await;

        assert!(outcome.success);
        assert!(outcome.message_id.is_some());
        assert!(outcome.error_code.is_none());
        assert!(!outcome.token_cleared);

        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, TEST_TOKEN);
        assert_eq!(sent[0].title, "Rent");
        assert_eq!(sent[0].kind, PushKind::Reminder);
    }

    #[tokio::test]
    async fn test_permanent_failure_reports_code_and_attempts_hygiene() {
        let sender = Arc::new(MockSender::failing_with("NotRegistered"));
        let dispatcher = Dispatcher::new(sender.clone(), &unconnected_db_pool());

        let outcome = dispatcher
            .send_to_user(
                Uuid::now_v7(),
                TEST_TOKEN,
                PushKind::Expense,
                "Daily Expense Summary",
                "No expenses were added today.",
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code.as_deref(), Some("NotRegistered"));
        // The hygiene write itself fails here (no reachable database), which
        // must not escape the dispatcher.
        assert!(!outcome.token_cleared);
        assert_eq!(sender.send_attempts(), 1);
        assert!(sender.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_skips_hygiene() {
        let sender = Arc::new(MockSender::failing_with("Unavailable"));
        let dispatcher = Dispatcher::new(sender.clone(), &unconnected_db_pool());

        let outcome = dispatcher
            .send_to_user(
                Uuid::now_v7(),
                TEST_TOKEN,
                PushKind::Test,
                "Test Notification",
                "This is a test notification from the server",
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code.as_deref(), Some("Unavailable"));
        assert!(!outcome.token_cleared);
    }
}
