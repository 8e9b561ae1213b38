use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::time::Duration;

use crate::push::{classify_provider_error, PushError, PushMessage, SendPush};

const FCM_SEND_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Binding to the FCM HTTP send API. Messages are marked high priority for
/// Android and content-available for iOS so delivery is immediate on both
/// platforms.
pub struct FcmSender {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmSender {
    pub fn new(server_key: String) -> Self {
        Self::with_endpoint(server_key, String::from(FCM_SEND_ENDPOINT))
    }

    pub fn with_endpoint(server_key: String, endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client for FCM sender");

        Self {
            client,
            endpoint,
            server_key,
        }
    }
}

#[async_trait]
impl SendPush for FcmSender {
    async fn send(&self, message: PushMessage<'_>) -> Result<String, PushError> {
        let payload = json!({
            "to": message.token,
            "priority": "high",
            "content_available": true,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": {
                "title": message.title,
                "body": message.body,
                "type": message.kind.as_str(),
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Transient {
                code: String::from("NetworkError"),
                message: e.to_string(),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(PushError::Transient {
                code: String::from("Unauthorized"),
                message: String::from("Provider rejected the server credentials"),
            });
        }

        if !status.is_success() {
            return Err(PushError::Transient {
                code: String::from("InternalServerError"),
                message: format!("Provider returned status {status}"),
            });
        }

        let body: serde_json::Value =
            response.json().await.map_err(|e| PushError::Transient {
                code: String::from("InvalidResponse"),
                message: e.to_string(),
            })?;

        let result = &body["results"][0];

        if let Some(code) = result["error"].as_str() {
            return Err(classify_provider_error(
                code,
                "Provider reported a send failure",
            ));
        }

        match result["message_id"].as_str() {
            Some(id) => Ok(String::from(id)),
            None => Err(PushError::Transient {
                code: String::from("InvalidResponse"),
                message: String::from("Provider response carried no message id"),
            }),
        }
    }
}
