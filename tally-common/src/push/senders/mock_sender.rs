use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::push::{classify_provider_error, PushError, PushKind, PushMessage, SendPush};

/// An owned copy of a message a `MockSender` accepted.
#[derive(Clone, Debug)]
pub struct SentMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub kind: PushKind,
}

/// In-process sender used by tests and by deployments that run with push
/// disabled. Records every accepted message; can be configured to fail every
/// send with a given provider error code.
#[derive(Default)]
pub struct MockSender {
    sent: Mutex<Vec<SentMessage>>,
    fail_with_code: Option<&'static str>,
    send_count: AtomicUsize,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every send fails with the given provider error code.
    pub fn failing_with(code: &'static str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with_code: Some(code),
            send_count: AtomicUsize::new(0),
        }
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .expect("Mock sender mutex was poisoned")
            .clone()
    }

    /// Total send attempts, including failed ones.
    pub fn send_attempts(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SendPush for MockSender {
    async fn send(&self, message: PushMessage<'_>) -> Result<String, PushError> {
        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst);

        if let Some(code) = self.fail_with_code {
            return Err(classify_provider_error(code, "Mock sender failure"));
        }

        self.sent
            .lock()
            .expect("Mock sender mutex was poisoned")
            .push(SentMessage {
                token: String::from(message.token),
                title: String::from(message.title),
                body: String::from(message.body),
                kind: message.kind,
            });

        Ok(format!("mock-message-{attempt}"))
    }
}
