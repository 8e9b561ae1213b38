pub mod dispatcher;
pub mod senders;

use async_trait::async_trait;
use std::fmt;

/// Provider error codes that mean a token will never be deliverable again.
/// These come from the FCM HTTP error vocabulary.
const PERMANENT_ERROR_CODES: [&str; 4] = [
    "NotRegistered",
    "InvalidRegistration",
    "MissingRegistration",
    "MismatchSenderId",
];

/// Device tokens are long opaque strings; anything shorter than this cannot
/// be a real one. A passing check proves nothing more than plausibility --
/// true validity can only be established by a live send attempt.
const MIN_PLAUSIBLE_TOKEN_LEN: usize = 100;

#[derive(Debug)]
pub enum PushError {
    /// The token will never again be deliverable (app uninstalled, token
    /// rotated elsewhere, wrong sender). Triggers token hygiene.
    Permanent { code: String, message: String },
    /// Network trouble, rate limiting, or a provider-side failure. The token
    /// is preserved; no retry is performed by this subsystem.
    Transient { code: String, message: String },
}

impl PushError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, PushError::Permanent { .. })
    }

    pub fn code(&self) -> &str {
        match self {
            PushError::Permanent { code, .. } | PushError::Transient { code, .. } => code,
        }
    }
}

impl std::error::Error for PushError {}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Permanent { code, message } => {
                write!(f, "PushError: Permanent failure ({code}): {message}")
            }
            PushError::Transient { code, message } => {
                write!(f, "PushError: Transient failure ({code}): {message}")
            }
        }
    }
}

/// Maps a provider-reported error code onto the permanent/transient split.
pub fn classify_provider_error(code: &str, message: &str) -> PushError {
    if PERMANENT_ERROR_CODES.contains(&code) {
        PushError::Permanent {
            code: String::from(code),
            message: String::from(message),
        }
    } else {
        PushError::Transient {
            code: String::from(code),
            message: String::from(message),
        }
    }
}

pub fn plausible_token_format(token: &str) -> bool {
    token.len() >= MIN_PLAUSIBLE_TOKEN_LEN
}

/// Discriminator attached to every message's data payload so clients can
/// route it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushKind {
    Reminder,
    Expense,
    Test,
}

impl PushKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PushKind::Reminder => "reminder",
            PushKind::Expense => "expense",
            PushKind::Test => "test",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PushMessage<'a> {
    pub token: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub kind: PushKind,
}

/// Seam for the push-messaging provider. `send` delivers exactly one message
/// to one device token and returns the provider's message id.
#[async_trait]
pub trait SendPush: Send + Sync {
    async fn send(&self, message: PushMessage<'_>) -> Result<String, PushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permanent_codes() {
        for code in PERMANENT_ERROR_CODES {
            let err = classify_provider_error(code, "details");
            assert!(err.is_permanent(), "{code} should be permanent");
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_classify_transient_codes() {
        for code in [
            "Unavailable",
            "InternalServerError",
            "DeviceMessageRateExceeded",
            "Unauthorized",
            "NetworkError",
        ] {
            assert!(
                !classify_provider_error(code, "details").is_permanent(),
                "{code} should be transient"
            );
        }
    }

    #[test]
    fn test_plausible_token_format() {
        assert!(!plausible_token_format(""));
        assert!(!plausible_token_format("short-token"));
        assert!(plausible_token_format(&"x".repeat(152)));
    }

    #[test]
    fn test_push_kind_as_str() {
        assert_eq!(PushKind::Reminder.as_str(), "reminder");
        assert_eq!(PushKind::Expense.as_str(), "expense");
        assert_eq!(PushKind::Test.as_str(), "test");
    }
}
