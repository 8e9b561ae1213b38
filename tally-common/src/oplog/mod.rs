//! Operational log helpers for the scheduling subsystem.
//!
//! The five conceptual levels (INFO/WARN/ERROR/SUCCESS/DEBUG) share one
//! formatting function; SUCCESS is an alias that emits at INFO. Day
//! partitioning, timestamps, retention pruning, and the stdout fallback are
//! the logger backend's job (the binaries configure daily file rotation with
//! a retention window), so a call here can never itself fail.

use serde_json::Value;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpLevel {
    Info,
    Warn,
    Error,
    Success,
    Debug,
}

impl OpLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            OpLevel::Info | OpLevel::Success => log::Level::Info,
            OpLevel::Warn => log::Level::Warn,
            OpLevel::Error => log::Level::Error,
            OpLevel::Debug => log::Level::Debug,
        }
    }
}

impl fmt::Display for OpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpLevel::Info => "INFO",
            OpLevel::Warn => "WARN",
            OpLevel::Error => "ERROR",
            OpLevel::Success => "SUCCESS",
            OpLevel::Debug => "DEBUG",
        };

        write!(f, "{name}")
    }
}

/// Appends one line to the operational log, with an optional structured
/// payload rendered as `| Data: <json>`.
pub fn log(level: OpLevel, message: &str, data: Option<&Value>) {
    log::log!(level.as_log_level(), "{}", format_line(level, message, data));
}

pub fn info(message: &str, data: Option<&Value>) {
    log(OpLevel::Info, message, data);
}

pub fn warn(message: &str, data: Option<&Value>) {
    log(OpLevel::Warn, message, data);
}

pub fn error(message: &str, data: Option<&Value>) {
    log(OpLevel::Error, message, data);
}

pub fn success(message: &str, data: Option<&Value>) {
    log(OpLevel::Success, message, data);
}

pub fn debug(message: &str, data: Option<&Value>) {
    log(OpLevel::Debug, message, data);
}

fn format_line(level: OpLevel, message: &str, data: Option<&Value>) -> String {
    let mut line = match level {
        OpLevel::Success => format!("[{level}] {message}"),
        _ => String::from(message),
    };

    if let Some(data) = data {
        let payload = serde_json::to_string(data)
            .unwrap_or_else(|_| String::from("<unserializable payload>"));
        line.push_str(" | Data: ");
        line.push_str(&payload);
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_format_line_without_data() {
        assert_eq!(
            format_line(OpLevel::Info, "Reminder check started", None),
            "Reminder check started"
        );
    }

    #[test]
    fn test_format_line_with_data() {
        let data = json!({ "count": 3 });
        assert_eq!(
            format_line(OpLevel::Warn, "User has no device token", Some(&data)),
            "User has no device token | Data: {\"count\":3}"
        );
    }

    #[test]
    fn test_success_is_tagged_and_logged_at_info() {
        let data = json!({ "message_id": "abc" });
        let line = format_line(OpLevel::Success, "Notification sent", Some(&data));
        assert!(line.starts_with("[SUCCESS] Notification sent"));
        assert_eq!(OpLevel::Success.as_log_level(), log::Level::Info);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(OpLevel::Error.to_string(), "ERROR");
        assert_eq!(OpLevel::Debug.to_string(), "DEBUG");
    }
}
