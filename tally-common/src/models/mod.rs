pub mod expense;
pub mod expense_notification_settings;
pub mod job_registry_item;
pub mod project;
pub mod reminder;
pub mod user;
