use serde::{Deserialize, Serialize};

use super::enums::NotificationType;

/// System-generated, read-tracked message to a patient. Always the
/// byproduct of a cancel or reschedule transition; never user-authored.
///
/// Persisted shape: `notifications/{id}`. `new_date` is empty exactly
/// when `kind` is `cancelled`; for reschedules both date fields carry
/// `"{date} {time}"` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub appointment_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    /// Epoch millis, stamped when the transition commits.
    pub timestamp: i64,
    pub is_read: bool,
    pub doctor_name: String,
    pub original_date: String,
    pub new_date: String,
}

impl Default for Notification {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            appointment_id: String::new(),
            kind: NotificationType::Cancelled,
            title: String::new(),
            message: String::new(),
            timestamp: 0,
            is_read: false,
            doctor_name: String::new(),
            original_date: String::new(),
            new_date: String::new(),
        }
    }
}
