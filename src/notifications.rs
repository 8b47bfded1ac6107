//! Notification reads, the read-flag transition, and the notice
//! constructors shared by the patient and admin surfaces.
//!
//! Every notification is the byproduct of a cancel or reschedule
//! transition. Both surfaces must emit records that are
//! indistinguishable from each other, so the message composition lives
//! here and nowhere else.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::models::{Appointment, Notification, NotificationType};
use crate::store::{
    self, DataError, Direction, DocumentStore, Query, Subscription, NOTIFICATIONS,
};

// ─── Notice constructors ──────────────────────────────────────────────────────

/// Builds the cancellation notice for an appointment as it stood before
/// the transition. `new_date` stays empty for this type.
pub fn cancellation_notice(appointment: &Appointment) -> Notification {
    let date_time = format!("{} {}", appointment.date, appointment.time);
    Notification {
        user_id: appointment.user_id.clone(),
        appointment_id: appointment.id.clone(),
        kind: NotificationType::Cancelled,
        title: "Janji Temu Dibatalkan!".into(),
        message: format!(
            "Anda telah berhasil membatalkan janji temu dengan Dr. {} pada tanggal {}, \
             pukul {}, 80% dari dana akan dikembalikan ke akun Anda.",
            appointment.doctor_name, date_time, appointment.time
        ),
        timestamp: Utc::now().timestamp_millis(),
        doctor_name: appointment.doctor_name.clone(),
        original_date: date_time,
        new_date: String::new(),
        ..Default::default()
    }
}

/// Builds the reschedule notice. `appointment` carries the original
/// date/time; the new slot is passed separately.
pub fn reschedule_notice(appointment: &Appointment, new_date: &str, new_time: &str) -> Notification {
    let old_date_time = format!("{} {}", appointment.date, appointment.time);
    let new_date_time = format!("{new_date} {new_time}");
    Notification {
        user_id: appointment.user_id.clone(),
        appointment_id: appointment.id.clone(),
        kind: NotificationType::Rescheduled,
        title: "Jadwal Berubah".into(),
        message: format!(
            "Anda telah berhasil mengubah janji temu dengan {} pada tanggal {}. \
             Silakan datang sesuai jadwal baru Anda pada tanggal {}, \
             Jangan lupa aktifkan pengingat alarm Anda.",
            appointment.doctor_name, old_date_time, new_date_time
        ),
        timestamp: Utc::now().timestamp_millis(),
        doctor_name: appointment.doctor_name.clone(),
        original_date: old_date_time,
        new_date: new_date_time,
        ..Default::default()
    }
}

// ─── Service ──────────────────────────────────────────────────────────────────

pub struct NotificationService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> NotificationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All notifications for a user, newest first. Malformed documents
    /// are skipped, never failing the list.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DataError> {
        let docs = self
            .store
            .query(
                NOTIFICATIONS,
                &Query::new()
                    .filter_eq("userId", user_id)
                    .order_by("timestamp", Direction::Descending),
            )
            .await?;
        let notifications = store::decode_all(NOTIFICATIONS, &docs);
        tracing::debug!(user_id, count = notifications.len(), "loaded notifications");
        Ok(notifications)
    }

    /// Live variant of `list_for_user`: re-delivers the full snapshot on
    /// every change until cancelled.
    pub fn watch_for_user(&self, user_id: &str) -> Subscription {
        self.store.subscribe(
            NOTIFICATIONS,
            Query::new()
                .filter_eq("userId", user_id)
                .order_by("timestamp", Direction::Descending),
        )
    }

    /// One-way unread → read transition.
    pub async fn mark_as_read(&self, notification_id: &str) -> Result<(), DataError> {
        self.store
            .update(NOTIFICATIONS, notification_id, json!({ "isRead": true }))
            .await
    }

    pub async fn delete(&self, notification_id: &str) -> Result<(), DataError> {
        self.store.delete(NOTIFICATIONS, notification_id).await
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<usize, DataError> {
        let docs = self
            .store
            .query(
                NOTIFICATIONS,
                &Query::new()
                    .filter_eq("userId", user_id)
                    .filter_eq("isRead", false),
            )
            .await?;
        Ok(docs.len())
    }

    /// System write used by the lifecycle transitions.
    pub(crate) async fn create(&self, notification: &Notification) -> Result<String, DataError> {
        self.store
            .add(NOTIFICATIONS, store::encode(notification)?)
            .await
    }
}
