//! Operator-side mutation surface and dashboard projections.
//!
//! Admin transitions run the exact same two-step write shape as the
//! patient app and build their notifications with the same constructors,
//! so a patient cannot tell which surface produced a record.
//!
//! The one divergence between the surfaces is what a reschedule does to
//! `status`: the patient app leaves `upcoming` in place while the admin
//! table historically stamps `rescheduled`, which drops the appointment
//! out of the patient's status tabs until someone overrides it. Both
//! behaviors are kept, selected by `ReschedulePolicy`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::models::{Appointment, AppointmentStatus};
use crate::notifications::{cancellation_notice, reschedule_notice, NotificationService};
use crate::store::{
    self, DataError, Direction, Document, DocumentStore, Query, Subscription, APPOINTMENTS,
};

/// What a reschedule writes into `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReschedulePolicy {
    /// Leave the status untouched; the appointment stays bookable and
    /// visible under `upcoming`.
    KeepUpcoming,
    /// Stamp the transient `rescheduled` status. Patient-side tabs only
    /// filter on upcoming/completed/cancelled, so the appointment
    /// disappears from them until the status is overridden.
    MarkRescheduled,
}

pub struct AdminService<S> {
    store: Arc<S>,
    notifications: NotificationService<S>,
}

impl<S: DocumentStore> AdminService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Moves the slot and notifies the patient. Same partial-failure
    /// window as the patient flow: the appointment mutation commits
    /// before the notification write is attempted.
    pub async fn reschedule(
        &self,
        appointment_id: &str,
        new_date: &str,
        new_time: &str,
        policy: ReschedulePolicy,
    ) -> Result<(), DataError> {
        let before = self.fetch(appointment_id).await?;

        let fields = match policy {
            ReschedulePolicy::KeepUpcoming => json!({ "date": new_date, "time": new_time }),
            ReschedulePolicy::MarkRescheduled => json!({
                "date": new_date,
                "time": new_time,
                "status": AppointmentStatus::Rescheduled.as_str(),
            }),
        };
        self.store.update(APPOINTMENTS, appointment_id, fields).await?;

        self.notifications
            .create(&reschedule_notice(&before, new_date, new_time))
            .await?;
        Ok(())
    }

    pub async fn cancel(&self, appointment_id: &str) -> Result<(), DataError> {
        let before = self.fetch(appointment_id).await?;

        self.store
            .update(
                APPOINTMENTS,
                appointment_id,
                json!({ "status": AppointmentStatus::Cancelled.as_str() }),
            )
            .await?;

        self.notifications
            .create(&cancellation_notice(&before))
            .await?;
        Ok(())
    }

    /// Unguarded override, including forcing a cancelled appointment
    /// back to `upcoming`. Emits no notification.
    pub async fn set_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), DataError> {
        self.store
            .update(
                APPOINTMENTS,
                appointment_id,
                json!({ "status": status.as_str() }),
            )
            .await
    }

    /// Permanent removal, the only hard-delete surface.
    pub async fn delete(&self, appointment_id: &str) -> Result<(), DataError> {
        self.store.delete(APPOINTMENTS, appointment_id).await
    }

    /// Every appointment across all users, newest date first, malformed
    /// documents skipped.
    pub async fn list_all(&self) -> Result<Vec<Appointment>, DataError> {
        let docs = self
            .store
            .query(
                APPOINTMENTS,
                &Query::new().order_by("date", Direction::Descending),
            )
            .await?;
        Ok(store::decode_all(APPOINTMENTS, &docs))
    }

    /// Live feed of the whole collection for the dashboard and table.
    pub fn watch_all(&self) -> Subscription {
        self.store.subscribe(APPOINTMENTS, Query::new())
    }

    /// Raw documents for one day, the dashboard's input. Raw because the
    /// headline cards also count status values outside the patient-side
    /// vocabulary (see `dashboard_stats`).
    pub async fn day_documents(&self, date: &str) -> Result<Vec<Document>, DataError> {
        self.store
            .query(APPOINTMENTS, &Query::new().filter_eq("date", date))
            .await
    }

    async fn fetch(&self, appointment_id: &str) -> Result<Appointment, DataError> {
        self.store
            .get(APPOINTMENTS, appointment_id)
            .await?
            .decode(APPOINTMENTS)
    }
}

// ─── Dashboard projections ────────────────────────────────────────────────────

/// Headline cards for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_today: usize,
    pub in_queue: usize,
    pub being_served: usize,
    pub completed: usize,
}

/// Folds one day's raw documents into the headline cards. Works on raw
/// status strings: `being_served` counts `in-progress`, a value written
/// by older operator tooling that the typed model rejects.
pub fn dashboard_stats(docs: &[Document]) -> DashboardStats {
    let status_of = |doc: &Document| {
        doc.fields
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_owned()
    };
    DashboardStats {
        total_today: docs.len(),
        in_queue: docs.iter().filter(|d| status_of(d) == "upcoming").count(),
        being_served: docs.iter().filter(|d| status_of(d) == "in-progress").count(),
        completed: docs.iter().filter(|d| status_of(d) == "completed").count(),
    }
}

/// Appointment count per poli, busiest first. An appointment belongs to
/// its specialty, falling back to its location, then to "Poli Umum".
pub fn poli_stats(appointments: &[Appointment]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for appointment in appointments {
        let poli = if !appointment.specialty.is_empty() {
            appointment.specialty.as_str()
        } else if !appointment.location.is_empty() {
            appointment.location.as_str()
        } else {
            "Poli Umum"
        };
        *counts.entry(poli).or_default() += 1;
    }
    let mut stats: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_owned(), count))
        .collect();
    stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    stats
}

/// Appointment count per starting hour, earliest first. Slot labels use
/// either `HH.MM` or `HH:MM`; appointments without a time are skipped.
pub fn hourly_stats(appointments: &[Appointment]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for appointment in appointments {
        if appointment.time.is_empty() {
            continue;
        }
        let hour = appointment
            .time
            .split(['.', ':'])
            .next()
            .unwrap_or(&appointment.time);
        *counts.entry(format!("{hour}:00")).or_default() += 1;
    }
    let mut stats: Vec<(String, usize)> = counts.into_iter().collect();
    stats.sort_by(|a, b| a.0.cmp(&b.0));
    stats
}

/// Table filter: case-insensitive substring search over doctor name,
/// specialty, and location, optionally narrowed to one status.
pub fn filter_table<'a>(
    appointments: &'a [Appointment],
    search: &str,
    status: Option<AppointmentStatus>,
) -> Vec<&'a Appointment> {
    let needle = search.to_lowercase();
    appointments
        .iter()
        .filter(|a| {
            let matches_search = needle.is_empty()
                || a.doctor_name.to_lowercase().contains(&needle)
                || a.specialty.to_lowercase().contains(&needle)
                || a.location.to_lowercase().contains(&needle);
            let matches_status = status.map_or(true, |s| a.status == s);
            matches_search && matches_status
        })
        .collect()
}
