//! Appointment lifecycle.
//!
//! Single authority for every state change an appointment can undergo
//! and for the paired notification emission. The state machine:
//! `Create` puts an appointment in `upcoming`; `Cancel` moves it to
//! `cancelled`; only the admin surface moves it to `completed`.
//! `update_status` is deliberately unguarded (any-to-any) because admin
//! workflows rely on forcing transitions such as un-cancelling.
//!
//! Cancel and reschedule are two sequential writes with no transaction
//! around them: the appointment mutation first, then the notification,
//! best effort. A failure between the two leaves an updated appointment
//! and no notification; that window is part of the contract and is
//! covered by tests rather than papered over.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::auth::AuthProvider;
use crate::models::{Appointment, AppointmentDraft, AppointmentStatus};
use crate::notifications::{cancellation_notice, reschedule_notice, NotificationService};
use crate::store::{
    self, DataError, Direction, DocumentStore, Query, Subscription, APPOINTMENTS,
};

pub struct AppointmentService<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
    notifications: NotificationService<S>,
}

impl<S: DocumentStore, A: AuthProvider> AppointmentService<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        Self {
            notifications: NotificationService::new(Arc::clone(&store)),
            store,
            auth,
        }
    }

    /// Books a new appointment for the signed-in patient. The draft's
    /// `user_id` is always overwritten with the caller's id.
    pub async fn create(&self, draft: AppointmentDraft) -> Result<Appointment, DataError> {
        let caller = self.auth.current_user().ok_or(DataError::Unauthenticated)?;

        let mut appointment = Appointment {
            user_id: caller.id,
            patient_name: draft.patient_name,
            doctor_id: draft.doctor_id,
            doctor_name: draft.doctor_name,
            specialty: draft.specialty,
            date: draft.date,
            time: draft.time,
            status: AppointmentStatus::Upcoming,
            created_at: Utc::now().timestamp_millis(),
            location: draft.location,
            ..Default::default()
        };

        let id = self
            .store
            .add(APPOINTMENTS, store::encode(&appointment)?)
            .await?;
        appointment.id = id;
        tracing::debug!(
            appointment_id = %appointment.id,
            doctor = %appointment.doctor_name,
            "appointment created"
        );
        Ok(appointment)
    }

    /// Moves the appointment to a new slot. Status is left untouched, so
    /// a rescheduled appointment stays bookable under `upcoming`. Emits
    /// exactly one `rescheduled` notification carrying both slots.
    pub async fn reschedule(
        &self,
        appointment_id: &str,
        new_date: &str,
        new_time: &str,
    ) -> Result<(), DataError> {
        let before = self.fetch(appointment_id).await?;

        self.store
            .update(
                APPOINTMENTS,
                appointment_id,
                json!({ "date": new_date, "time": new_time }),
            )
            .await?;

        self.emit(reschedule_notice(&before, new_date, new_time)).await
    }

    /// Patient-initiated cancellation. The free-text reason collected by
    /// the dialog is not persisted anywhere yet.
    // TODO: persist the cancellation reason once the admin table grows a
    // column for it; today it is collected in the UI and dropped.
    pub async fn cancel(
        &self,
        appointment_id: &str,
        _reason: Option<&str>,
    ) -> Result<(), DataError> {
        let before = self.fetch(appointment_id).await?;

        self.store
            .update(
                APPOINTMENTS,
                appointment_id,
                json!({ "status": AppointmentStatus::Cancelled.as_str() }),
            )
            .await?;

        self.emit(cancellation_notice(&before)).await
    }

    /// Generic status setter used for admin transitions (`completed`,
    /// back to `upcoming`, …). No transition table is enforced and no
    /// notification is emitted.
    pub async fn update_status(
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

    /// Hard delete. Admin-only by convention; the patient app never
    /// calls this.
    pub async fn delete(&self, appointment_id: &str) -> Result<(), DataError> {
        self.store.delete(APPOINTMENTS, appointment_id).await
    }

    /// All appointments owned by a user, in no guaranteed order.
    /// Malformed documents are skipped, never failing the list.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Appointment>, DataError> {
        let docs = self
            .store
            .query(APPOINTMENTS, &Query::new().filter_eq("userId", user_id))
            .await?;
        let appointments = store::decode_all(APPOINTMENTS, &docs);
        tracing::debug!(user_id, count = appointments.len(), "loaded appointments");
        Ok(appointments)
    }

    /// Status-filtered variant, ascending by date (lexicographic on
    /// `yyyy-MM-dd`, which is also chronological).
    pub async fn list_for_user_by_status(
        &self,
        user_id: &str,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, DataError> {
        let docs = self
            .store
            .query(
                APPOINTMENTS,
                &Query::new()
                    .filter_eq("userId", user_id)
                    .filter_eq("status", status.as_str())
                    .order_by("date", Direction::Ascending),
            )
            .await?;
        Ok(store::decode_all(APPOINTMENTS, &docs))
    }

    /// Live snapshot feed of a user's appointments.
    pub fn watch_for_user(&self, user_id: &str) -> Subscription {
        self.store
            .subscribe(APPOINTMENTS, Query::new().filter_eq("userId", user_id))
    }

    /// Single-document fetch: hard `NotFound`/`Parse`, no tolerant read.
    async fn fetch(&self, appointment_id: &str) -> Result<Appointment, DataError> {
        self.store
            .get(APPOINTMENTS, appointment_id)
            .await?
            .decode(APPOINTMENTS)
    }

    /// Best-effort second write of a transition. The appointment
    /// mutation has already committed when this runs; a failure here is
    /// reported but not rolled back.
    async fn emit(&self, notice: crate::models::Notification) -> Result<(), DataError> {
        match self.notifications.create(&notice).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(
                    appointment_id = %notice.appointment_id,
                    "appointment updated but notification write failed: {e}"
                );
                Err(e)
            }
        }
    }
}
