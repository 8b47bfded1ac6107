use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// One scheduled patient-doctor visit.
///
/// Persisted shape: `appointments/{id}` with camelCase field names.
/// `date` is ISO `yyyy-MM-dd` (lexicographic order is chronological),
/// `time` is the free-form `HH.MM` slot label, `created_at` epoch millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    /// Name from the patient-details form, not the account name.
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub specialty: String,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    pub created_at: i64,
    pub location: String,
}

impl Default for Appointment {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            patient_name: String::new(),
            doctor_id: String::new(),
            doctor_name: String::new(),
            specialty: String::new(),
            date: String::new(),
            time: String::new(),
            status: AppointmentStatus::Upcoming,
            created_at: 0,
            location: "Poli umum".into(),
        }
    }
}

/// Booking input: everything the patient flow collects. Identity,
/// status, and the creation timestamp are assigned at create time, and
/// `user_id` is always overwritten with the caller's id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentDraft {
    pub user_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub specialty: String,
    pub date: String,
    pub time: String,
    pub location: String,
}
