//! Doctor directory and the per-user favorite set.
//!
//! Directory reads are tolerant like every list in the app; the single
//! fetch used by the booking flow is strict. Favorites are a string-id
//! set on the user document, mutated with array union/remove so repeat
//! taps stay idempotent.

use std::sync::Arc;

use serde_json::json;

use crate::models::Doctor;
use crate::store::{self, DataError, DocumentStore, Query, DOCTORS, USERS};

pub struct DoctorService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> DoctorService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Full directory, malformed entries skipped.
    pub async fn list(&self) -> Result<Vec<Doctor>, DataError> {
        let docs = self.store.query(DOCTORS, &Query::new()).await?;
        Ok(store::decode_all(DOCTORS, &docs))
    }

    /// Directory filtered to one specialty.
    pub async fn list_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, DataError> {
        let docs = self
            .store
            .query(DOCTORS, &Query::new().filter_eq("specialty", specialty))
            .await?;
        Ok(store::decode_all(DOCTORS, &docs))
    }

    /// Single fetch for the booking/detail screen. Unlike the lists this
    /// is strict: a missing or malformed document is an error.
    pub async fn get(&self, doctor_id: &str) -> Result<Doctor, DataError> {
        self.store.get(DOCTORS, doctor_id).await?.decode(DOCTORS)
    }

    /// Adds or removes a doctor from the user's favorite set. Both
    /// directions are idempotent.
    pub async fn set_favorite(
        &self,
        user_id: &str,
        doctor_id: &str,
        favorite: bool,
    ) -> Result<(), DataError> {
        if favorite {
            self.store
                .array_union(USERS, user_id, "favoriteDoctors", json!(doctor_id))
                .await
        } else {
            self.store
                .array_remove(USERS, user_id, "favoriteDoctors", json!(doctor_id))
                .await
        }
    }

    /// Resolves the user's favorite ids to doctor entries. Ids that no
    /// longer resolve (doctor removed by an admin) are dropped silently.
    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<Doctor>, DataError> {
        let user = self.store.get(USERS, user_id).await?;
        let ids: Vec<String> = user
            .fields
            .get("favoriteDoctors")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let mut doctors = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.store.get(DOCTORS, id).await {
                Ok(doc) => match doc.decode(DOCTORS) {
                    Ok(doctor) => doctors.push(doctor),
                    Err(e) => tracing::warn!("skipping malformed favorite: {e}"),
                },
                Err(DataError::NotFound { .. }) => {
                    tracing::debug!(doctor_id = %id, "favorite points at a removed doctor");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(doctors)
    }
}
