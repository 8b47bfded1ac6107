//! Patient profile persistence.
//!
//! Profiles are keyed by the auth-assigned user id, so `set` (create or
//! replace) is the only write shape needed: sign-up writes the whole
//! document and profile edits rewrite it.

use std::sync::Arc;

use crate::models::User;
use crate::store::{self, DataError, DocumentStore, USERS};

pub struct UserService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn save(&self, user: &User) -> Result<(), DataError> {
        self.store.set(USERS, &user.id, store::encode(user)?).await
    }

    /// Strict fetch: a missing profile means sign-up never completed and
    /// the caller must handle it.
    pub async fn get(&self, user_id: &str) -> Result<User, DataError> {
        self.store.get(USERS, user_id).await?.decode(USERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn profile() -> User {
        User {
            id: "u1".into(),
            name: "Budi Santoso".into(),
            nik: "3174012501990001".into(),
            email: "budi@example.com".into(),
            dob: "1999-01-25".into(),
            gender: "Laki-laki".into(),
            phone: "081234567890".into(),
            favorite_doctors: vec![],
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips_the_profile() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));

        service.save(&profile()).await.unwrap();
        let loaded = service.get("u1").await.unwrap();
        assert_eq!(loaded, profile());
    }

    #[tokio::test]
    async fn save_replaces_existing_profile() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));
        service.save(&profile()).await.unwrap();

        let mut edited = profile();
        edited.phone = "081299998888".into();
        service.save(&edited).await.unwrap();

        assert_eq!(service.get("u1").await.unwrap().phone, "081299998888");
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));
        let err = service.get("ghost").await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }
}
