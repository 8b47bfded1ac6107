//! Poli (specialty) directory with a built-in fallback.
//!
//! The booking screen must always show something to pick, so an empty
//! or unreachable collection falls back to the seeded default list
//! instead of an empty state or an error.

use std::sync::Arc;

use crate::models::{default_polis, Poli};
use crate::store::{self, DataError, DocumentStore, Query, POLIS};

pub struct PoliService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> PoliService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Never fails and never returns an empty list.
    pub async fn list_all(&self) -> Vec<Poli> {
        match self.store.query(POLIS, &Query::new()).await {
            Ok(docs) => {
                let polis: Vec<Poli> = store::decode_all(POLIS, &docs);
                if polis.is_empty() {
                    tracing::debug!("poli collection empty, serving defaults");
                    default_polis()
                } else {
                    polis
                }
            }
            Err(e) => {
                tracing::warn!("poli query failed, serving defaults: {e}");
                default_polis()
            }
        }
    }
}
