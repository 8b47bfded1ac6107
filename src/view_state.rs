//! Client view-state projections.
//!
//! Thin observable layer between the services and a rendering surface:
//! each view holds a `tokio::sync::watch` channel and publishes a full
//! state value on every change. No rendering happens here.
//!
//! Error presentation rule: a failed refresh keeps whatever data the
//! state already holds and sets `error_message` next to it. Stale but
//! available beats an empty screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::appointments::AppointmentService;
use crate::auth::AuthProvider;
use crate::models::{Appointment, AppointmentStatus, Notification};
use crate::store::{self, DocumentStore, Snapshot, Subscription, NOTIFICATIONS};

// ─── Appointments screen ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AppointmentUiState {
    pub appointments: Vec<Appointment>,
    pub selected_tab: AppointmentStatus,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl Default for AppointmentUiState {
    fn default() -> Self {
        Self {
            appointments: Vec::new(),
            selected_tab: AppointmentStatus::Upcoming,
            is_loading: false,
            error_message: None,
        }
    }
}

impl AppointmentUiState {
    /// Subset shown under the selected tab.
    pub fn filtered(&self) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.status == self.selected_tab)
            .collect()
    }
}

pub struct AppointmentView<S, A> {
    service: AppointmentService<S, A>,
    auth: Arc<A>,
    tx: watch::Sender<AppointmentUiState>,
}

impl<S: DocumentStore, A: AuthProvider> AppointmentView<S, A> {
    pub fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        let (tx, _) = watch::channel(AppointmentUiState::default());
        Self {
            service: AppointmentService::new(store, Arc::clone(&auth)),
            auth,
            tx,
        }
    }

    pub fn state(&self) -> watch::Receiver<AppointmentUiState> {
        self.tx.subscribe()
    }

    /// Re-queries the signed-in user's appointments. On failure the
    /// previously held list stays visible alongside the error message.
    pub async fn refresh(&self) {
        let Some(user) = self.auth.current_user() else {
            self.tx.send_modify(|s| {
                s.is_loading = false;
                s.error_message = Some("User not logged in".into());
            });
            return;
        };

        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        match self.service.list_for_user(&user.id).await {
            Ok(appointments) => self.tx.send_modify(|s| {
                s.appointments = appointments;
                s.is_loading = false;
            }),
            Err(e) => self.tx.send_modify(|s| {
                s.is_loading = false;
                s.error_message = Some(e.to_string());
            }),
        }
    }

    /// Pure tab switch, no query.
    pub fn select_tab(&self, tab: AppointmentStatus) {
        self.tx.send_modify(|s| s.selected_tab = tab);
    }
}

// ─── Notifications screen ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct NotificationUiState {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

pub struct NotificationView {
    tx: watch::Sender<NotificationUiState>,
}

impl Default for NotificationView {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationView {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(NotificationUiState {
            is_loading: true,
            ..Default::default()
        });
        Self { tx }
    }

    pub fn state(&self) -> watch::Receiver<NotificationUiState> {
        self.tx.subscribe()
    }

    /// Folds one subscription delivery into the state. The unread count
    /// is recomputed from the list on every delivery, never tracked
    /// incrementally.
    pub fn apply_snapshot(&self, snapshot: Snapshot) {
        match snapshot {
            Ok(docs) => {
                let notifications: Vec<Notification> = store::decode_all(NOTIFICATIONS, &docs);
                let unread_count = notifications.iter().filter(|n| !n.is_read).count();
                self.tx.send_modify(|s| {
                    s.notifications = notifications;
                    s.unread_count = unread_count;
                    s.is_loading = false;
                    s.error_message = None;
                });
            }
            Err(e) => self.tx.send_modify(|s| {
                s.is_loading = false;
                s.error_message = Some(e.to_string());
            }),
        }
    }

    /// Pumps the live subscription into the state until it is cancelled.
    pub async fn drive(&self, mut subscription: Subscription) {
        while let Some(snapshot) = subscription.next().await {
            self.apply_snapshot(snapshot);
        }
    }
}

// ─── Queue dialog countdown ───────────────────────────────────────────────────

/// Cosmetic queue-position ticker for the waiting dialog. Counts up
/// toward the patient's own number, one step per tick; the loop
/// re-checks the visibility flag every tick so dismissing the dialog
/// stops it within one interval.
pub struct QueueCountdown {
    visible: Arc<AtomicBool>,
    tx: watch::Sender<u32>,
}

impl QueueCountdown {
    pub fn new(start: u32) -> Self {
        let (tx, _) = watch::channel(start);
        Self {
            visible: Arc::new(AtomicBool::new(true)),
            tx,
        }
    }

    pub fn position(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }

    /// Called when the dialog closes. Safe to call more than once.
    pub fn dismiss(&self) {
        self.visible.store(false, Ordering::Relaxed);
    }

    /// Advances one position per tick until reaching `target` or being
    /// dismissed.
    pub async fn run(&self, target: u32, tick: Duration) {
        while self.visible.load(Ordering::Relaxed) && *self.tx.borrow() < target {
            tokio::time::sleep(tick).await;
            if !self.visible.load(Ordering::Relaxed) {
                break;
            }
            self.tx.send_modify(|pos| *pos += 1);
        }
    }
}
