//! Runtime for intake sessions
//!
//! Owns the per-session store. Each session has its own async mutex, so the
//! messages of one session are processed one at a time while different
//! sessions run concurrently.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::IntakeEngine;

use crate::catalog::Specialty;
use crate::state_machine::SessionState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// One entry of the session map
struct SessionSlot {
    /// Set once the slot has been removed from the map. A request that was
    /// waiting on the slot must look the session up again.
    retired: AtomicBool,
    inner: Mutex<SlotState>,
}

struct SlotState {
    state: SessionState,
    last_activity: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            retired: AtomicBool::new(false),
            inner: Mutex::new(SlotState {
                state: SessionState::new(),
                last_activity: Instant::now(),
            }),
        }
    }

    fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }
}

/// Manager for all intake sessions
pub struct SessionManager {
    engine: IntakeEngine,
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(engine: IntakeEngine, idle_timeout: Duration) -> Self {
        Self {
            engine,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Handle one message for `session_id`, creating the session if needed.
    ///
    /// `doctor_type` only matters for the message that opens a session.
    pub async fn start_or_continue(
        &self,
        session_id: &str,
        doctor_type: Option<&str>,
        message: &str,
    ) -> String {
        let specialty = doctor_type.map(Specialty::from_key);

        loop {
            let slot = self.get_or_create(session_id).await;
            let mut guard = slot.inner.lock().await;
            if slot.is_retired() {
                // Reset or evicted while we waited
                continue;
            }

            let was_started = guard.state.is_started();
            let state = std::mem::take(&mut guard.state);
            let (reply, new_state) = self.engine.advance(state, specialty, message).await;
            let ended = was_started && !new_state.is_started();

            guard.state = new_state;
            guard.last_activity = Instant::now();

            if ended {
                self.remove_slot(session_id, &slot).await;
                tracing::info!(session_id = %session_id, "Consultation ended, session evicted");
            }
            return reply;
        }
    }

    /// Discard a session. The next message for the id starts a new consultation.
    pub async fn reset_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(slot) => {
                slot.retire();
                tracing::info!(session_id = %session_id, "Session reset");
                true
            }
            None => false,
        }
    }

    /// Evict sessions with no activity for longer than the idle timeout.
    /// Sessions that are processing a message are never idle.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|session_id, slot| {
            let Ok(inner) = slot.inner.try_lock() else {
                return true;
            };
            if inner.last_activity.elapsed() < self.idle_timeout {
                return true;
            }
            slot.retire();
            tracing::debug!(session_id = %session_id, "Evicting idle session");
            false
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    async fn get_or_create(&self, session_id: &str) -> Arc<SessionSlot> {
        // Check if already exists
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(session_id) {
                return slot.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id = %session_id, "Creating session");
                Arc::new(SessionSlot::new())
            })
            .clone()
    }

    /// Remove `slot` from the map unless the id already points elsewhere
    async fn remove_slot(&self, session_id: &str, slot: &Arc<SessionSlot>) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            sessions.remove(session_id);
        }
        slot.retire();
    }

    #[cfg(test)]
    async fn snapshot(&self, session_id: &str) -> Option<SessionState> {
        let slot = self.sessions.read().await.get(session_id).cloned()?;
        let state = slot.inner.lock().await.state.clone();
        Some(state)
    }
}
