//! Single-selection session controller.
//!
//! At most one session is live. Selecting a marker or closing the overlay
//! cancels the outstanding probe, fires the previous session's release token
//! and publishes a fresh snapshot. Updates from a session that is no longer
//! current are dropped, so a late probe result can never touch the state of
//! a newer selection.

use std::sync::Arc;
use std::time::Duration;

use livecam_config::Config;
use livecam_protocols::{FrameLoad, Marker, ResolutionAttempt, ResolutionState};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::engine::ResolutionEngine;
use crate::error::ResolveError;

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_id: Option<String>,
    pub state: ResolutionState,
    /// Advisory load signal for frame states. Never changes `state`.
    pub frame: FrameLoad,
    pub attempts: Vec<ResolutionAttempt>,
}

impl SessionSnapshot {
    fn idle(session_id: u64, marker_id: Option<String>) -> Self {
        Self {
            session_id,
            marker_id,
            state: ResolutionState::Idle,
            frame: FrameLoad::NotApplicable,
            attempts: Vec::new(),
        }
    }
}

/// Returned from [`SessionController::select`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session_id: u64,
    /// Cancelled when this session ends; stream consumers release on it.
    pub release: CancellationToken,
}

struct Active {
    session_id: u64,
    probe: CancellationToken,
    release: CancellationToken,
}

impl Active {
    fn end(&self) {
        self.probe.cancel();
        self.release.cancel();
    }
}

struct Shared {
    engine: ResolutionEngine,
    grace_period: Duration,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Shared {
    /// Apply `update` only if `session_id` is still current.
    fn update_if_current<F>(&self, session_id: u64, update: F) -> bool
    where
        F: FnOnce(&mut SessionSnapshot) -> bool,
    {
        self.snapshot.send_if_modified(|snapshot| {
            if snapshot.session_id != session_id {
                return false;
            }
            update(snapshot)
        })
    }

    fn publish_state(&self, session_id: u64, state: &ResolutionState) -> bool {
        let published = self.update_if_current(session_id, |snapshot| {
            snapshot.state = state.clone();
            true
        });
        if !published {
            debug!(session_id, state = state.label(), "Dropped stale update");
        }
        published
    }

    fn finish(
        &self,
        session_id: u64,
        state: ResolutionState,
        attempts: Vec<ResolutionAttempt>,
    ) -> bool {
        self.update_if_current(session_id, |snapshot| {
            snapshot.frame = if state.is_frame() {
                FrameLoad::Pending
            } else {
                FrameLoad::NotApplicable
            };
            snapshot.state = state;
            snapshot.attempts = attempts;
            true
        })
    }

    fn settle_frame(&self, session_id: u64, signal: FrameLoad) -> bool {
        self.update_if_current(session_id, |snapshot| {
            if snapshot.frame != FrameLoad::Pending {
                return false;
            }
            snapshot.frame = signal;
            true
        })
    }
}

/// Owns the single active resolution session.
pub struct SessionController {
    shared: Arc<Shared>,
    active: Mutex<Active>,
}

impl SessionController {
    pub fn new(engine: ResolutionEngine, grace_period: Duration) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::idle(0, None));
        Self {
            shared: Arc::new(Shared {
                engine,
                grace_period,
                snapshot,
            }),
            active: Mutex::new(Active {
                session_id: 0,
                probe: CancellationToken::new(),
                release: CancellationToken::new(),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        Ok(Self::new(
            ResolutionEngine::from_config(config)?,
            config.frame.grace_period(),
        ))
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.shared.engine
    }

    /// Start a new session for `marker`, ending the current one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn select(&self, marker: Marker) -> SessionHandle {
        let mut active = self.active.lock();
        active.end();

        let session_id = active.session_id + 1;
        let probe = CancellationToken::new();
        let release = CancellationToken::new();
        *active = Active {
            session_id,
            probe: probe.clone(),
            release: release.clone(),
        };
        self.shared
            .snapshot
            .send_replace(SessionSnapshot::idle(session_id, Some(marker.id.clone())));
        drop(active);

        info!(session_id, marker_id = %marker.id, "Marker selected");
        let span = info_span!("session", session_id, marker_id = %marker.id);
        let shared = self.shared.clone();
        tokio::spawn(run_session(shared, session_id, marker, probe).instrument(span));

        SessionHandle {
            session_id,
            release,
        }
    }

    /// End the current session and return to idle.
    pub fn close(&self) {
        let mut active = self.active.lock();
        active.end();
        active.session_id += 1;
        active.probe = CancellationToken::new();
        active.release = CancellationToken::new();
        self.shared
            .snapshot
            .send_replace(SessionSnapshot::idle(active.session_id, None));
        info!(session_id = active.session_id, "Overlay closed");
    }

    /// Report that the frame of `session_id` finished loading.
    ///
    /// Returns `false` when the session is stale or its frame is not pending.
    pub fn frame_loaded(&self, session_id: u64) -> bool {
        self.shared.settle_frame(session_id, FrameLoad::Loaded)
    }

    pub fn current_session(&self) -> u64 {
        self.active.lock().session_id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshot.subscribe()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.active.lock().end();
    }
}

async fn run_session(
    shared: Arc<Shared>,
    session_id: u64,
    marker: Marker,
    probe: CancellationToken,
) {
    let result = shared
        .engine
        .run(marker, &probe, |state| {
            shared.publish_state(session_id, state);
        })
        .await;

    let resolution = match result {
        Ok(resolution) => resolution,
        Err(ResolveError::Cancelled) => {
            debug!("Session superseded");
            return;
        }
        Err(e) => {
            warn!(error = %e, "Session failed");
            return;
        }
    };

    let (state, attempts) = resolution.into_parts();
    let framed = state.is_frame();
    if !shared.finish(session_id, state, attempts) || !framed {
        return;
    }

    // Frame load detection is advisory: flag the frame if no load report
    // arrives within the grace period.
    tokio::select! {
        _ = probe.cancelled() => {}
        _ = tokio::time::sleep(shared.grace_period) => {
            if shared.settle_frame(session_id, FrameLoad::Stalled) {
                info!("Frame did not report a load, flagged as stalled");
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
