//! Session-level driver: one turn at a time per session, state persisted between turns.

use crate::{DialogError, Orchestrator, Result, SessionId, TaskStore, TurnOutput};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lives as long as the session has turns queued or running. Ending the
/// session swaps the token but keeps the lock, so later turns still queue
/// behind the one being cancelled.
struct SessionSlot {
    turn_lock: tokio::sync::Mutex<()>,
    cancel: Mutex<CancellationToken>,
}

/// Runs conversations for many sessions over a shared orchestrator.
///
/// Turns of one session are serialized, and the record is loaded and saved
/// inside that critical section. Independent sessions proceed concurrently.
pub struct DialogEngine<S: TaskStore> {
    orchestrator: Orchestrator,
    store: Arc<S>,
    sessions: Mutex<HashMap<SessionId, Arc<SessionSlot>>>,
}

impl<S: TaskStore> DialogEngine<S> {
    pub fn new(orchestrator: Orchestrator, store: Arc<S>) -> Self {
        Self {
            orchestrator,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Start (or restart) the Main flow without an utterance.
    pub async fn start(&self, session: &SessionId) -> Result<TurnOutput> {
        self.run(session, None).await
    }

    /// Feed one user utterance to the session.
    pub async fn turn(&self, session: &SessionId, input: &str) -> Result<TurnOutput> {
        self.run(session, Some(input)).await
    }

    /// End the session: in-flight external calls are cancelled. A turn
    /// cancelled before its command ran fails with [`DialogError::Cancelled`]
    /// and saves nothing; one cancelled afterwards saves what the command
    /// changed and ends the flow. The stored record is kept.
    pub fn end_session(&self, session: &SessionId) {
        let slot = self.sessions.lock().get(session).cloned();
        if let Some(slot) = slot {
            tracing::info!(%session, "ending session");
            let ended = std::mem::replace(&mut *slot.cancel.lock(), CancellationToken::new());
            ended.cancel();
        }
    }

    /// Drop stored records idle for longer than `max_idle`, and forget
    /// sessions with no turn in flight.
    pub async fn expire_idle(&self, max_idle: Duration) -> Result<usize> {
        self.sessions
            .lock()
            .retain(|_, slot| Arc::strong_count(slot) > 1);
        let removed = self.store.expire_idle(max_idle).await?;
        if removed > 0 {
            tracing::info!(removed, "expired idle conversations");
        }
        Ok(removed)
    }

    fn slot(&self, session: &SessionId) -> Arc<SessionSlot> {
        self.sessions
            .lock()
            .entry(session.clone())
            .or_insert_with(|| {
                Arc::new(SessionSlot {
                    turn_lock: tokio::sync::Mutex::new(()),
                    cancel: Mutex::new(CancellationToken::new()),
                })
            })
            .clone()
    }

    async fn run(&self, session: &SessionId, input: Option<&str>) -> Result<TurnOutput> {
        let slot = self.slot(session);
        let _turn = slot.turn_lock.lock().await;
        let cancel = slot.cancel.lock().clone();

        let record = self.store.load(session).await?.unwrap_or_default();
        let outcome = match input {
            None => self.orchestrator.begin(record.clone(), &cancel).await,
            Some(input) => {
                self.orchestrator
                    .handle_turn(record.clone(), input, &cancel)
                    .await
            }
        };

        match outcome {
            Ok((next, output)) => {
                self.store.save(session, &next).await?;
                Ok(output)
            }
            Err(DialogError::RecognizerNotConfigured) => {
                tracing::error!(%session, "conversation aborted: recognizer not configured");
                let mut reset = record;
                reset.abandon_flow();
                reset.touch();
                self.store.save(session, &reset).await?;
                Err(DialogError::RecognizerNotConfigured)
            }
            Err(e) => {
                tracing::warn!(%session, error = %e, "turn abandoned");
                Err(e)
            }
        }
    }
}
