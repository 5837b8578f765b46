//! The fetch state machine.
//!
//! One driver task owns the request lifecycle: it watches the query target,
//! keeps at most one outbound request authoritative at a time, and cancels
//! an in-flight request the moment a newer target (or teardown) supersedes
//! it. Because only this task ever writes [`RequestState`], a superseded
//! request structurally cannot write its outcome back.

use log::debug;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::FetchError,
    model::{QueryTarget, WeatherSnapshot},
    source::WeatherSource,
};

/// Lifecycle of the current fetch. Exactly one variant holds at any time;
/// result and error are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded(WeatherSnapshot),
    Failed(FetchError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}

/// Handle to a spawned fetcher task.
///
/// Dropping the handle without calling [`FetcherHandle::shutdown`] closes
/// the query channel, which also stops the task.
#[derive(Debug)]
pub struct FetcherHandle {
    query_tx: watch::Sender<Option<QueryTarget>>,
    state_rx: watch::Receiver<RequestState>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl FetcherHandle {
    pub fn spawn(source: Arc<dyn WeatherSource>) -> Self {
        let (query_tx, query_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(RequestState::Idle);
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(drive(source, query_rx, state_tx, shutdown.clone()));

        Self { query_tx, state_rx, shutdown, task }
    }

    /// Publish a new query target. Re-submitting the same city starts a
    /// fresh fetch cycle; submissions are not deduplicated.
    pub fn submit(&self, city: QueryTarget) {
        let _ = self.query_tx.send(Some(city));
    }

    /// Clear the query target; the fetcher returns to `Idle`.
    pub fn clear(&self) {
        let _ = self.query_tx.send(None);
    }

    /// A receiver for observing state transitions.
    pub fn state(&self) -> watch::Receiver<RequestState> {
        self.state_rx.clone()
    }

    pub fn current_state(&self) -> RequestState {
        self.state_rx.borrow().clone()
    }

    /// Wait until the state next leaves `Loading`.
    pub async fn wait_settled(&mut self) -> RequestState {
        loop {
            if self.state_rx.changed().await.is_err() {
                return self.state_rx.borrow().clone();
            }
            let state = self.state_rx.borrow_and_update().clone();
            if !state.is_loading() {
                return state;
            }
        }
    }

    /// Tear the fetcher down, cancelling any in-flight request.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.task.await;
    }
}

async fn drive(
    source: Arc<dyn WeatherSource>,
    mut query_rx: watch::Receiver<Option<QueryTarget>>,
    state_tx: watch::Sender<RequestState>,
    shutdown: CancellationToken,
) {
    'outer: loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = query_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        'fetch: loop {
            let Some(city) = query_rx.borrow_and_update().clone() else {
                let _ = state_tx.send(RequestState::Idle);
                continue 'outer;
            };

            // Loading clears any prior result or error.
            let _ = state_tx.send(RequestState::Loading);

            let cancel = shutdown.child_token();

            tokio::select! {
                _ = shutdown.cancelled() => {
                    cancel.cancel();
                    break 'outer;
                }
                changed = query_rx.changed() => {
                    // Superseded: the in-flight request is cancelled and
                    // its outcome is never applied; the new target owns
                    // the state from here on.
                    cancel.cancel();
                    debug!("query target changed while '{city}' was in flight; discarding");
                    if changed.is_err() {
                        break 'outer;
                    }
                    continue 'fetch;
                }
                outcome = source.current(&city, &cancel) => {
                    match outcome {
                        Ok(snapshot) => {
                            let _ = state_tx.send(RequestState::Succeeded(snapshot));
                        }
                        Err(err) if err.is_cancelled() => {
                            debug!("fetch for '{city}' cancelled");
                        }
                        Err(err) => {
                            let _ = state_tx.send(RequestState::Failed(err));
                        }
                    }
                    continue 'outer;
                }
            }
        }
    }

    debug!("weather fetcher stopped");
}
