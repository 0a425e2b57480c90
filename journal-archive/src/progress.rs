//! Idle → InProgress → Success | Error reporting for long-running operations.

use std::fmt::Display;
use tokio::sync::watch;

/// Observable state of one kind of operation (export or import)
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OperationState<T> {
    #[default]
    Idle,
    InProgress,
    Success(T),
    Error(String),
}

impl<T> OperationState<T> {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, OperationState::InProgress)
    }

    /// True once a result is waiting to be acknowledged
    pub fn is_finished(&self) -> bool {
        matches!(self, OperationState::Success(_) | OperationState::Error(_))
    }

    pub fn begin(&mut self) {
        *self = OperationState::InProgress;
    }

    pub fn finish<E: Display>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(details) => OperationState::Success(details),
            Err(e) => OperationState::Error(e.to_string()),
        };
    }

    /// Returns to `Idle` after a result was shown; a running operation is left alone
    pub fn acknowledge(&mut self) -> bool {
        if self.is_finished() {
            *self = OperationState::Idle;
            true
        } else {
            false
        }
    }
}

/// Publishes an [`OperationState`] to any number of observers.
///
/// The tracker does not prevent overlapping runs; callers check
/// [`OperationTracker::is_busy`] (e.g. to disable a button) before starting.
#[derive(Debug)]
pub struct OperationTracker<T> {
    name: &'static str,
    tx: watch::Sender<OperationState<T>>,
}

impl<T: Clone> OperationTracker<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(OperationState::Idle);
        Self { name, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> OperationState<T> {
        self.tx.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.tx.borrow().is_in_progress()
    }

    pub fn begin(&self) {
        if self.is_busy() {
            log::warn!("{} started while another run is in progress", self.name);
        }
        log::debug!("{}: in progress", self.name);
        self.tx.send_modify(OperationState::begin);
    }

    pub fn finish<E: Display>(&self, result: Result<T, E>) {
        match &result {
            Ok(_) => log::debug!("{}: success", self.name),
            Err(e) => log::debug!("{}: error: {}", self.name, e),
        }
        self.tx.send_modify(|state| state.finish(result));
    }

    pub fn acknowledge(&self) -> bool {
        let mut changed = false;
        self.tx.send_if_modified(|state| {
            changed = state.acknowledge();
            changed
        });
        changed
    }
}
