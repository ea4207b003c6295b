//! Per-flow request lifecycle: `Idle -> Loading -> {Success | Error}`.
//!
//! Terminal states are only entered from `Loading`. A new trigger always
//! re-enters `Loading`, whatever the previous outcome was.

use std::future::Future;

use crate::error::{ApiError, ErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error { kind: ErrorKind, message: String },
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    /// Starts a fresh attempt, discarding any previous outcome.
    pub fn begin(&mut self) {
        *self = FetchState::Loading;
    }

    /// Publishes the outcome of the attempt started by [`begin`](Self::begin).
    ///
    /// Returns `false` and leaves the state alone when no attempt is pending.
    pub fn settle(&mut self, outcome: Result<T, ApiError>) -> bool {
        if !self.is_loading() {
            tracing::debug!("dropping response for a flow that is not loading");
            return false;
        }
        *self = match outcome {
            Ok(value) => FetchState::Success(value),
            Err(err) => FetchState::Error {
                kind: err.kind(),
                message: err.to_string(),
            },
        };
        true
    }

    /// Settles with a caller-chosen error, for flows that replace the
    /// underlying failure with their own wording.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = FetchState::Error {
            kind,
            message: message.into(),
        };
        true
    }

    /// Runs one request through the full lifecycle.
    pub async fn run<F>(&mut self, request: F)
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.begin();
        let outcome = request.await;
        self.settle(outcome);
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<(ErrorKind, &str)> {
        match self {
            FetchState::Error { kind, message } => Some((*kind, message.as_str())),
            _ => None,
        }
    }
}
