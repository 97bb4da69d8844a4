//! Ordered steps with optional compensators, undone in reverse on failure

use std::fmt;
use std::future::Future;
use std::pin::Pin;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Compensator =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>> + Send>;

/// Outcome of running the compensators
#[derive(Debug)]
pub struct CompensationReport<S> {
    /// Steps whose compensator succeeded, in the order they were undone
    pub compensated: Vec<S>,
    /// Steps whose compensator failed, with the error text
    pub failures: Vec<(S, String)>,
}

impl<S> CompensationReport<S> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Saga<S> {
    completed: Vec<S>,
    compensators: Vec<(S, Compensator)>,
}

impl<S: Copy + fmt::Display> Saga<S> {
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
            compensators: Vec::new(),
        }
    }

    /// Mark a step done; nothing to undo
    pub fn record(&mut self, step: S) {
        self.completed.push(step);
    }

    /// Mark a step done and register how to undo it
    pub fn record_with_compensator<F, Fut>(&mut self, step: S, undo: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.completed.push(step);
        self.compensators
            .push((step, Box::new(move || Box::pin(undo()))));
    }

    pub fn completed(&self) -> &[S] {
        &self.completed
    }

    /// Run every registered compensator, newest first. A failing
    /// compensator does not stop the ones before it.
    pub async fn compensate(self) -> CompensationReport<S> {
        let mut report = CompensationReport {
            compensated: Vec::new(),
            failures: Vec::new(),
        };
        for (step, undo) in self.compensators.into_iter().rev() {
            match undo().await {
                Ok(()) => {
                    tracing::info!(step = %step, "Compensated provisioning step");
                    report.compensated.push(step);
                }
                Err(e) => {
                    tracing::error!(step = %step, error = %e, "Compensation failed");
                    report.failures.push((step, e.to_string()));
                }
            }
        }
        report
    }
}

impl<S: Copy + fmt::Display> Default for Saga<S> {
    fn default() -> Self {
        Self::new()
    }
}
