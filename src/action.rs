//! Per-action request lifecycle. Each action kind (explain, refactor,
//! generate tests) owns an independent loading/error/result cell so one
//! action's request never blocks another's.
//!
//! Race rule: authority belongs to the most recently started call for an
//! action kind, decided by a per-cell sequence number taken at call start.
//! A superseded call's completion is a no-op, whatever order the responses
//! arrive in. The underlying transport is not aborted; its late result is
//! simply dropped.

use crate::api::types::*;
use crate::api::{ApiClient, ApiError};
use std::sync::Mutex;

pub const EMPTY_CODE_ERROR: &str = "Code cannot be empty";

/// Loading/error/result cell for one action kind.
#[derive(Debug)]
pub struct ActionState<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    is_loading: bool,
    error: Option<String>,
    result: Option<T>,
    seq: u64,
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                is_loading: false,
                error: None,
                result: None,
                seq: 0,
            }),
        }
    }
}

impl<T: Clone> ActionState<T> {
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn result(&self) -> Option<T> {
        self.lock().result.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn clear_result(&self) {
        self.lock().result = None;
    }

    /// Clears both, and bumps the sequence so an in-flight completion cannot
    /// resurrect state after an explicit reset.
    pub fn clear_all(&self) {
        let mut inner = self.lock();
        inner.error = None;
        inner.result = None;
        inner.is_loading = false;
        inner.seq += 1;
    }

    /// Validation-failure path sets only the error; the prior result stays.
    fn begin(&self, code: &str) -> Option<u64> {
        let mut inner = self.lock();
        if code.trim().is_empty() {
            let err = ApiError::Validation(EMPTY_CODE_ERROR.to_string());
            tracing::warn!(error = %err, "rejected before any network call");
            inner.error = Some(err.to_string());
            return None;
        }
        inner.seq += 1;
        inner.is_loading = true;
        inner.error = None;
        inner.result = None;
        Some(inner.seq)
    }

    fn finish(&self, seq: u64, action: &str, outcome: Result<T, ApiError>) {
        let mut inner = self.lock();
        if inner.seq != seq {
            tracing::debug!(action, seq, "dropping superseded response");
            return;
        }
        inner.is_loading = false;
        match outcome {
            Ok(result) => inner.result = Some(result),
            Err(err) => {
                tracing::error!(action, error = %err, "request failed");
                inner.error = Some(err.to_string());
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().expect("action state lock poisoned")
    }
}

#[derive(Debug, Default)]
pub struct ExplainAction {
    pub state: ActionState<ExplainResponse>,
}

impl ExplainAction {
    pub async fn run(&self, client: &ApiClient, req: &ExplainRequest) {
        let Some(seq) = self.state.begin(&req.code) else {
            return;
        };
        let outcome = client.explain(req).await;
        self.state.finish(seq, "explain", outcome);
    }
}

#[derive(Debug, Default)]
pub struct RefactorAction {
    pub state: ActionState<RefactorResponse>,
}

impl RefactorAction {
    pub async fn run(&self, client: &ApiClient, req: &RefactorRequest) {
        let Some(seq) = self.state.begin(&req.code) else {
            return;
        };
        let outcome = client.refactor(req).await;
        self.state.finish(seq, "refactor", outcome);
    }
}

#[derive(Debug, Default)]
pub struct GenerateTestsAction {
    pub state: ActionState<GenerateTestsResponse>,
}

impl GenerateTestsAction {
    pub async fn run(&self, client: &ApiClient, req: &GenerateTestsRequest) {
        let Some(seq) = self.state.begin(&req.code) else {
            return;
        };
        let outcome = client.generate_tests(req).await;
        self.state.finish(seq, "generate_tests", outcome);
    }
}
