use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{CheckResult, CycleState, Lifecycle};

#[derive(Debug, Default)]
pub struct StatusBoard {
    inner: RwLock<CycleState>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn begin_cycle(&self) {
        self.inner.write().await.results.clear();
    }

    pub(crate) async fn mark_running(&self) {
        let mut state = self.inner.write().await;
        if state.lifecycle == Lifecycle::Starting {
            state.lifecycle = Lifecycle::Running;
        }
    }

    pub(crate) async fn publish(&self, results: Vec<CheckResult>) {
        let mut state = self.inner.write().await;
        state.results = results;
        state.updated_at = Some(Utc::now());
    }

    pub async fn snapshot(&self) -> CycleState {
        self.inner.read().await.clone()
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        self.inner.read().await.lifecycle
    }
}
