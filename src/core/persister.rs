use crate::domain::model::RankingScope;
use crate::domain::ports::PositionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Asks the report-card store to recompute positions, without waiting for it.
///
/// Failures are logged and go nowhere else.
#[derive(Clone)]
pub struct PositionPersister {
    store: Arc<dyn PositionStore>,
}

impl PositionPersister {
    pub fn new(store: Arc<dyn PositionStore>) -> Self {
        Self { store }
    }

    /// Spawns the persist command on the current tokio runtime.
    pub fn dispatch(&self, scope: RankingScope) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.recompute_positions(&scope).await {
                Ok(()) => tracing::info!("💾 Report-card positions updated for {}", scope),
                Err(e) => tracing::warn!(
                    "⚠️ Could not update report-card positions for {}: {} (Category: {:?})",
                    scope,
                    e,
                    e.category()
                ),
            }
        })
    }
}
