use bw_core::snapshot::AnalysisSnapshot;
use log::{debug, info};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Rejected publication.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    #[error("snapshot generation {generation} is older than published generation {current}")]
    Stale { generation: u64, current: u64 },
}

#[derive(Default)]
struct Published {
    generation: u64,
    snapshot: Option<Arc<AnalysisSnapshot>>,
}

/// Latest published snapshot, keyed by run generation.
///
/// The highest generation wins, not the latest arrival: a slow run that was
/// superseded can never overwrite the result of a newer one.
#[derive(Default)]
pub struct SnapshotStore {
    inner: RwLock<Published>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` if its generation is not older than the current one.
    pub fn publish(&self, snapshot: AnalysisSnapshot) -> Result<Arc<AnalysisSnapshot>, PublishError> {
        let mut published = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if snapshot.generation < published.generation {
            debug!(
                "Discarding stale snapshot generation {} (current {})",
                snapshot.generation, published.generation
            );
            return Err(PublishError::Stale {
                generation: snapshot.generation,
                current: published.generation,
            });
        }
        let snapshot = Arc::new(snapshot);
        published.generation = snapshot.generation;
        published.snapshot = Some(Arc::clone(&snapshot));
        info!("Published snapshot generation {}", snapshot.generation);
        Ok(snapshot)
    }

    pub fn current(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}
