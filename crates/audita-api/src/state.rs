//! # Application State
//!
//! Shared state for the Axum application: the store, the team directory,
//! and the engine services, all behind `Arc` so the router clones stay
//! cheap.

use std::path::Path;
use std::sync::Arc;

use audita_engine::{
    EvidenceService, FsBlobStore, LifecycleEngine, SlotAllocator, TeamDirectory, TracingNotifier,
};
use audita_store::MemoryStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The audit/evidence store.
    pub store: Arc<MemoryStore>,
    /// Agent/team data consulted by visibility and enrichment.
    pub directory: Arc<TeamDirectory>,
    /// Status writes and the recovery pool.
    pub lifecycle: Arc<LifecycleEngine>,
    /// Creation gate and slot listing.
    pub allocator: Arc<SlotAllocator>,
    /// Evidence package operations.
    pub evidence: Arc<EvidenceService>,
}

impl AppState {
    /// Wire the full service graph over a fresh store, with evidence
    /// files rooted at `evidence_dir`.
    pub fn new(evidence_dir: &Path) -> Self {
        let store = Arc::new(MemoryStore::new());
        let directory = Arc::new(TeamDirectory::new());
        let notifier = Arc::new(TracingNotifier);
        let lifecycle = Arc::new(LifecycleEngine::new(Arc::clone(&store), notifier));
        let allocator = Arc::new(SlotAllocator::new(Arc::clone(&store)));
        let blobs = Arc::new(FsBlobStore::new(evidence_dir));
        let evidence = Arc::new(EvidenceService::new(Arc::clone(&store), blobs));
        Self {
            store,
            directory,
            lifecycle,
            allocator,
            evidence,
        }
    }
}
