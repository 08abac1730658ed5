//! Shared fixtures for the integration suite.

use pc_01_ledger_store::{InMemoryLedger, LedgerConfig};
use pc_03_metadata_index::{IndexingCoordinator, InMemoryIndexStore, VisibilityConfig};
use pc_04_search::{SearchConfig, SearchService};
use shared_crypto::LayerKey;
use std::sync::Arc;
use std::sync::Once;

/// Master key shared by every fixture so keyed assertions line up.
pub const MASTER_KEY: [u8; 32] = [0x4D; 32];

static TRACING: Once = Once::new();

/// Install the test subscriber once. `RUST_LOG` filters as usual.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An in-memory ledger with the given signers authorized from time zero.
pub fn ledger_with_signers(signers: &[&str]) -> Arc<InMemoryLedger> {
    init_tracing();
    let ledger = Arc::new(InMemoryLedger::new_in_memory(LedgerConfig::default()));
    for signer in signers {
        let public = ledger.signing_provider().generate(signer.to_string());
        ledger.registry().authorize(signer.to_string(), public, 0);
    }
    ledger
}

/// A full search stack over one ledger: index store, coordinator, service.
pub struct SearchStack {
    pub ledger: Arc<InMemoryLedger>,
    pub store: Arc<InMemoryIndexStore>,
    pub coordinator: Arc<IndexingCoordinator<InMemoryIndexStore>>,
    pub service: SearchService<
        InMemoryIndexStore,
        InMemoryLedger,
        pc_01_ledger_store::InMemoryBlobStore,
    >,
}

pub fn search_stack(visibility: VisibilityConfig, signers: &[&str]) -> SearchStack {
    let ledger = ledger_with_signers(signers);
    let store = Arc::new(InMemoryIndexStore::new());
    let coordinator = Arc::new(IndexingCoordinator::new(
        Arc::clone(&store),
        visibility,
        LayerKey::from_bytes(MASTER_KEY),
    ));
    let service = SearchService::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        Arc::clone(ledger.blob_store()),
        SearchConfig::default(),
    );
    SearchStack {
        ledger,
        store,
        coordinator,
        service,
    }
}
