//! # Search Service
//!
//! Evaluates bounded queries against the metadata index, reaching into
//! the ledger and the blob store only at the deeper search levels.
//!
//! Query validation happens before any index access; an invalid query
//! has no side effects. The scan stops as soon as `max_results` matches
//! are collected.

use crate::query::{validate_term, SearchConfig, SearchDepth, SearchError, SearchQuery};
use crate::results::{SearchMatch, SearchResultSet};
use pc_01_ledger_store::{BlobStore, LedgerApi, LedgerError};
use pc_03_metadata_index::{
    decrypt_private_layer, normalize_term, IndexError, IndexedEntry, MetadataIndexStore,
    PrivateLayer,
};
use shared_crypto::LayerKey;
use shared_types::{short_hash, BlockPayload, Hash};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of asking for one block's private layer. Tagged so "never
/// indexed" and "wrong key" stay distinguishable.
#[derive(Debug)]
pub enum DecryptOutcome {
    /// No index entry for this hash.
    NotFound,
    /// Entry exists but the supplied key did not open it.
    DecryptionFailed,
    /// Decrypted private layer.
    Found(PrivateLayer),
}

/// Search over an index store, a ledger, and an off-chain blob store.
pub struct SearchService<S, L, B>
where
    S: MetadataIndexStore,
    L: LedgerApi,
    B: BlobStore,
{
    index: Arc<S>,
    ledger: Arc<L>,
    blobs: Arc<B>,
    config: SearchConfig,
}

impl<S, L, B> SearchService<S, L, B>
where
    S: MetadataIndexStore,
    L: LedgerApi,
    B: BlobStore,
{
    pub fn new(index: Arc<S>, ledger: Arc<L>, blobs: Arc<B>, config: SearchConfig) -> Self {
        Self {
            index,
            ledger,
            blobs,
            config,
        }
    }

    /// Run a bounded query. `key` is the indexing master key; without it
    /// only public terms participate, with it private terms do too.
    ///
    /// ## Errors
    ///
    /// - `ZeroMaxResults`: rejected before any index access
    /// - `EmptyQuery`: no terms and no filters
    /// - `TermTooShort`: a term failed validation
    /// - `Index` / `Ledger`: a backing store failed mid-scan
    pub fn search(
        &self,
        query: &SearchQuery,
        key: Option<&LayerKey>,
    ) -> Result<SearchResultSet, SearchError> {
        if query.max_results == 0 {
            return Err(SearchError::ZeroMaxResults);
        }
        if query.terms.is_empty() && query.category.is_none() && query.annotations.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        for term in &query.terms {
            validate_term(term, &self.config)?;
        }
        let terms: Vec<String> = query.terms.iter().map(|t| normalize_term(t)).collect();

        let mut set = SearchResultSet::default();
        let mut scan_error: Option<SearchError> = None;
        self.index.scan(&mut |entry| {
            if set.matches.len() >= query.max_results {
                set.truncated = true;
                return false;
            }
            match self.evaluate(entry, query, &terms, key, &mut set.decrypt_failures) {
                Ok(Some(m)) => set.matches.push(m),
                Ok(None) => {}
                Err(e) => {
                    scan_error = Some(e);
                    return false;
                }
            }
            true
        })?;
        if let Some(e) = scan_error {
            return Err(e);
        }

        set.rank();
        debug!(
            "[pc-04] 🔎 query matched {} block(s){}",
            set.matches.len(),
            if set.truncated { " (capped)" } else { "" }
        );
        Ok(set)
    }

    /// Decrypt the private layer of one indexed block.
    ///
    /// ## Errors
    ///
    /// - `Index`: the store failed; key mismatch is NOT an error, it is
    ///   the tagged [`DecryptOutcome::DecryptionFailed`]
    pub fn decrypt_layer(
        &self,
        block_hash: &Hash,
        key: &LayerKey,
    ) -> Result<DecryptOutcome, SearchError> {
        let entry = match self.index.get(block_hash)? {
            Some(entry) => entry,
            None => return Ok(DecryptOutcome::NotFound),
        };
        match decrypt_private_layer(block_hash, &entry.signer, &entry.private_ciphertext, key) {
            Ok(layer) => Ok(DecryptOutcome::Found(layer)),
            Err(IndexError::DecryptionFailed) => Ok(DecryptOutcome::DecryptionFailed),
            Err(e) => Err(e.into()),
        }
    }

    /// Decide whether one entry matches, collecting the matched terms.
    fn evaluate(
        &self,
        entry: &IndexedEntry,
        query: &SearchQuery,
        terms: &[String],
        key: Option<&LayerKey>,
        decrypt_failures: &mut u64,
    ) -> Result<Option<SearchMatch>, SearchError> {
        if let Some(category) = &query.category {
            if entry.category.as_deref() != Some(category.as_str()) {
                return Ok(None);
            }
        }
        for (k, v) in &query.annotations {
            if entry.annotations.get(k) != Some(v) {
                return Ok(None);
            }
        }

        let mut matched: BTreeSet<String> = terms
            .iter()
            .filter(|t| entry.public_terms.contains(*t))
            .cloned()
            .collect();

        if matched.len() < terms.len() {
            if let Some(key) = key {
                match decrypt_private_layer(
                    &entry.block_hash,
                    &entry.signer,
                    &entry.private_ciphertext,
                    key,
                ) {
                    Ok(layer) => {
                        matched.extend(
                            terms
                                .iter()
                                .filter(|t| layer.private_keywords.contains(*t))
                                .cloned(),
                        );
                    }
                    Err(IndexError::DecryptionFailed) => {
                        *decrypt_failures += 1;
                        warn!(
                            "[pc-04] 🔐 private layer of {} did not open",
                            short_hash(&entry.block_hash)
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if matched.len() < terms.len() && query.depth != SearchDepth::KeywordOnly {
            self.scan_content(entry, terms, query.depth, &mut matched)?;
        }

        if terms.is_empty() || !matched.is_empty() {
            Ok(Some(SearchMatch::new(
                entry.sequence,
                &entry.block_hash,
                entry.timestamp,
                entry.category.clone(),
                matched,
                terms.len(),
            )))
        } else {
            Ok(None)
        }
    }

    /// Match remaining terms against the payload text. A block that was
    /// truncated out from under its index entry, or a blob that fails to
    /// resolve, simply contributes no content matches.
    fn scan_content(
        &self,
        entry: &IndexedEntry,
        terms: &[String],
        depth: SearchDepth,
        matched: &mut BTreeSet<String>,
    ) -> Result<(), SearchError> {
        let block = match self.ledger.get_by_hash(&entry.block_hash) {
            Ok(block) => block,
            Err(LedgerError::HashNotFound { .. }) | Err(LedgerError::BlockNotFound { .. }) => {
                warn!(
                    "[pc-04] 🔎 indexed block {} no longer on ledger",
                    short_hash(&entry.block_hash)
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let text = match &block.payload {
            BlockPayload::Inline(bytes) => String::from_utf8_lossy(bytes).to_lowercase(),
            BlockPayload::External(reference) => {
                if depth != SearchDepth::Exhaustive {
                    return Ok(());
                }
                match self.blobs.retrieve(reference) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).to_lowercase(),
                    Err(e) => {
                        warn!(
                            "[pc-04] 🔎 off-chain payload of block #{} unavailable: {}",
                            block.sequence(),
                            e
                        );
                        return Ok(());
                    }
                }
            }
        };
        matched.extend(terms.iter().filter(|t| text.contains(*t)).cloned());
        Ok(())
    }
}
