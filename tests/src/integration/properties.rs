//! # Cross-Crate Properties
//!
//! Concurrency and integrity guarantees exercised across crate
//! boundaries: sequencing under contention, chain linkage as the
//! validator sees it, envelope-only mutability, indexing idempotency,
//! bounded traversal, term visibility, and the result-limit contract.

#[cfg(test)]
mod tests {
    use crate::support::{ledger_with_signers, search_stack, MASTER_KEY};
    use pc_01_ledger_store::{LedgerApi, LedgerError};
    use pc_02_chain_validator::{ChainValidator, ValidatorConfig};
    use pc_03_metadata_index::{IndexOutcome, MetadataIndexStore, TermVisibility, VisibilityConfig};
    use pc_04_search::{SearchError, SearchQuery};
    use shared_crypto::LayerKey;
    use shared_types::GENESIS_PARENT_HASH;
    use std::collections::HashSet;
    use std::sync::Arc;

    // =========================================================================
    // SEQUENCING
    // =========================================================================

    /// Concurrent appends never observe the same sequence number.
    #[test]
    fn test_concurrent_appends_get_unique_sequences() {
        let ledger = ledger_with_signers(&["clerk-1"]);

        let mut handles = Vec::new();
        for worker in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                let mut sequences = Vec::new();
                for i in 0..25 {
                    let block = ledger
                        .append(
                            format!("worker {worker} record {i}").into_bytes(),
                            "clerk-1".to_string(),
                        )
                        .unwrap();
                    sequences.push(block.sequence());
                }
                sequences
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for sequence in handle.join().unwrap() {
                assert!(seen.insert(sequence), "duplicate sequence {sequence}");
            }
        }
        assert_eq!(seen.len(), 200);
        assert_eq!(ledger.count().unwrap(), 200);
    }

    // =========================================================================
    // CHAIN LINKAGE
    // =========================================================================

    /// Every committed block links to its predecessor's content hash and
    /// the validator agrees.
    #[test]
    fn test_chain_linkage_holds_under_concurrent_writers() {
        let ledger = ledger_with_signers(&["clerk-1", "clerk-2"]);

        let mut handles = Vec::new();
        for (worker, signer) in ["clerk-1", "clerk-2"].iter().enumerate() {
            let ledger = Arc::clone(&ledger);
            let signer = signer.to_string();
            handles.push(std::thread::spawn(move || {
                for i in 0..30 {
                    ledger
                        .append(format!("w{worker} r{i}").into_bytes(), signer.clone())
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut previous = GENESIS_PARENT_HASH;
        for sequence in 0..60 {
            let block = ledger.get_by_number(sequence).unwrap();
            assert_eq!(block.header.previous_hash, previous);
            previous = block.content_hash;
        }

        let validator = ChainValidator::new(
            Arc::clone(&ledger),
            Arc::clone(ledger.registry()),
            ValidatorConfig::default(),
        );
        let report = validator.validate().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.blocks_checked, 60);
    }

    // =========================================================================
    // ENVELOPE-ONLY MUTABILITY
    // =========================================================================

    /// The metadata envelope may change; hash-critical fields may not.
    #[test]
    fn test_envelope_mutates_but_headers_do_not() {
        let ledger = ledger_with_signers(&["clerk-1"]);
        let block = ledger
            .append(b"record".to_vec(), "clerk-1".to_string())
            .unwrap();

        let mut enriched = block.clone();
        enriched.envelope.category = Some("records".to_string());
        let updated = ledger.update_envelope(enriched).unwrap();
        assert_eq!(updated.content_hash, block.content_hash);
        assert_eq!(
            updated.envelope.category.as_deref(),
            Some("records")
        );

        let mut tampered = updated;
        tampered.header.timestamp += 1;
        assert!(matches!(
            ledger.update_envelope(tampered),
            Err(LedgerError::ImmutableFieldMutation { sequence: 0 })
        ));
    }

    // =========================================================================
    // INDEXING
    // =========================================================================

    /// Re-indexing an indexed block is a no-op, not an error.
    #[test]
    fn test_indexing_is_idempotent() {
        let stack = search_stack(VisibilityConfig::default(), &["clerk-1"]);
        let block = stack
            .ledger
            .append(b"invoice 2024".to_vec(), "clerk-1".to_string())
            .unwrap();

        assert_eq!(
            stack.coordinator.index_block(&block, &[]).unwrap(),
            IndexOutcome::NewlyIndexed
        );
        for _ in 0..5 {
            assert_eq!(
                stack.coordinator.index_block(&block, &[]).unwrap(),
                IndexOutcome::AlreadyIndexed
            );
        }
        assert_eq!(stack.store.len().unwrap(), 1);
    }

    /// Same-hash indexing is serialized; distinct hashes proceed in
    /// parallel and every block ends up indexed exactly once in effect.
    #[test]
    fn test_concurrent_indexing_across_hashes() {
        let stack = Arc::new(search_stack(VisibilityConfig::default(), &["clerk-1"]));
        let mut blocks = Vec::new();
        for i in 0..10 {
            blocks.push(
                stack
                    .ledger
                    .append(format!("record {i}").into_bytes(), "clerk-1".to_string())
                    .unwrap(),
            );
        }

        let mut handles = Vec::new();
        for _ in 0..6 {
            let stack = Arc::clone(&stack);
            let blocks = blocks.clone();
            handles.push(std::thread::spawn(move || {
                let mut newly = 0u64;
                for block in &blocks {
                    if stack.coordinator.index_block(block, &[]).unwrap()
                        == IndexOutcome::NewlyIndexed
                    {
                        newly += 1;
                    }
                }
                newly
            }));
        }

        let total_newly: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total_newly, 10);
        assert_eq!(stack.store.len().unwrap(), 10);
    }

    // =========================================================================
    // BOUNDED TRAVERSAL
    // =========================================================================

    /// Whole-ledger traversal runs in fixed-size batches and visits every
    /// block exactly once.
    #[test]
    fn test_for_each_batch_bounds_batch_size() {
        let ledger = ledger_with_signers(&["clerk-1"]);
        for i in 0..250 {
            ledger
                .append(format!("record {i}").into_bytes(), "clerk-1".to_string())
                .unwrap();
        }

        let mut batches = 0u64;
        let mut visited = 0u64;
        let mut expected_next = 0u64;
        let total = ledger
            .for_each_batch(100, &mut |blocks| {
                batches += 1;
                assert!(blocks.len() <= 100);
                for block in blocks {
                    assert_eq!(block.sequence(), expected_next);
                    expected_next += 1;
                    visited += 1;
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(total, 250);
        assert_eq!(visited, 250);
        assert_eq!(batches, 3);
    }

    // =========================================================================
    // TERM VISIBILITY AND RESULT LIMITS
    // =========================================================================

    /// A PUBLIC term is findable without any key; a PRIVATE term only
    /// after the private layer opens with the right key.
    #[test]
    fn test_term_visibility_gates_search() {
        let mut visibility = VisibilityConfig::default();
        visibility.set("alpha-7", TermVisibility::Public);
        visibility.set("omega-9", TermVisibility::Private);
        let stack = search_stack(visibility, &["clerk-1"]);

        let block = stack
            .ledger
            .append(b"codes alpha-7 omega-9".to_vec(), "clerk-1".to_string())
            .unwrap();
        stack.coordinator.index_block(&block, &[]).unwrap();

        let public = SearchQuery::keywords(vec!["alpha-7".to_string()], 10);
        assert_eq!(stack.service.search(&public, None).unwrap().len(), 1);

        let private = SearchQuery::keywords(vec!["omega-9".to_string()], 10);
        assert!(stack.service.search(&private, None).unwrap().is_empty());
        assert_eq!(
            stack
                .service
                .search(&private, Some(&LayerKey::from_bytes(MASTER_KEY)))
                .unwrap()
                .len(),
            1
        );
    }

    /// A zero result cap is a caller error raised before any query work.
    #[test]
    fn test_zero_result_cap_is_a_caller_error() {
        let stack = search_stack(VisibilityConfig::default(), &["clerk-1"]);
        let query = SearchQuery::keywords(vec!["anything".to_string()], 0);
        assert!(matches!(
            stack.service.search(&query, None),
            Err(SearchError::ZeroMaxResults)
        ));
    }
}
