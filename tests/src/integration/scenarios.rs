//! # End-to-End Scenarios
//!
//! Full lifecycle walks through append, validation, revocation,
//! concurrent indexing, keyed search, and audited truncation.

#[cfg(test)]
mod tests {
    use crate::support::{ledger_with_signers, search_stack, MASTER_KEY};
    use pc_01_ledger_store::{LedgerApi, LedgerError};
    use pc_02_chain_validator::{ChainValidator, ValidatorConfig};
    use pc_03_metadata_index::{
        generate_layers, IndexOutcome, MetadataIndexStore, TermVisibility, VisibilityConfig,
    };
    use pc_04_search::{DecryptOutcome, SearchQuery};
    use shared_crypto::LayerKey;
    use std::sync::Arc;

    /// Three appends by an authorized signer: tail at sequence 2, clean
    /// validation report.
    #[test]
    fn test_three_appends_then_clean_validation() {
        let ledger = ledger_with_signers(&["clerk-1"]);
        for i in 0..3 {
            ledger
                .append(format!("record {i}").into_bytes(), "clerk-1".to_string())
                .unwrap();
        }

        let tail = ledger.tail().unwrap().unwrap();
        assert_eq!(tail.sequence(), 2);

        let validator = ChainValidator::new(
            Arc::clone(&ledger),
            Arc::clone(ledger.registry()),
            ValidatorConfig::default(),
        );
        let report = validator.validate().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.blocks_checked, 3);
        assert_eq!(report.structural_failures, 0);
        assert_eq!(report.compliance_failures, 0);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"blocks_checked\": 3"));
    }

    /// A revoked signer can no longer append; the ledger keeps its
    /// pre-revocation length.
    #[test]
    fn test_revoked_signer_is_refused() {
        let ledger = ledger_with_signers(&["clerk-1"]);
        for i in 0..3 {
            ledger
                .append(format!("record {i}").into_bytes(), "clerk-1".to_string())
                .unwrap();
        }

        ledger.registry().revoke("clerk-1", 1);
        assert!(matches!(
            ledger.append(b"late record".to_vec(), "clerk-1".to_string()),
            Err(LedgerError::NotAuthorized { .. })
        ));
        assert_eq!(ledger.count().unwrap(), 3);
    }

    /// Fifty workers race to index the same block: one generates, the
    /// rest observe a no-op, and the stored layers equal a fresh
    /// deterministic regeneration.
    #[test]
    fn test_fifty_workers_index_one_block_once() {
        let mut visibility = VisibilityConfig::default();
        visibility.set("2024", TermVisibility::Public);
        let stack = Arc::new(search_stack(visibility.clone(), &["clerk-1"]));
        let block = stack
            .ledger
            .append(b"audit batch 2024".to_vec(), "clerk-1".to_string())
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let stack = Arc::clone(&stack);
            let block = block.clone();
            handles.push(std::thread::spawn(move || {
                stack.coordinator.index_block(&block, &[]).unwrap()
            }));
        }

        let outcomes: Vec<IndexOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let newly = outcomes
            .iter()
            .filter(|o| **o == IndexOutcome::NewlyIndexed)
            .count();
        assert_eq!(newly, 1);
        assert_eq!(outcomes.len() - newly, 49);
        assert_eq!(stack.store.len().unwrap(), 1);

        let entry = stack.store.get(&block.content_hash).unwrap().unwrap();
        let regenerated = generate_layers(
            &block,
            &[],
            &visibility,
            &LayerKey::from_bytes(MASTER_KEY),
        )
        .unwrap();
        assert_eq!(entry.public_terms, regenerated.public_layer.public_keywords);
        assert_eq!(entry.private_ciphertext, regenerated.private_ciphertext);
    }

    /// The invoice walk: "2024" is PUBLIC and findable blind, "ACME-99"
    /// is PRIVATE and only findable with the right key.
    #[test]
    fn test_invoice_term_visibility_walk() {
        let mut visibility = VisibilityConfig::default();
        visibility.set("2024", TermVisibility::Public);
        visibility.set("ACME-99", TermVisibility::Private);
        let stack = search_stack(visibility, &["clerk-1"]);

        let block = stack
            .ledger
            .append(
                b"invoice 2024 ACME-99 total 500 EUR".to_vec(),
                "clerk-1".to_string(),
            )
            .unwrap();
        stack.coordinator.index_block(&block, &[]).unwrap();

        let year = SearchQuery::keywords(vec!["2024".to_string()], 10);
        let blind = stack.service.search(&year, None).unwrap();
        assert_eq!(blind.len(), 1);
        assert_eq!(blind.matches[0].block_hash, hex::encode(block.content_hash));

        let customer = SearchQuery::keywords(vec!["ACME-99".to_string()], 10);
        assert!(stack.service.search(&customer, None).unwrap().is_empty());

        let key = LayerKey::from_bytes(MASTER_KEY);
        let keyed = stack.service.search(&customer, Some(&key)).unwrap();
        assert_eq!(keyed.len(), 1);

        match stack.service.decrypt_layer(&block.content_hash, &key).unwrap() {
            DecryptOutcome::Found(layer) => {
                assert!(layer.private_keywords.contains("acme-99"));
                assert!(layer.private_keywords.contains("500"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    /// Audited truncation of a 1000-block ledger back to sequence 5:
    /// 994 blocks removed, numbering resumes gap-free, and a repeat
    /// truncation is a no-op.
    #[test]
    fn test_truncation_is_audited_and_idempotent() {
        let ledger = ledger_with_signers(&["clerk-1"]);
        for i in 0..1000 {
            ledger
                .append(format!("record {i}").into_bytes(), "clerk-1".to_string())
                .unwrap();
        }

        let removed = ledger.truncate_after(5).unwrap();
        assert_eq!(removed, 994);
        assert_eq!(ledger.count().unwrap(), 6);
        assert_eq!(ledger.tail().unwrap().unwrap().sequence(), 5);

        assert_eq!(ledger.truncate_after(5).unwrap(), 0);

        let next = ledger
            .append(b"post-rollback record".to_vec(), "clerk-1".to_string())
            .unwrap();
        assert_eq!(next.sequence(), 6);
        assert_eq!(next.header.previous_hash, {
            ledger.get_by_number(5).unwrap().content_hash
        });
    }
}
