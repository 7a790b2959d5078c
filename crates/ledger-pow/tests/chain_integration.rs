mod helpers;

use helpers::{init_tracing, mine_and_append, test_chain, transfer};
use ledger_pow::{
    AcceptError, BlockHash, CancelToken, Chain, ChainFault, DraftBlock, Miner, ParentHash,
    ProofError, SharedChain,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn three_blocks_then_tamper() -> anyhow::Result<()> {
    init_tracing();
    let mut chain = test_chain(2);
    mine_and_append(&mut chain, vec![transfer("Alice", "Bob", 10)])?;
    mine_and_append(&mut chain, vec![transfer("Bob", "Charlie", 5)])?;
    mine_and_append(&mut chain, vec![transfer("Charlie", "Dave", 2)])?;
    assert_eq!(chain.len(), 4);
    assert!(chain.is_chain_valid());
    assert!(Miner::for_chain(&chain).validate_chain(&chain));

    for block in chain.blocks().iter().skip(1) {
        assert!(block.hash().to_hex().starts_with("00"));
        assert!(block.is_consistent());
    }

    // Edit block 2 through its serialized form and load it back.
    let mut value = serde_json::to_value(&chain)?;
    value["blocks"][2]["transactions"] = serde_json::json!([transfer("Bob", "Mallory", 500)]);
    let tampered: Chain = serde_json::from_value(value)?;

    assert!(!tampered.is_chain_valid());
    let err = tampered.verify().unwrap_err();
    assert_eq!(err.index, 2);
    assert!(matches!(err.fault, ChainFault::HashMismatch { .. }));
    Ok(())
}

#[test]
fn submit_reports_reasons() -> anyhow::Result<()> {
    init_tracing();
    let mut chain = test_chain(2);
    let miner = Miner::for_chain(&chain);

    // (a) wrong parent
    let mut orphan = DraftBlock::now(1, vec![], ParentHash::Genesis);
    let proof = miner.mine(&mut orphan);
    let (ok, reason) = miner.submit(&mut chain, orphan, proof);
    assert!(!ok);
    assert!(reason.contains("does not extend the tip"), "{reason}");

    // (b) the block's own digest, but above the target
    let mut weak = DraftBlock::on_top_of(chain.last_block(), vec![transfer("A", "B", 1)]);
    while weak.compute_hash().leading_zero_nibbles() >= 2 {
        weak.nonce += 1;
    }
    let proof = weak.compute_hash();
    let (ok, reason) = miner.submit(&mut chain, weak, proof);
    assert!(!ok);
    assert!(reason.contains("leading zero nibbles"), "{reason}");

    // (c) a low digest that belongs to some other content
    let draft = DraftBlock::on_top_of(chain.last_block(), vec![transfer("A", "B", 1)]);
    let forged: BlockHash = format!("0000{}", "f".repeat(60)).parse()?;
    let (ok, reason) = miner.submit(&mut chain, draft, forged);
    assert!(!ok);
    assert!(reason.contains("does not match"), "{reason}");

    assert_eq!(chain.len(), 1);

    let mut draft = DraftBlock::on_top_of(chain.last_block(), vec![transfer("A", "B", 1)]);
    let proof = miner.mine(&mut draft);
    let (ok, reason) = miner.submit(&mut chain, draft, proof);
    assert!(ok);
    assert_eq!(reason, "Block added to the blockchain.");
    assert_eq!(chain.len(), 2);
    Ok(())
}

#[test]
fn miner_with_lower_difficulty_cannot_bypass_chain() {
    init_tracing();
    let mut chain = test_chain(3);
    let lax = Miner::new(ledger_pow::Difficulty::new(0).unwrap());
    let mut draft = DraftBlock::on_top_of(chain.last_block(), vec![]);
    // Walk forward from the lax miner's nonce to one the chain's target refuses.
    let mut proof = lax.mine(&mut draft);
    while proof.leading_zero_nibbles() >= 3 {
        draft.nonce += 1;
        proof = draft.compute_hash();
    }
    assert!(lax.valid_proof(&draft, &proof));
    assert!(matches!(
        chain.add_block(draft, proof),
        Err(AcceptError::InvalidProof(ProofError::InsufficientWork {
            required: 3,
            ..
        }))
    ));
    assert_eq!(chain.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_miners_one_winner_per_tip() -> anyhow::Result<()> {
    init_tracing();
    let shared = SharedChain::new(test_chain(2));
    let tip = shared.tip();
    let wins = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for i in 0..8u64 {
        let shared = shared.clone();
        let wins = wins.clone();
        let tip = tip.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let miner = Miner::new(shared.difficulty());
            let mut draft = DraftBlock::on_top_of(&tip, vec![transfer("miner", "pool", i)]);
            let proof = miner
                .mine_with_cancel(&mut draft, &CancelToken::new())
                .expect("not cancelled");
            match shared.add_block(draft, proof) {
                Ok(_) => {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
                Err(AcceptError::LinkageMismatch { .. }) => {}
                Err(other) => panic!("unexpected rejection: {other}"),
            }
        }));
    }
    for handle in handles {
        handle.await?;
    }

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(shared.len(), 2);
    assert!(shared.is_chain_valid());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_miners_keep_extending() -> anyhow::Result<()> {
    init_tracing();
    let shared = SharedChain::new(test_chain(1));
    let mut handles = Vec::new();

    for i in 0..4u64 {
        let shared = shared.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let miner = Miner::new(shared.difficulty());
            let mut accepted = 0;
            while accepted < 3 {
                let mut draft =
                    DraftBlock::on_top_of(&shared.tip(), vec![transfer("miner", "pool", i)]);
                let proof = miner.mine(&mut draft);
                if shared.add_block(draft, proof).is_ok() {
                    accepted += 1;
                }
            }
        }));
    }
    for handle in handles {
        handle.await?;
    }

    assert_eq!(shared.len(), 1 + 4 * 3);
    shared.verify()?;
    let chain = shared.snapshot();
    for (i, block) in chain.blocks().iter().enumerate() {
        assert_eq!(block.index(), i as u64);
    }
    Ok(())
}
