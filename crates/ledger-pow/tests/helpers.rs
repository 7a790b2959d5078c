use ledger_pow::{Chain, Difficulty, DraftBlock, Miner, Transaction};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn transfer(from: &str, to: &str, amount: u64) -> Transaction {
    json!({ "from": from, "to": to, "amount": amount })
}

pub fn test_chain(zeros: u32) -> Chain {
    Chain::with_difficulty(Difficulty::new(zeros).expect("valid difficulty"))
}

/// Mine one block on top of the current tip and append it.
pub fn mine_and_append(chain: &mut Chain, txs: Vec<Transaction>) -> anyhow::Result<()> {
    let miner = Miner::for_chain(chain);
    let mut draft = DraftBlock::on_top_of(chain.last_block(), txs);
    let proof = miner.mine(&mut draft);
    let (accepted, reason) = miner.submit(chain, draft, proof);
    anyhow::ensure!(accepted, "block rejected: {reason}");
    Ok(())
}
