use crate::block::{hash_fields, DraftBlock};
use crate::hash::BlockHash;
use crate::pow::{CancelToken, Difficulty};
use rayon::prelude::*;
use tracing::{debug, info};

/// Searches nonces in parallel until a digest meets `difficulty`.
/// Returns the draft with the winning nonce set and its digest, or `None` if
/// `cancel` fired first.
///
/// The winning nonce is whichever worker finds one first, so it need not be
/// the smallest one a sequential search would return.
pub fn mine_parallel(
    mut draft: DraftBlock,
    difficulty: Difficulty,
    cancel: &CancelToken,
) -> Option<(DraftBlock, BlockHash)> {
    let base = &draft;

    // Rayon splits the range across threads; every worker polls the token.
    let found = (0u64..u64::MAX)
        .into_par_iter()
        .find_map_any(|nonce| {
            if cancel.is_cancelled() {
                return Some(None);
            }
            let hash = hash_fields(
                base.index,
                &base.transactions,
                base.timestamp,
                &base.previous_hash,
                nonce,
            );
            difficulty
                .is_satisfied_by(&hash)
                .then_some(Some((nonce, hash)))
        })
        .flatten();

    let Some((nonce, hash)) = found else {
        debug!(index = draft.index, "parallel mining cancelled");
        return None;
    };

    draft.nonce = nonce;
    info!(index = draft.index, nonce, %hash, "mined block in parallel");
    Some((draft, hash))
}
