//! Culling Module
//!
//! Bounds the number of stored entries by deleting a random fraction of
//! them, or all of them, once the configured cap is reached.

use tracing::debug;

use crate::cache::store::Store;
use crate::error::Result;

/// What a culling pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullOutcome {
    /// Entry count was under the cap
    Skipped,
    /// Every entry was deleted
    Cleared(usize),
    /// A random sample of entries was deleted
    Sampled(usize),
}

impl CullOutcome {
    /// Number of entries removed by the pass.
    pub fn removed(&self) -> usize {
        match self {
            CullOutcome::Skipped => 0,
            CullOutcome::Cleared(n) | CullOutcome::Sampled(n) => *n,
        }
    }
}

/// Runs one culling pass.
///
/// Once `count >= max_entries`, a `cull_frequency` of 0 clears the table and
/// any other value deletes `count / cull_frequency` randomly chosen keys.
pub fn cull(store: &Store, max_entries: usize, cull_frequency: usize) -> Result<CullOutcome> {
    let count = store.count()?;
    if count < max_entries {
        return Ok(CullOutcome::Skipped);
    }

    let outcome = if cull_frequency == 0 {
        CullOutcome::Cleared(store.delete_all()?)
    } else {
        let keys = store.sample_keys(count / cull_frequency)?;
        CullOutcome::Sampled(store.delete_rows(&keys)?)
    };

    debug!(
        "Culled {} of {} entries ({:?})",
        outcome.removed(),
        count,
        outcome
    );
    Ok(outcome)
}
