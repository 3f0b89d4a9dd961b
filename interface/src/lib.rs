//! Stake warmup and cooldown accounting for resolution stake accounts.
//!
//! Reproduces, off-chain, the epoch-by-epoch accounting the ledger runtime
//! performs when a delegation activates or deactivates, so a client can show
//! how much of a resolution's stake is effective, still warming up, or still
//! cooling down.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod stake_history;
pub mod state;
pub mod warmup_cooldown_allowance;

use {
    solana_clock::Epoch,
    stake_history::StakeHistoryGetEntry,
    state::{Delegation, StakeActivationStatus},
};

/// Computes the effective, activating, and deactivating portions of
/// `delegation` as of `target_epoch`.
///
/// `history` is consulted only by exact epoch. Missing epochs mean the
/// transition in progress is treated as complete.
#[inline]
pub fn compute_activation<T: StakeHistoryGetEntry + ?Sized>(
    delegation: &Delegation,
    target_epoch: Epoch,
    history: &T,
) -> StakeActivationStatus {
    delegation.stake_activating_and_deactivating(target_epoch, history)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        stake_history::{StakeHistory, StakeHistoryEntry},
    };

    #[test]
    fn test_compute_activation_guarantees() {
        let delegation = Delegation {
            stake: 1_000,
            activation_epoch: 3,
            deactivation_epoch: 7,
            ..Delegation::default()
        };
        let stake_history: StakeHistory = (0..12)
            .map(|epoch| {
                (
                    epoch,
                    StakeHistoryEntry {
                        effective: 20_000,
                        activating: 4_000,
                        deactivating: 4_000,
                    },
                )
            })
            .collect();

        for epoch in 0..12 {
            let status = compute_activation(&delegation, epoch, &stake_history);
            assert!(status.activating == 0 || status.deactivating == 0);
            assert!(status.effective + status.activating <= delegation.stake);
            if epoch >= delegation.deactivation_epoch {
                assert_eq!(status.effective, status.deactivating);
            }
        }
    }
}
