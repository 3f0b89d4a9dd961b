use crate::stake_history::StakeHistoryEntry;

/// Share of the previous epoch's cluster-wide effective stake that may be
/// added or subtracted in one epoch.
pub const WARMUP_COOLDOWN_RATE: f64 = 0.09;

/// Which side of a delegation's lifecycle is being rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeTransition {
    /// Stake moving from activating to effective.
    Warmup,
    /// Stake moving from effective to inactive.
    Cooldown,
}

impl StakeTransition {
    /// The cluster-wide stake competing with this account for the epoch's allowance.
    pub fn cluster_portion(self, prev_epoch_cluster_state: &StakeHistoryEntry) -> u64 {
        match self {
            Self::Warmup => prev_epoch_cluster_state.activating,
            Self::Cooldown => prev_epoch_cluster_state.deactivating,
        }
    }

    /// Calculates how much of `account_portion` changes state in the epoch
    /// following `prev_epoch_cluster_state`.
    ///
    /// Returns `None` when the cluster recorded no stake in this transition,
    /// since there is no defined split of a zero cluster portion.
    pub fn allowance(
        self,
        account_portion: u64,
        prev_epoch_cluster_state: &StakeHistoryEntry,
    ) -> Option<u64> {
        rate_limited_stake_change(
            account_portion,
            self.cluster_portion(prev_epoch_cluster_state),
            prev_epoch_cluster_state.effective,
        )
    }
}

/// Calculates the rate-limited stake warmup for a single account in the current epoch.
///
/// This function allocates a share of the cluster's per-epoch activation allowance
/// proportional to the account's share of the previous epoch's total activating stake.
pub fn calculate_activation_allowance(
    account_activating_stake: u64,
    prev_epoch_cluster_state: &StakeHistoryEntry,
) -> Option<u64> {
    StakeTransition::Warmup.allowance(account_activating_stake, prev_epoch_cluster_state)
}

/// Calculates the rate-limited stake cooldown for a single account in the current epoch.
///
/// This function allocates a share of the cluster's per-epoch deactivation allowance
/// proportional to the account's share of the previous epoch's total deactivating stake.
pub fn calculate_deactivation_allowance(
    account_deactivating_stake: u64,
    prev_epoch_cluster_state: &StakeHistoryEntry,
) -> Option<u64> {
    StakeTransition::Cooldown.allowance(account_deactivating_stake, prev_epoch_cluster_state)
}

/// Internal helper for the rate-limited stake change calculation.
///
/// `change = round((account_portion / cluster_portion) * (cluster_effective * rate))`,
/// never less than 1 so that every epoch makes progress. The arithmetic is
/// `f64` throughout and rounds half away from zero, which is what the ledger's
/// own accounting does.
fn rate_limited_stake_change(
    account_portion: u64,
    cluster_portion: u64,
    cluster_effective: u64,
) -> Option<u64> {
    if cluster_portion == 0 {
        return None;
    }

    // how much of the cluster's movement this account is entitled to take
    let weight = account_portion as f64 / cluster_portion as f64;

    // total cluster stake allowed to move this epoch
    let newly_changed_cluster_stake = cluster_effective as f64 * WARMUP_COOLDOWN_RATE;

    // `as` saturates, so an absurd weight cannot wrap
    Some(((weight * newly_changed_cluster_stake).round() as u64).max(1))
}
