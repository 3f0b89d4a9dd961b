#![allow(clippy::arithmetic_side_effects)]

use {
    crate::{
        stake_history::{StakeHistoryEntry, StakeHistoryGetEntry},
        warmup_cooldown_allowance::StakeTransition,
    },
    log::debug,
    solana_clock::Epoch,
    solana_pubkey::Pubkey,
};

pub type StakeActivationStatus = StakeHistoryEntry;

/// Sentinel epoch meaning "never": never activated, or not deactivating.
pub const EPOCH_NEVER: Epoch = u64::MAX;

/// Coarse lifecycle of a delegation at some epoch, as shown to users.
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Deserialize, serde_derive::Serialize),
    serde(rename_all = "camelCase")
)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StakeActivationState {
    Inactive,
    Activating,
    Active,
    Deactivating,
}

impl From<&StakeActivationStatus> for StakeActivationState {
    fn from(status: &StakeActivationStatus) -> Self {
        if status.activating > 0 {
            Self::Activating
        } else if status.deactivating > 0 {
            Self::Deactivating
        } else if status.effective > 0 {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Deserialize, serde_derive::Serialize)
)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Delegation {
    /// to whom the stake is delegated
    pub voter_pubkey: Pubkey,
    /// delegated stake amount, set at delegate() time
    pub stake: u64,
    /// epoch at which this stake began warming up, `EPOCH_NEVER` if never activated
    pub activation_epoch: Epoch,
    /// epoch the stake was deactivated, `EPOCH_NEVER` if not deactivated
    pub deactivation_epoch: Epoch,
}

impl Default for Delegation {
    fn default() -> Self {
        Self {
            voter_pubkey: Pubkey::default(),
            stake: 0,
            activation_epoch: 0,
            deactivation_epoch: EPOCH_NEVER,
        }
    }
}

// Where a rate-limited walk ended up.
enum Walk {
    // ran to its stopping epoch with this balance
    Stopped(u64),
    // history ran out or was unusable; the transition completes at once
    Settled,
}

impl Delegation {
    pub fn new(voter_pubkey: &Pubkey, stake: u64, activation_epoch: Epoch) -> Self {
        Self {
            voter_pubkey: *voter_pubkey,
            stake,
            activation_epoch,
            ..Delegation::default()
        }
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivation_epoch != EPOCH_NEVER
    }

    /// Whether cooldown has begun by `current_epoch`, which is when the
    /// resolution may move on to claiming its stake.
    pub fn is_deactivation_reached(&self, current_epoch: Epoch) -> bool {
        self.is_deactivated() && current_epoch >= self.deactivation_epoch
    }

    pub fn stake<T: StakeHistoryGetEntry + ?Sized>(&self, epoch: Epoch, history: &T) -> u64 {
        self.stake_activating_and_deactivating(epoch, history).effective
    }

    #[allow(clippy::comparison_chain)]
    pub fn stake_activating_and_deactivating<T: StakeHistoryGetEntry + ?Sized>(
        &self,
        target_epoch: Epoch,
        history: &T,
    ) -> StakeActivationStatus {
        // first, calculate an effective and activating stake
        let (effective_stake, activating_stake) = self.stake_and_activating(target_epoch, history);

        // then de-activate some portion if necessary
        if target_epoch < self.deactivation_epoch {
            // not deactivated
            if activating_stake == 0 {
                StakeActivationStatus::with_effective(effective_stake)
            } else {
                StakeActivationStatus::with_effective_and_activating(
                    effective_stake,
                    activating_stake,
                )
            }
        } else if target_epoch == self.deactivation_epoch {
            // can only deactivate what's activated
            StakeActivationStatus::with_deactivating(effective_stake)
        } else {
            // target_epoch > self.deactivation_epoch
            match self.walk(
                StakeTransition::Cooldown,
                self.deactivation_epoch,
                effective_stake,
                target_epoch,
                history,
            ) {
                // deactivating stake should equal to all of currently remaining effective stake
                Walk::Stopped(current_effective_stake) => {
                    StakeActivationStatus::with_deactivating(current_effective_stake)
                }
                // no history or I've dropped out of history, so assume fully deactivated
                Walk::Settled => StakeActivationStatus::default(),
            }
        }
    }

    // returned tuple is (effective, activating) stake
    fn stake_and_activating<T: StakeHistoryGetEntry + ?Sized>(
        &self,
        target_epoch: Epoch,
        history: &T,
    ) -> (u64, u64) {
        let delegated_stake = self.stake;

        if self.activation_epoch == self.deactivation_epoch {
            // activated but instantly deactivated; no stake at all regardless of target_epoch
            (0, 0)
        } else if target_epoch == self.activation_epoch {
            // all is activating
            (0, delegated_stake)
        } else if target_epoch < self.activation_epoch {
            // not yet enabled
            (0, 0)
        } else {
            // target_epoch > self.activation_epoch
            let stop_epoch = target_epoch.min(self.deactivation_epoch);
            match self.walk(
                StakeTransition::Warmup,
                self.activation_epoch,
                0,
                stop_epoch,
                history,
            ) {
                Walk::Stopped(current_effective_stake) => (
                    current_effective_stake,
                    delegated_stake - current_effective_stake,
                ),
                // no history or I've dropped out of history, so assume fully effective
                Walk::Settled => (delegated_stake, 0),
            }
        }
    }

    /// Steps epoch by epoch from `start_epoch` until `stop_epoch`, moving
    /// `start_effective` toward the delegated stake (warmup) or toward zero
    /// (cooldown). Each step is rated by the cluster stake recorded for the
    /// epoch being left.
    fn walk<T: StakeHistoryGetEntry + ?Sized>(
        &self,
        transition: StakeTransition,
        start_epoch: Epoch,
        start_effective: u64,
        stop_epoch: Epoch,
        history: &T,
    ) -> Walk {
        let delegated_stake = self.stake;
        let mut prev_epoch = start_epoch;
        let mut current_effective_stake = start_effective;

        loop {
            let Some(prev_cluster_stake) = history.get_entry(prev_epoch) else {
                return Walk::Settled;
            };
            let current_epoch = prev_epoch + 1;

            let account_portion = match transition {
                StakeTransition::Warmup => delegated_stake - current_effective_stake,
                StakeTransition::Cooldown => current_effective_stake,
            };
            let Some(allowance) = transition.allowance(account_portion, &prev_cluster_stake)
            else {
                match transition {
                    // an entry that doesn't count my own activating stake is malformed
                    StakeTransition::Warmup => {
                        debug!("no cluster activating stake at epoch {prev_epoch}, settling");
                        return Walk::Settled;
                    }
                    // if there is no deactivating stake at prev epoch, we should have been
                    // fully undelegated at this moment
                    StakeTransition::Cooldown => break,
                }
            };

            match transition {
                StakeTransition::Warmup => {
                    current_effective_stake = current_effective_stake.saturating_add(allowance);
                    if current_effective_stake >= delegated_stake {
                        current_effective_stake = delegated_stake;
                        break;
                    }
                }
                StakeTransition::Cooldown => {
                    current_effective_stake = current_effective_stake.saturating_sub(allowance);
                    if current_effective_stake == 0 {
                        break;
                    }
                }
            }

            if current_epoch >= stop_epoch {
                break;
            }
            prev_epoch = current_epoch;
        }

        Walk::Stopped(current_effective_stake)
    }
}
