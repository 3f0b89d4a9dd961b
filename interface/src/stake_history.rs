//! Cluster-wide stake history.
//!
//! Each entry records how much stake across the whole cluster was effective,
//! warming up, and cooling down during one epoch. A delegation's own warmup
//! and cooldown is prorated against these figures.

pub use solana_clock::Epoch;
use std::ops::Deref;

/// The history keeps at most this many epochs. It should never take as many
/// as 512 epochs to warm up or cool down.
pub const MAX_ENTRIES: usize = 512;

#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Deserialize, serde_derive::Serialize)
)]
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct StakeHistoryEntry {
    pub effective: u64,    // effective stake at this epoch
    pub activating: u64,   // sum of portion of stakes not fully warmed up
    pub deactivating: u64, // requested to be cooled down, not fully deactivated yet
}

impl StakeHistoryEntry {
    pub fn with_effective(effective: u64) -> Self {
        Self {
            effective,
            ..Self::default()
        }
    }

    pub fn with_effective_and_activating(effective: u64, activating: u64) -> Self {
        Self {
            effective,
            activating,
            ..Self::default()
        }
    }

    pub fn with_deactivating(deactivating: u64) -> Self {
        Self {
            effective: deactivating,
            deactivating,
            ..Self::default()
        }
    }
}

impl std::ops::Add for StakeHistoryEntry {
    type Output = StakeHistoryEntry;
    fn add(self, rhs: StakeHistoryEntry) -> Self::Output {
        Self {
            effective: self.effective.saturating_add(rhs.effective),
            activating: self.activating.saturating_add(rhs.activating),
            deactivating: self.deactivating.saturating_add(rhs.deactivating),
        }
    }
}

/// Point lookup of the cluster stake recorded for one epoch.
///
/// `None` means the table has no bookkeeping for that epoch.
pub trait StakeHistoryGetEntry {
    fn get_entry(&self, epoch: Epoch) -> Option<StakeHistoryEntry>;
}

/// Stake history ordered newest epoch first.
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Deserialize, serde_derive::Serialize)
)]
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct StakeHistory(Vec<(Epoch, StakeHistoryEntry)>);

impl StakeHistory {
    pub fn get(&self, epoch: Epoch) -> Option<&StakeHistoryEntry> {
        self.binary_search_by(|probe| epoch.cmp(&probe.0))
            .ok()
            .map(|index| &self[index].1)
    }

    /// Inserts or replaces the entry for `epoch`, dropping the oldest epochs
    /// past [`MAX_ENTRIES`].
    pub fn add(&mut self, epoch: Epoch, entry: StakeHistoryEntry) {
        match self.binary_search_by(|probe| epoch.cmp(&probe.0)) {
            Ok(index) => (self.0)[index] = (epoch, entry),
            Err(index) => (self.0).insert(index, (epoch, entry)),
        }
        (self.0).truncate(MAX_ENTRIES);
    }
}

impl Deref for StakeHistory {
    type Target = Vec<(Epoch, StakeHistoryEntry)>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(Epoch, StakeHistoryEntry)> for StakeHistory {
    fn from_iter<I: IntoIterator<Item = (Epoch, StakeHistoryEntry)>>(iter: I) -> Self {
        let mut stake_history = StakeHistory::default();
        for (epoch, entry) in iter {
            stake_history.add(epoch, entry);
        }
        stake_history
    }
}

impl StakeHistoryGetEntry for StakeHistory {
    fn get_entry(&self, epoch: Epoch) -> Option<StakeHistoryEntry> {
        self.get(epoch).copied()
    }
}

// unsorted tables as fetched; first match wins
impl StakeHistoryGetEntry for [(Epoch, StakeHistoryEntry)] {
    fn get_entry(&self, epoch: Epoch) -> Option<StakeHistoryEntry> {
        self.iter()
            .find(|(entry_epoch, _)| *entry_epoch == epoch)
            .map(|(_, entry)| *entry)
    }
}

impl StakeHistoryGetEntry for Vec<(Epoch, StakeHistoryEntry)> {
    fn get_entry(&self, epoch: Epoch) -> Option<StakeHistoryEntry> {
        self.as_slice().get_entry(epoch)
    }
}
