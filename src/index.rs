//! Midpoint-keyed window index over one strand's peaks.

use crate::peak::Peak;

/// A sorted, consumable index of one strand's peaks.
///
/// Entries are ordered by integer midpoint (ties keep start order, then input
/// order), so `[lower, upper]` midpoint ranges resolve with two binary
/// searches. Matched entries are flagged as consumed rather than removed:
/// the key array never shifts and a consumed entry can never reappear in a
/// later window.
#[derive(Debug, Clone)]
pub struct WindowIndex {
    peaks: Vec<Peak>,
    /// Midpoint of `peaks[i]`, sorted ascending
    keys: Vec<i64>,
    consumed: Vec<bool>,
    active: usize,
}

/// A candidate returned by [`WindowIndex::window`]: the index slot and the peak.
pub type Candidate = (usize, Peak);

impl WindowIndex {
    /// Build an index from one strand's peaks.
    pub fn new(mut peaks: Vec<Peak>) -> Self {
        // Start order first so equal midpoints keep coordinate order.
        peaks.sort_by_key(|p| p.start);
        peaks.sort_by_key(|p| p.midpoint());
        let keys: Vec<i64> = peaks.iter().map(Peak::midpoint).collect();
        let n = peaks.len();
        Self {
            peaks,
            keys,
            consumed: vec![false; n],
            active: n,
        }
    }

    /// Slot range whose keys lie in `[lower, upper]`.
    #[inline]
    fn slot_range(&self, lower: i64, upper: i64) -> std::ops::Range<usize> {
        let first = self.keys.partition_point(|&k| k < lower);
        let last = self.keys.partition_point(|&k| k <= upper);
        first..last.max(first)
    }

    /// Active peaks whose midpoint lies within `up_distance` before and
    /// `down_distance` after the query peak's midpoint, bounds inclusive.
    pub fn window(&self, peak: &Peak, up_distance: i64, down_distance: i64) -> Vec<Candidate> {
        let midpoint = peak.midpoint();
        self.slot_range(
            midpoint.saturating_sub(up_distance),
            midpoint.saturating_add(down_distance),
        )
            .filter(|&slot| !self.consumed[slot])
            .map(|slot| (slot, self.peaks[slot]))
            .collect()
    }

    /// Mark a slot as matched. Returns false if it was already consumed.
    pub fn consume(&mut self, slot: usize) -> bool {
        match self.consumed.get_mut(slot) {
            Some(flag) if !*flag => {
                *flag = true;
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_consumed(&self, slot: usize) -> bool {
        self.consumed.get(slot).copied().unwrap_or(true)
    }

    /// Active peaks in index order.
    pub fn remaining(&self) -> impl Iterator<Item = &Peak> {
        self.peaks
            .iter()
            .zip(self.consumed.iter())
            .filter(|(_, &consumed)| !consumed)
            .map(|(peak, _)| peak)
    }

    /// Number of active entries.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Total number of entries, consumed or not.
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}
