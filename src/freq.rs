//! Fixed-bin frequency distribution over signed pair distances.

use crate::error::{CwpairError, Result};
use std::collections::BTreeMap;

/// A histogram of values binned at `binsize` steps from `start`.
///
/// Values outside `[start, end)` still land in a bin of their own; the range
/// only bounds what [`graph_series`](Self::graph_series) reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyDistribution {
    start: i64,
    end: i64,
    binsize: i64,
    /// Bin index (offset from `start` in units of `binsize`) to count
    counts: BTreeMap<i64, u64>,
}

impl FrequencyDistribution {
    /// Create an empty distribution. `binsize` must be positive.
    pub fn new(start: i64, end: i64, binsize: i64) -> Result<Self> {
        if binsize <= 0 {
            return Err(CwpairError::InvalidConfig(format!(
                "binsize must be positive, got {}",
                binsize
            )));
        }
        Ok(Self {
            start,
            end,
            binsize,
            counts: BTreeMap::new(),
        })
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> i64 {
        self.end
    }

    #[inline]
    pub fn binsize(&self) -> i64 {
        self.binsize
    }

    #[inline]
    fn bin_index(&self, x: f64) -> i64 {
        ((x - self.start as f64) / self.binsize as f64).floor() as i64
    }

    #[inline]
    fn center_of(&self, index: i64) -> f64 {
        (self.start + index * self.binsize) as f64 + self.binsize as f64 / 2.0
    }

    /// Center of the bin `x` falls into.
    #[inline]
    pub fn bin_center(&self, x: f64) -> f64 {
        self.center_of(self.bin_index(x))
    }

    /// Count one observation.
    pub fn add(&mut self, x: f64) {
        let index = self.bin_index(x);
        *self.counts.entry(index).or_insert(0) += 1;
    }

    /// Count of the bin `x` falls into.
    pub fn count(&self, x: f64) -> u64 {
        self.counts.get(&self.bin_index(x)).copied().unwrap_or(0)
    }

    /// Total number of observations.
    pub fn size(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most frequent bin center.
    ///
    /// When several bins share the highest count, the median of their sorted
    /// centers is returned; for an even number of ties the lower middle wins.
    pub fn mode(&self) -> Result<f64> {
        let max_frequency = self
            .counts
            .values()
            .copied()
            .max()
            .ok_or(CwpairError::EmptyDistribution)?;
        // BTreeMap iterates bin indices ascending, so centers come out sorted.
        let modes: Vec<i64> = self
            .counts
            .iter()
            .filter(|(_, &count)| count == max_frequency)
            .map(|(&index, _)| index)
            .collect();
        Ok(self.center_of(modes[(modes.len() - 1) / 2]))
    }

    /// `(bin_center, count)` for every bin in `[start, end)`, empty bins included.
    pub fn graph_series(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        (self.start..self.end)
            .step_by(self.binsize as usize)
            .map(move |x| {
                let index = self.bin_index(x as f64);
                (
                    self.center_of(index),
                    self.counts.get(&index).copied().unwrap_or(0),
                )
            })
    }
}
