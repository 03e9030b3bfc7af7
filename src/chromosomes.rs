//! Peaks grouped by chromosome, preserving first-appearance order.

use crate::peak::Peak;
use rustc_hash::FxHashMap;

/// Peaks keyed by chromosome name.
///
/// Chromosomes iterate in the order they first appear in the input and each
/// chromosome's peaks keep file order.
#[derive(Debug, Clone, Default)]
pub struct Chromosomes {
    /// Map of chromosome name to position in `entries`
    positions: FxHashMap<String, usize>,
    entries: Vec<(String, Vec<Peak>)>,
}

impl Chromosomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a peak to a chromosome, registering the chromosome if new.
    pub fn push(&mut self, chrom: &str, peak: Peak) {
        let idx = match self.positions.get(chrom) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.positions.insert(chrom.to_string(), idx);
                self.entries.push((chrom.to_string(), Vec::new()));
                idx
            }
        };
        self.entries[idx].1.push(peak);
    }

    /// Peaks for one chromosome.
    pub fn get(&self, chrom: &str) -> Option<&[Peak]> {
        self.positions
            .get(chrom)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Iterate `(name, peaks)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Peak])> {
        self.entries
            .iter()
            .map(|(name, peaks)| (name.as_str(), peaks.as_slice()))
    }

    /// Every peak of every chromosome.
    pub fn peaks(&self) -> impl Iterator<Item = &Peak> {
        self.entries.iter().flat_map(|(_, peaks)| peaks.iter())
    }

    /// Keep only peaks for which `keep` returns true. Chromosomes left empty
    /// stay registered.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Peak) -> bool,
    {
        for (_, peaks) in self.entries.iter_mut() {
            peaks.retain(|p| keep(p));
        }
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of peaks across chromosomes.
    pub fn peak_count(&self) -> usize {
        self.entries.iter().map(|(_, peaks)| peaks.len()).sum()
    }
}
