//! Greedy Watson/Crick pairing engine.
//!
//! For each chromosome the Watson peaks are visited by descending value and
//! each claims one partner from the still-unmatched Crick peaks inside its
//! window. Higher-value peaks therefore choose first; a later Watson peak may
//! lose its best candidate to an earlier one. The engine performs no I/O.

use crate::chromosomes::Chromosomes;
use crate::error::{CwpairError, Result};
use crate::freq::FrequencyDistribution;
use crate::index::WindowIndex;
use crate::peak::{split_strands, Peak};
use crate::policy::MatchPolicy;
use tracing::debug;

/// A matched Watson/Crick pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPair {
    pub watson: Peak,
    pub crick: Peak,
    /// `(w.start + w.end + c.start + c.end) / 4`, floored
    pub midpoint: i64,
    /// Sum of both peak values
    pub value: f64,
    /// Signed center-to-center distance from Watson to Crick
    pub distance: f64,
}

impl PeakPair {
    pub fn new(watson: Peak, crick: Peak) -> Self {
        Self {
            watson,
            crick,
            midpoint: ([watson.start, watson.end, crick.start, crick.end]
                .iter()
                .map(|&x| x as i128)
                .sum::<i128>()
                .div_euclid(4)) as i64,
            value: watson.value + crick.value,
            distance: watson.distance_to(&crick),
        }
    }
}

/// Result of pairing one chromosome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromosomePairing {
    /// Pairs in Watson processing order
    pub pairs: Vec<PeakPair>,
    /// Unmatched Watson peaks in processing order, then unmatched Crick peaks
    /// in index order (floored midpoint, then start)
    pub orphans: Vec<Peak>,
}

/// Result of pairing every chromosome of one input.
#[derive(Debug, Clone)]
pub struct PairingOutcome {
    pub chromosomes: Vec<(String, ChromosomePairing)>,
    pub distribution: FrequencyDistribution,
}

impl PairingOutcome {
    /// Number of paired peaks (two per pair).
    pub fn paired(&self) -> u64 {
        self.distribution.size() * 2
    }

    pub fn pair_count(&self) -> usize {
        self.chromosomes.iter().map(|(_, c)| c.pairs.len()).sum()
    }

    pub fn orphan_count(&self) -> usize {
        self.chromosomes.iter().map(|(_, c)| c.orphans.len()).sum()
    }

    /// Mode of the final distance distribution, if any pair was made.
    pub fn final_mode(&self) -> Option<f64> {
        self.distribution.mode().ok()
    }
}

/// Window geometry shared by the preview pass and the pairing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingEngine {
    up_distance: i64,
    down_distance: i64,
    binsize: i64,
}

impl PairingEngine {
    pub fn new(up_distance: i64, down_distance: i64, binsize: i64) -> Result<Self> {
        if up_distance < 0 || down_distance < 0 {
            return Err(CwpairError::InvalidConfig(format!(
                "distances must be non-negative (up {}, down {})",
                up_distance, down_distance
            )));
        }
        if binsize <= 0 {
            return Err(CwpairError::InvalidConfig(format!(
                "binsize must be positive, got {}",
                binsize
            )));
        }
        Ok(Self {
            up_distance,
            down_distance,
            binsize,
        })
    }

    pub fn up_distance(&self) -> i64 {
        self.up_distance
    }

    pub fn down_distance(&self) -> i64 {
        self.down_distance
    }

    /// An empty distribution spanning `[-up_distance, down_distance)`.
    pub fn distribution(&self) -> Result<FrequencyDistribution> {
        FrequencyDistribution::new(-self.up_distance, self.down_distance, self.binsize)
    }

    /// Distances of every Watson/Crick candidate pair inside the window, over
    /// all chromosomes, before any matching. Its mode drives the `mode` policy.
    pub fn all_pair_distribution(
        &self,
        chromosomes: &Chromosomes,
    ) -> Result<FrequencyDistribution> {
        let mut dist = self.distribution()?;
        for (_, peaks) in chromosomes.iter() {
            let (watson, crick) = split_strands(peaks);
            let index = WindowIndex::new(crick);
            for peak in &watson {
                for (_, candidate) in index.window(peak, self.up_distance, self.down_distance) {
                    dist.add(peak.distance_to(&candidate));
                }
            }
        }
        Ok(dist)
    }

    /// Pair one chromosome, recording every pair distance into `dist`.
    pub fn pair_chromosome(
        &self,
        peaks: &[Peak],
        policy: MatchPolicy,
        dist: &mut FrequencyDistribution,
    ) -> ChromosomePairing {
        let (mut watson, crick) = split_strands(peaks);
        // Stable: equal values keep file order
        watson.sort_by(|a, b| b.value.total_cmp(&a.value));
        let mut index = WindowIndex::new(crick);

        let mut result = ChromosomePairing::default();
        for peak in watson {
            let window = index.window(&peak, self.up_distance, self.down_distance);
            match policy.select(&window, &peak) {
                Some((slot, partner)) => {
                    index.consume(slot);
                    let pair = PeakPair::new(peak, partner);
                    dist.add(pair.distance);
                    result.pairs.push(pair);
                }
                None => result.orphans.push(peak),
            }
        }
        result.orphans.extend(index.remaining().copied());
        result
    }

    /// Pair every chromosome in input order.
    pub fn pair(&self, chromosomes: &Chromosomes, policy: MatchPolicy) -> Result<PairingOutcome> {
        let mut distribution = self.distribution()?;
        let mut results = Vec::with_capacity(chromosomes.len());
        for (name, peaks) in chromosomes.iter() {
            let pairing = self.pair_chromosome(peaks, policy, &mut distribution);
            debug!(
                chrom = name,
                pairs = pairing.pairs.len(),
                orphans = pairing.orphans.len(),
                "paired chromosome"
            );
            results.push((name.to_string(), pairing));
        }
        Ok(PairingOutcome {
            chromosomes: results,
            distribution,
        })
    }
}
