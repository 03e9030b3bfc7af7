//! Partner selection policies for a Watson peak's candidate window.

use crate::error::CwpairError;
use crate::index::Candidate;
use crate::peak::Peak;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Offset added to negative distances by the `closest` policy.
///
/// Every downstream (non-negative) candidate outranks every upstream one, and
/// among upstream candidates the one nearest zero wins.
pub const UPSTREAM_PENALTY: f64 = 10000.0;

/// How a partner is chosen from a non-empty window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchPolicy {
    /// Smallest non-negative distance; upstream candidates only as a fallback.
    Closest,
    /// Highest value.
    Largest,
    /// Distance nearest the given mode of the all-pairs preview distribution.
    Mode(f64),
}

impl MatchPolicy {
    /// Pick one candidate from `window` for `peak`. Ties keep the first
    /// candidate in window order. Returns `None` for an empty window.
    pub fn select(&self, window: &[Candidate], peak: &Peak) -> Option<Candidate> {
        match *self {
            MatchPolicy::Closest => first_min_by_key(window, |c| closest_key(peak, c)),
            MatchPolicy::Largest => first_min_by_key(window, |c| -c.value),
            MatchPolicy::Mode(mode) => {
                first_min_by_key(window, |c| (peak.distance_to(c) - mode).abs())
            }
        }
    }

    pub fn method(&self) -> MatchMethod {
        match self {
            MatchPolicy::Closest => MatchMethod::Closest,
            MatchPolicy::Largest => MatchMethod::Largest,
            MatchPolicy::Mode(_) => MatchMethod::Mode,
        }
    }
}

#[inline]
fn closest_key(peak: &Peak, candidate: &Peak) -> f64 {
    let d = peak.distance_to(candidate);
    if d < 0.0 {
        UPSTREAM_PENALTY - d
    } else {
        d
    }
}

/// Candidate with the smallest key; the earliest one wins ties.
fn first_min_by_key<F>(window: &[Candidate], key: F) -> Option<Candidate>
where
    F: Fn(&Peak) -> f64,
{
    let mut best: Option<(f64, Candidate)> = None;
    for &candidate in window {
        let k = key(&candidate.1);
        match best {
            Some((best_key, _)) if k.partial_cmp(&best_key) != Some(Ordering::Less) => {}
            _ => best = Some((k, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// The pairing method requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    Mode,
    Closest,
    Largest,
    /// Run every method independently over the same input.
    All,
}

impl MatchMethod {
    /// Concrete methods to run, in run order.
    pub fn expand(self) -> Vec<MatchMethod> {
        match self {
            MatchMethod::All => vec![
                MatchMethod::Mode,
                MatchMethod::Closest,
                MatchMethod::Largest,
            ],
            method => vec![method],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Mode => "mode",
            MatchMethod::Closest => "closest",
            MatchMethod::Largest => "largest",
            MatchMethod::All => "all",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = CwpairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mode" => Ok(MatchMethod::Mode),
            "closest" => Ok(MatchMethod::Closest),
            "largest" => Ok(MatchMethod::Largest),
            "all" => Ok(MatchMethod::All),
            other => Err(CwpairError::InvalidConfig(format!(
                "unknown match method '{}' (expected mode, closest, largest or all)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peak::Strand;

    fn watson() -> Peak {
        // Center 1000
        Peak::new(Strand::Plus, 995, 1005, 10.0)
    }

    /// Crick candidate whose center sits `offset` from the Watson center.
    fn at(slot: usize, offset: i64, value: f64) -> Candidate {
        let center = 1000 + offset;
        (slot, Peak::new(Strand::Minus, center - 5, center + 5, value))
    }

    #[test]
    fn test_empty_window_selects_nothing() {
        for policy in [MatchPolicy::Closest, MatchPolicy::Largest, MatchPolicy::Mode(0.0)] {
            assert!(policy.select(&[], &watson()).is_none());
        }
    }

    #[test]
    fn test_closest_prefers_non_negative_offsets() {
        let window = vec![at(0, -5, 1.0), at(1, 3, 1.0), at(2, 50, 1.0)];
        let (slot, _) = MatchPolicy::Closest.select(&window, &watson()).unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_closest_picks_far_downstream_over_near_upstream() {
        let window = vec![at(0, -1, 1.0), at(1, 90, 1.0)];
        let (slot, _) = MatchPolicy::Closest.select(&window, &watson()).unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_closest_among_upstream_prefers_nearest_zero() {
        let window = vec![at(0, -40, 1.0), at(1, -7, 1.0), at(2, -20, 1.0)];
        let (slot, _) = MatchPolicy::Closest.select(&window, &watson()).unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_largest_keeps_first_maximum() {
        let window = vec![at(0, 10, 3.0), at(1, 20, 9.0), at(2, 30, 9.0)];
        let (slot, peak) = MatchPolicy::Largest.select(&window, &watson()).unwrap();
        assert_eq!(slot, 1);
        assert_eq!(peak.value, 9.0);
    }

    #[test]
    fn test_mode_nearest_to_target_distance() {
        let window = vec![at(0, 10, 1.0), at(1, 44, 1.0), at(2, 60, 1.0)];
        let (slot, _) = MatchPolicy::Mode(50.0).select(&window, &watson()).unwrap();
        assert_eq!(slot, 1);

        // Equal distance on both sides keeps the first
        let window = vec![at(0, 40, 1.0), at(1, 60, 1.0)];
        let (slot, _) = MatchPolicy::Mode(50.0).select(&window, &watson()).unwrap();
        assert_eq!(slot, 0);
    }

    #[test]
    fn test_method_parsing_and_expansion() {
        assert_eq!("closest".parse::<MatchMethod>().unwrap(), MatchMethod::Closest);
        assert!("nearest".parse::<MatchMethod>().is_err());
        assert_eq!(
            MatchMethod::All.expand(),
            vec![MatchMethod::Mode, MatchMethod::Closest, MatchMethod::Largest]
        );
        assert_eq!(MatchMethod::Largest.expand(), vec![MatchMethod::Largest]);
        assert_eq!(MatchPolicy::Mode(3.0).method().to_string(), "mode");
    }
}
