//! Peak value pre-filtering.

use crate::chromosomes::Chromosomes;
use std::fmt;

/// A peak value cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// No filtering.
    None,
    /// Fraction of the 95th percentile value across all peaks.
    Relative(f64),
    /// Absolute value cutoff.
    Absolute(f64),
}

impl Threshold {
    /// Interpret a raw threshold value: `0` disables filtering, values below
    /// `1.0` are fractions of the 95th percentile and anything else is an
    /// absolute cutoff.
    pub fn from_value(value: f64) -> Self {
        if value == 0.0 {
            Threshold::None
        } else if value < 1.0 {
            Threshold::Relative(value)
        } else {
            Threshold::Absolute(value)
        }
    }

    /// Threshold from the command-line pair: an absolute threshold above zero
    /// wins, otherwise a relative threshold given in percent.
    pub fn from_options(absolute: f64, relative_percent: f64) -> Self {
        if absolute > 0.0 {
            Self::from_value(absolute)
        } else if relative_percent > 0.0 {
            Self::from_value(relative_percent / 100.0)
        } else {
            Threshold::None
        }
    }

    /// Raw value as given, `0` when disabled.
    pub fn value(&self) -> f64 {
        match *self {
            Threshold::None => 0.0,
            Threshold::Relative(v) | Threshold::Absolute(v) => v,
        }
    }

    /// Absolute cutoff for a peak set, or `None` when nothing is filtered.
    pub fn cutoff(&self, chromosomes: &Chromosomes) -> Option<f64> {
        match *self {
            Threshold::None => None,
            Threshold::Absolute(v) => Some(v),
            Threshold::Relative(fraction) => perc95(chromosomes).map(|p95| p95 * fraction),
        }
    }

    /// Drop every peak whose value is not strictly above the cutoff.
    /// Returns the cutoff applied.
    pub fn apply(&self, chromosomes: &mut Chromosomes) -> Option<f64> {
        let cutoff = self.cutoff(chromosomes)?;
        chromosomes.retain(|p| p.value > cutoff);
        Some(cutoff)
    }

    /// Short tag used in output file names: `fa<N>` for absolute cutoffs,
    /// `f<percent>` otherwise.
    pub fn file_tag(&self) -> String {
        match *self {
            Threshold::Absolute(v) => format!("fa{}", v.trunc() as i64),
            other => format!("f{}", (other.value() * 100.0).trunc() as i64),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::None => write!(f, "none"),
            Threshold::Relative(v) => write!(f, "{}% of 95th percentile", v * 100.0),
            Threshold::Absolute(v) => write!(f, "{}", v),
        }
    }
}

/// The 95th percentile peak value: the value at index `floor(n * 0.95)` of all
/// values sorted ascending. `None` for an empty peak set.
pub fn perc95(chromosomes: &Chromosomes) -> Option<f64> {
    let mut values: Vec<f64> = chromosomes.peaks().map(|p| p.value).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let index = (values.len() as f64 * 0.95) as usize;
    values.get(index.min(values.len() - 1)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peak::{Peak, Strand};

    fn chroms_with_values(values: &[f64]) -> Chromosomes {
        let mut chroms = Chromosomes::new();
        for (i, &v) in values.iter().enumerate() {
            let chrom = if i % 2 == 0 { "chr1" } else { "chr2" };
            chroms.push(chrom, Peak::new(Strand::Plus, i as i64, i as i64 + 1, v));
        }
        chroms
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Threshold::from_value(0.0), Threshold::None);
        assert_eq!(Threshold::from_value(0.5), Threshold::Relative(0.5));
        assert_eq!(Threshold::from_value(1.0), Threshold::Absolute(1.0));
        assert_eq!(Threshold::from_value(20.0), Threshold::Absolute(20.0));
    }

    #[test]
    fn test_absolute_takes_precedence() {
        assert_eq!(Threshold::from_options(5.0, 50.0), Threshold::Absolute(5.0));
        assert_eq!(Threshold::from_options(0.0, 50.0), Threshold::Relative(0.5));
        assert_eq!(Threshold::from_options(0.0, 0.0), Threshold::None);
    }

    #[test]
    fn test_perc95() {
        let values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        // floor(20 * 0.95) = 19 -> the largest value
        assert_eq!(perc95(&chroms_with_values(&values)), Some(20.0));

        let values: Vec<f64> = (1..=100).rev().map(|v| v as f64).collect();
        assert_eq!(perc95(&chroms_with_values(&values)), Some(96.0));

        assert_eq!(perc95(&Chromosomes::new()), None);
    }

    #[test]
    fn test_relative_filter_is_strict() {
        // 95th percentile of 1..=100 is 96; half of it is 48
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let mut chroms = chroms_with_values(&values);
        let cutoff = Threshold::Relative(0.5).apply(&mut chroms);

        assert_eq!(cutoff, Some(48.0));
        assert!(chroms.peaks().all(|p| p.value > 48.0));
        assert_eq!(chroms.peak_count(), 52);
    }

    #[test]
    fn test_peak_at_cutoff_is_excluded() {
        let mut values = vec![50.0];
        values.extend(std::iter::repeat(100.0).take(19));
        let mut chroms = chroms_with_values(&values);
        assert_eq!(perc95(&chroms), Some(100.0));

        Threshold::Relative(0.5).apply(&mut chroms);
        assert_eq!(chroms.peak_count(), 19);
    }

    #[test]
    fn test_no_threshold_keeps_everything() {
        let mut chroms = chroms_with_values(&[0.0, 1.0, 2.0]);
        assert_eq!(Threshold::None.apply(&mut chroms), None);
        assert_eq!(chroms.peak_count(), 3);
    }

    #[test]
    fn test_file_tag() {
        assert_eq!(Threshold::Absolute(20.7).file_tag(), "fa20");
        assert_eq!(Threshold::Relative(0.25).file_tag(), "f25");
        assert_eq!(Threshold::None.file_tag(), "f0");
    }
}
