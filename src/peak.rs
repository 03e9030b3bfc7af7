//! Core peak types for stranded peak calls.

use std::fmt;

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    /// Watson strand (`+`).
    Plus,
    /// Crick strand (`-`).
    Minus,
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    /// Parse a GFF strand column. Anything other than a single `+` or `-` is unknown.
    pub fn from_field(s: &str) -> Self {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Strand::Unknown,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// A called peak on one strand.
///
/// Coordinates are kept exactly as they appear in the GFF input. They are
/// signed so upstream distances stay negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub strand: Strand,
    pub start: i64,
    pub end: i64,
    pub value: f64,
}

impl Peak {
    #[inline]
    pub fn new(strand: Strand, start: i64, end: i64, value: f64) -> Self {
        Self {
            strand,
            start,
            end,
            value,
        }
    }

    /// Integer midpoint `(start + end) / 2`, rounded toward negative infinity.
    ///
    /// This is the search key of the window index.
    #[inline]
    pub fn midpoint(&self) -> i64 {
        (self.start as i128 + self.end as i128).div_euclid(2) as i64
    }

    /// Exact midpoint, used for pair distances.
    #[inline]
    pub fn center(&self) -> f64 {
        (self.start as f64 + self.end as f64) / 2.0
    }

    /// Signed distance from this peak's center to `other`'s center.
    #[inline]
    pub fn distance_to(&self, other: &Peak) -> f64 {
        other.center() - self.center()
    }

    #[inline]
    pub fn is_watson(&self) -> bool {
        self.strand == Strand::Plus
    }

    #[inline]
    pub fn is_crick(&self) -> bool {
        self.strand == Strand::Minus
    }
}

/// Split a chromosome's peaks into Watson and Crick lists, keeping file order.
/// Peaks without a `+`/`-` strand belong to neither list.
pub fn split_strands(peaks: &[Peak]) -> (Vec<Peak>, Vec<Peak>) {
    let watson = peaks.iter().filter(|p| p.is_watson()).copied().collect();
    let crick = peaks.iter().filter(|p| p.is_crick()).copied().collect();
    (watson, crick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_floors() {
        assert_eq!(Peak::new(Strand::Plus, 100, 110, 1.0).midpoint(), 105);
        assert_eq!(Peak::new(Strand::Plus, 100, 111, 1.0).midpoint(), 105);
        assert_eq!(Peak::new(Strand::Plus, -3, 0, 1.0).midpoint(), -2);
    }

    #[test]
    fn test_midpoint_near_coordinate_limit() {
        let peak = Peak::new(Strand::Plus, i64::MAX - 1, i64::MAX, 1.0);
        assert_eq!(peak.midpoint(), i64::MAX - 1);
        let peak = Peak::new(Strand::Minus, i64::MIN, i64::MIN + 1, 1.0);
        assert_eq!(peak.midpoint(), i64::MIN);
    }

    #[test]
    fn test_distance_uses_exact_centers() {
        let w = Peak::new(Strand::Plus, 100, 110, 10.0);
        let c = Peak::new(Strand::Minus, 150, 161, 8.0);
        assert_eq!(w.distance_to(&c), 50.5);
        assert_eq!(c.distance_to(&w), -50.5);
    }

    #[test]
    fn test_strand_from_field() {
        assert_eq!(Strand::from_field("+"), Strand::Plus);
        assert_eq!(Strand::from_field("-"), Strand::Minus);
        assert_eq!(Strand::from_field("."), Strand::Unknown);
        assert_eq!(Strand::from_field("+-"), Strand::Unknown);
        assert_eq!(Strand::from_field(""), Strand::Unknown);
    }

    #[test]
    fn test_split_strands() {
        let peaks = vec![
            Peak::new(Strand::Minus, 10, 20, 1.0),
            Peak::new(Strand::Plus, 30, 40, 2.0),
            Peak::new(Strand::Unknown, 50, 60, 3.0),
            Peak::new(Strand::Plus, 70, 80, 4.0),
        ];
        let (watson, crick) = split_strands(&peaks);
        assert_eq!(watson.len(), 2);
        assert_eq!(watson[0].start, 30);
        assert_eq!(watson[1].start, 70);
        assert_eq!(crick.len(), 1);
    }
}
