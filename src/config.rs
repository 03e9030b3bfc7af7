//! Run configuration for the pairing pipeline.
//!
//! Everything that shapes a run is carried in explicit values built once from
//! the command line; nothing is read from global state.

use crate::engine::PairingEngine;
use crate::error::{CwpairError, Result};
use crate::plot::PlotStyle;
use crate::policy::MatchMethod;
use crate::threshold::Threshold;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default window upstream of a Watson peak's midpoint.
pub const DEFAULT_UP_DISTANCE: i64 = 50;
/// Default window downstream of a Watson peak's midpoint.
pub const DEFAULT_DOWN_DISTANCE: i64 = 100;
pub const DEFAULT_BINSIZE: i64 = 1;

/// Which outputs are written besides the matched pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSelection {
    MatchedPair,
    MatchedPairOrphan,
    MatchedPairOrphanDetail,
    /// Everything, including histogram plots
    All,
}

impl OutputSelection {
    pub fn details(&self) -> bool {
        matches!(
            self,
            OutputSelection::MatchedPairOrphanDetail | OutputSelection::All
        )
    }

    pub fn orphans(&self) -> bool {
        !matches!(self, OutputSelection::MatchedPair)
    }

    pub fn plots(&self) -> bool {
        matches!(self, OutputSelection::All)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSelection::MatchedPair => "matched_pair",
            OutputSelection::MatchedPairOrphan => "matched_pair_orphan",
            OutputSelection::MatchedPairOrphanDetail => "matched_pair_orphan_detail",
            OutputSelection::All => "all",
        }
    }
}

impl fmt::Display for OutputSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSelection {
    type Err = CwpairError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "matched_pair" => Ok(OutputSelection::MatchedPair),
            "matched_pair_orphan" => Ok(OutputSelection::MatchedPairOrphan),
            "matched_pair_orphan_detail" => Ok(OutputSelection::MatchedPairOrphanDetail),
            "all" => Ok(OutputSelection::All),
            other => Err(CwpairError::InvalidConfig(format!(
                "unknown output selection '{}'",
                other
            ))),
        }
    }
}

/// One input dataset and the identifier used in output names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDataset {
    pub path: PathBuf,
    pub id: String,
}

impl InputDataset {
    pub fn new(path: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: id.into(),
        }
    }
}

/// Settings for a `pair` run.
#[derive(Debug, Clone)]
pub struct PairConfig {
    pub method: MatchMethod,
    pub threshold: Threshold,
    pub up_distance: i64,
    pub down_distance: i64,
    pub binsize: i64,
    pub outputs: OutputSelection,
    /// Root directory of the per-kind output directories
    pub output_dir: PathBuf,
    pub plot_style: PlotStyle,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            method: MatchMethod::Mode,
            threshold: Threshold::None,
            up_distance: DEFAULT_UP_DISTANCE,
            down_distance: DEFAULT_DOWN_DISTANCE,
            binsize: DEFAULT_BINSIZE,
            outputs: OutputSelection::MatchedPair,
            output_dir: PathBuf::from("."),
            plot_style: PlotStyle::default(),
        }
    }
}

impl PairConfig {
    /// Validate the window settings and build the engine they describe.
    pub fn engine(&self) -> Result<PairingEngine> {
        PairingEngine::new(self.up_distance, self.down_distance, self.binsize)
    }

    /// Base output name: `<method>_<filter>u<up>d<down>_on_data_<id>`.
    pub fn output_name(&self, method: MatchMethod, id: &str) -> String {
        format!(
            "{}_{}u{}d{}_on_data_{}",
            method,
            self.threshold.file_tag(),
            self.up_distance,
            self.down_distance,
            id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_selection_flags() {
        let s: OutputSelection = "matched_pair".parse().unwrap();
        assert!(!s.orphans() && !s.details() && !s.plots());

        let s: OutputSelection = "matched_pair_orphan".parse().unwrap();
        assert!(s.orphans() && !s.details() && !s.plots());

        let s: OutputSelection = "matched_pair_orphan_detail".parse().unwrap();
        assert!(s.orphans() && s.details() && !s.plots());

        let s: OutputSelection = "all".parse().unwrap();
        assert!(s.orphans() && s.details() && s.plots());

        assert!("everything".parse::<OutputSelection>().is_err());
    }

    #[test]
    fn test_output_name() {
        let mut config = PairConfig::default();
        assert_eq!(
            config.output_name(MatchMethod::Mode, "3"),
            "mode_f0u50d100_on_data_3"
        );

        config.threshold = Threshold::Absolute(20.0);
        config.up_distance = 10;
        config.down_distance = 20;
        assert_eq!(
            config.output_name(MatchMethod::Largest, "x"),
            "largest_fa20u10d20_on_data_x"
        );
    }

    #[test]
    fn test_engine_validation() {
        let mut config = PairConfig::default();
        assert!(config.engine().is_ok());
        config.binsize = 0;
        assert!(config.engine().is_err());
    }
}
