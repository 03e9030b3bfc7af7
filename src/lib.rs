//! cwpair: Watson/Crick peak pairing
//!
//! Pairs forward-strand (Watson) peaks with reverse-strand (Crick) peaks on
//! the same chromosome, records the distance distribution of the pairs and
//! writes matched pairs, orphans and histograms.
//!
//! # Features
//!
//! - **Greedy pairing**: strongest Watson peaks claim their partners first
//! - **Three policies**: closest, largest, or nearest to the distance mode
//! - **Companion tools**: negative-binomial test, BED remapping, motif splitting
//!
//! # Example
//!
//! ```rust,no_run
//! use cwpair::{gff, engine::PairingEngine, policy::MatchPolicy};
//!
//! let chromosomes = gff::read_chromosomes("peaks.gff").unwrap();
//! let engine = PairingEngine::new(50, 100, 1).unwrap();
//!
//! let preview = engine.all_pair_distribution(&chromosomes).unwrap();
//! let mode = preview.mode().unwrap();
//! let outcome = engine.pair(&chromosomes, MatchPolicy::Mode(mode)).unwrap();
//! println!("{} pairs", outcome.pair_count());
//! ```

pub mod chromosomes;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod freq;
pub mod gff;
pub mod index;
pub mod peak;
pub mod plot;
pub mod policy;
pub mod report;
pub mod stats;
pub mod threshold;

// Re-export commonly used types
pub use chromosomes::Chromosomes;
pub use engine::{PairingEngine, PairingOutcome, PeakPair};
pub use error::{CwpairError, Result};
pub use freq::FrequencyDistribution;
pub use gff::{read_chromosomes, GffReader};
pub use peak::{Peak, Strand};
pub use policy::{MatchMethod, MatchPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::chromosomes::Chromosomes;
    pub use crate::commands::{BedRemapCommand, MemeSplitCommand, NbTestCommand, PairCommand};
    pub use crate::config::{InputDataset, OutputSelection, PairConfig};
    pub use crate::engine::{PairingEngine, PairingOutcome, PeakPair};
    pub use crate::error::{CwpairError, Result};
    pub use crate::peak::{Peak, Strand};
    pub use crate::policy::{MatchMethod, MatchPolicy};
    pub use crate::threshold::Threshold;
}
