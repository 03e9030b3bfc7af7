//! Command implementations for cwpair.

pub mod bed_remap;
pub mod meme_split;
pub mod nbtest;
pub mod pair;

pub use bed_remap::{BedRemapCommand, BedRemapStats, RemappedRecord, SkipReason};
pub use meme_split::MemeSplitCommand;
pub use nbtest::{read_density_table, DensityRow, NbTestCommand, NbTestStats, TestedRow};
pub use pair::{MethodRun, PairCommand, PairSummary};
