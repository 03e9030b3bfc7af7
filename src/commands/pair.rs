//! Pair command implementation - per-input, per-method pairing runs.
//!
//! Outputs for each input × method combination land in fixed directories
//! under the configured output root:
//!
//! - `data_MP/` matched pairs (GFF, gzip)
//! - `data_D/` pair details (tabular, gzip)
//! - `data_O/` orphans (tabular, gzip)
//! - `H/` preview, final and comparison histograms (SVG)

use crate::chromosomes::Chromosomes;
use crate::config::{InputDataset, PairConfig};
use crate::engine::PairingEngine;
use crate::error::{CwpairError, Result};
use crate::freq::FrequencyDistribution;
use crate::gff::read_chromosomes;
use crate::plot::frequency_plot;
use crate::policy::{MatchMethod, MatchPolicy};
use crate::report::{
    summary_rows, write_detail, write_orphan, write_statistics, RunStatistics, TsvWriter,
    DETAILS_HEADER, ORPHANS_HEADER,
};
use crate::threshold::perc95;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const MATCHED_PAIRS: &str = "MP";
pub const DETAILS: &str = "D";
pub const ORPHANS: &str = "O";
pub const HISTOGRAM: &str = "H";
pub const PREVIEW_PLOT: &str = "P";
pub const FINAL_PLOT: &str = "F";
pub const COMPARISON_PLOT: &str = "C";

const GFF_EXT: &str = "gff.gz";
const TABULAR_EXT: &str = "tabular.gz";
const PLOT_EXT: &str = "svg";

/// Result of one method run over one input.
#[derive(Debug, Clone)]
pub struct MethodRun {
    pub method: MatchMethod,
    pub statistics: RunStatistics,
    pub distribution: FrequencyDistribution,
    /// Where a comparison plot for this input is written
    pub comparison_plot_path: PathBuf,
}

/// Aggregated result of a `pair` invocation.
#[derive(Debug, Clone, Default)]
pub struct PairSummary {
    pub statistics: Vec<RunStatistics>,
    /// Inputs that failed, with their error messages
    pub failures: Vec<(PathBuf, String)>,
}

impl PairSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Pair command configuration.
#[derive(Debug, Clone)]
pub struct PairCommand {
    config: PairConfig,
    engine: PairingEngine,
}

impl PairCommand {
    /// Validate the configuration.
    pub fn new(config: PairConfig) -> Result<Self> {
        let engine = config.engine()?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &PairConfig {
        &self.config
    }

    /// `<root>/data_<kind>/data_<kind>_<name>.<ext>`
    pub fn data_path(&self, kind: &str, name: &str, extension: &str) -> PathBuf {
        let dir = format!("data_{}", kind);
        self.config
            .output_dir
            .join(&dir)
            .join(format!("{}_{}.{}", dir, name, extension))
    }

    /// `<root>/H/histogram_<kind>_<name>.svg`
    pub fn histogram_path(&self, kind: &str, name: &str) -> PathBuf {
        self.config
            .output_dir
            .join(HISTOGRAM)
            .join(format!("histogram_{}_{}.{}", kind, name, PLOT_EXT))
    }

    /// Create the output directory tree.
    pub fn create_directories(&self) -> Result<()> {
        let root = &self.config.output_dir;
        fs::create_dir_all(root.join(HISTOGRAM))?;
        for kind in [DETAILS, ORPHANS, MATCHED_PAIRS] {
            fs::create_dir_all(root.join(format!("data_{}", kind)))?;
        }
        Ok(())
    }

    /// Run every input in order. A failing input is logged and recorded; the
    /// remaining inputs still run. Statistics are written when a path is given.
    pub fn run(
        &self,
        inputs: &[InputDataset],
        statistics_path: Option<&Path>,
    ) -> Result<PairSummary> {
        self.create_directories()?;

        let mut summary = PairSummary::default();
        for input in inputs {
            match self.process_file(input) {
                Ok(runs) => summary
                    .statistics
                    .extend(runs.into_iter().map(|run| run.statistics)),
                Err(e) => {
                    error!(path = %input.path.display(), "{}", e);
                    summary.failures.push((input.path.clone(), e.to_string()));
                }
            }
        }

        if let Some(path) = statistics_path {
            write_statistics(path, &summary.statistics)?;
        }
        Ok(summary)
    }

    /// Parse and filter one input, then run each configured method over it.
    pub fn process_file(&self, input: &InputDataset) -> Result<Vec<MethodRun>> {
        let mut chromosomes = read_chromosomes(&input.path)?;
        info!(
            path = %input.path.display(),
            chromosomes = chromosomes.len(),
            peaks = chromosomes.peak_count(),
            "read peaks"
        );

        let p95 = perc95(&chromosomes);
        if let Some(cutoff) = self.config.threshold.apply(&mut chromosomes) {
            debug!(
                cutoff,
                remaining = chromosomes.peak_count(),
                "applied threshold {}",
                self.config.threshold
            );
        }

        let mut runs = Vec::new();
        for method in self.config.method.expand() {
            runs.push(self.perform_process(&chromosomes, p95, input, method)?);
        }

        if self.config.outputs.plots() && self.config.method == MatchMethod::All {
            let series: Vec<(&str, &FrequencyDistribution)> = runs
                .iter()
                .map(|run| (run.method.as_str(), &run.distribution))
                .collect();
            if let Some(first) = runs.first() {
                frequency_plot(
                    &series,
                    &first.comparison_plot_path,
                    "",
                    &self.config.plot_style,
                )?;
            }
        }

        Ok(runs)
    }

    /// One method over already filtered peaks.
    fn perform_process(
        &self,
        chromosomes: &Chromosomes,
        p95: Option<f64>,
        input: &InputDataset,
        method: MatchMethod,
    ) -> Result<MethodRun> {
        let outputs = self.config.outputs;
        let name = self.config.output_name(method, &input.id);

        let (policy, preview_mode) = match method {
            MatchMethod::Mode => {
                let preview = self.engine.all_pair_distribution(chromosomes)?;
                let mode = preview.mode().ok();
                if outputs.plots() {
                    frequency_plot(
                        &[(method.as_str(), &preview)],
                        self.histogram_path(PREVIEW_PLOT, &name),
                        "Preview frequency plot",
                        &self.config.plot_style,
                    )?;
                }
                // An empty preview means no Watson peak has a candidate, so
                // the target distance is never consulted.
                (MatchPolicy::Mode(mode.unwrap_or(0.0)), mode)
            }
            MatchMethod::Closest => (MatchPolicy::Closest, None),
            MatchMethod::Largest => (MatchPolicy::Largest, None),
            MatchMethod::All => {
                return Err(CwpairError::InvalidConfig(
                    "method 'all' must be expanded before processing".to_string(),
                ))
            }
        };

        let outcome = self.engine.pair(chromosomes, policy)?;

        let mut matched = TsvWriter::create_gzip(self.data_path(MATCHED_PAIRS, &name, GFF_EXT))?;
        for row in summary_rows(&outcome) {
            row.write(&mut matched)?;
        }
        matched.finish_gzip()?;

        if outputs.details() {
            let mut details = TsvWriter::create_gzip(self.data_path(DETAILS, &name, TABULAR_EXT))?;
            details.write_header(&DETAILS_HEADER)?;
            for (chrom, pairing) in &outcome.chromosomes {
                for pair in &pairing.pairs {
                    write_detail(&mut details, chrom, pair)?;
                }
            }
            details.finish_gzip()?;
        }

        if outputs.orphans() {
            let mut orphans = TsvWriter::create_gzip(self.data_path(ORPHANS, &name, TABULAR_EXT))?;
            orphans.write_header(&ORPHANS_HEADER)?;
            for (chrom, pairing) in &outcome.chromosomes {
                for peak in &pairing.orphans {
                    write_orphan(&mut orphans, chrom, peak)?;
                }
            }
            orphans.finish_gzip()?;
        }

        if outputs.plots() {
            frequency_plot(
                &[(method.as_str(), &outcome.distribution)],
                self.histogram_path(FINAL_PLOT, &name),
                "Frequency distribution",
                &self.config.plot_style,
            )?;
        }

        let statistics = RunStatistics {
            fname: format!("{}: data {}", method, input.id),
            final_mode: outcome.final_mode(),
            preview_mode,
            perc95: p95,
            paired: outcome.paired(),
            orphans: outcome.orphan_count() as u64,
        };
        info!(
            method = %method,
            input = %input.id,
            paired = statistics.paired,
            orphans = statistics.orphans,
            "pairing complete"
        );

        Ok(MethodRun {
            method,
            statistics,
            distribution: outcome.distribution,
            comparison_plot_path: self.histogram_path(COMPARISON_PLOT, &name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputSelection;
    use crate::threshold::Threshold;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn gff(rows: &[(&str, i64, i64, f64, char)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (chrom, start, end, value, strand) in rows {
            writeln!(
                file,
                "{}\tcaller\tpeak\t{}\t{}\t{}\t{}\t.\t.",
                chrom, start, end, value, strand
            )
            .unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_paths() {
        let config = PairConfig {
            output_dir: PathBuf::from("/out"),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();
        assert_eq!(
            cmd.data_path(MATCHED_PAIRS, "mode_f0u50d100_on_data_1", GFF_EXT),
            PathBuf::from("/out/data_MP/data_MP_mode_f0u50d100_on_data_1.gff.gz")
        );
        assert_eq!(
            cmd.histogram_path(FINAL_PLOT, "x"),
            PathBuf::from("/out/H/histogram_F_x.svg")
        );
    }

    #[test]
    fn test_process_file_statistics() {
        let input = gff(&[
            ("chr1", 100, 110, 10.0, '+'),
            ("chr1", 150, 160, 8.0, '-'),
            ("chr1", 5000, 5010, 1.0, '+'),
        ]);
        let dir = tempdir().unwrap();
        let config = PairConfig {
            method: MatchMethod::All,
            up_distance: 100,
            down_distance: 100,
            output_dir: dir.path().to_path_buf(),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();
        cmd.create_directories().unwrap();

        let runs = cmd
            .process_file(&InputDataset::new(input.path(), "7"))
            .unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].statistics.fname, "mode: data 7");
        assert_eq!(runs[0].statistics.preview_mode, Some(50.5));
        assert_eq!(runs[1].statistics.preview_mode, None);
        for run in &runs {
            assert_eq!(run.statistics.paired, 2);
            assert_eq!(run.statistics.orphans, 1);
            assert_eq!(run.statistics.final_mode, Some(50.5));
            assert_eq!(run.statistics.perc95, Some(10.0));
        }
    }

    #[test]
    fn test_threshold_applies_before_pairing() {
        let input = gff(&[
            ("chr1", 100, 110, 10.0, '+'),
            ("chr1", 150, 160, 5.0, '-'),
        ]);
        let dir = tempdir().unwrap();
        let config = PairConfig {
            method: MatchMethod::Closest,
            threshold: Threshold::Absolute(5.0),
            outputs: OutputSelection::MatchedPairOrphan,
            output_dir: dir.path().to_path_buf(),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();
        cmd.create_directories().unwrap();

        let runs = cmd.process_file(&InputDataset::new(input.path(), "1")).unwrap();
        let stats = &runs[0].statistics;
        assert_eq!(stats.paired, 0);
        assert_eq!(stats.orphans, 1);
        assert_eq!(stats.final_mode, None);
        // Percentile is taken before filtering
        assert_eq!(stats.perc95, Some(10.0));
        assert!(dir
            .path()
            .join("data_O/data_O_closest_fa5u50d100_on_data_1.tabular.gz")
            .exists());
    }

    #[test]
    fn test_failed_input_does_not_stop_the_run() {
        let good = gff(&[("chr1", 100, 110, 10.0, '+')]);
        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "not\ta\tgff").unwrap();
        bad.flush().unwrap();

        let dir = tempdir().unwrap();
        let stats_path = dir.path().join("statistics.tabular");
        let config = PairConfig {
            method: MatchMethod::Largest,
            output_dir: dir.path().to_path_buf(),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();

        let summary = cmd
            .run(
                &[
                    InputDataset::new(bad.path(), "1"),
                    InputDataset::new(good.path(), "2"),
                ],
                Some(&stats_path),
            )
            .unwrap();

        assert!(summary.has_failures());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.statistics.len(), 1);
        let written = std::fs::read_to_string(&stats_path).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.contains("largest: data 2\tNA\tNA\t10.0\t0\t1"));
    }

    #[test]
    fn test_mode_without_candidates_makes_no_pairs() {
        // The Crick peak sits far outside every Watson window
        let input = gff(&[
            ("chr1", 100, 110, 10.0, '+'),
            ("chr1", 200, 210, 4.0, '+'),
            ("chr1", 9000, 9010, 8.0, '-'),
        ]);
        let dir = tempdir().unwrap();
        let stats_path = dir.path().join("statistics.tabular");
        let config = PairConfig {
            method: MatchMethod::Mode,
            outputs: OutputSelection::All,
            output_dir: dir.path().to_path_buf(),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();

        let summary = cmd
            .run(&[InputDataset::new(input.path(), "3")], Some(&stats_path))
            .unwrap();

        assert!(!summary.has_failures());
        let stats = &summary.statistics[0];
        assert_eq!(stats.preview_mode, None);
        assert_eq!(stats.final_mode, None);
        assert_eq!(stats.paired, 0);
        assert_eq!(stats.orphans, 3);

        let written = std::fs::read_to_string(&stats_path).unwrap();
        assert!(written.contains("mode: data 3\tNA\tNA\t10.0\t0\t3"));
    }

    #[test]
    fn test_unexpanded_all_is_rejected() {
        let dir = tempdir().unwrap();
        let config = PairConfig {
            output_dir: dir.path().to_path_buf(),
            ..PairConfig::default()
        };
        let cmd = PairCommand::new(config).unwrap();
        cmd.create_directories().unwrap();

        let err = cmd
            .perform_process(
                &Chromosomes::new(),
                None,
                &InputDataset::new("unused.gff", "1"),
                MatchMethod::All,
            )
            .unwrap_err();
        assert!(matches!(err, CwpairError::InvalidConfig(_)));
    }
}
