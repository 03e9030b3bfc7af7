//! Nbtest command implementation - negative-binomial significance of paired
//! density tables with Benjamini-Hochberg correction.

use crate::error::Result;
use crate::gff::open_input;
use crate::stats::{benjamini_hochberg, negative_binomial_pvalue};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const DEFAULT_ALPHA: f64 = 0.05;

/// One `(key, density)` row. A density that is missing or not numeric is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityRow {
    pub key: String,
    pub density: Option<f64>,
}

/// Test result for one aligned row.
#[derive(Debug, Clone, PartialEq)]
pub struct TestedRow {
    pub key: String,
    pub p_value: f64,
    pub adjusted_p_value: f64,
}

/// Summary of an nbtest run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NbTestStats {
    pub rows_tested: usize,
    pub rows_dropped: usize,
    pub significant: usize,
}

impl fmt::Display for NbTestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tested={} dropped={} significant={}",
            self.rows_tested, self.rows_dropped, self.significant
        )
    }
}

/// Read a headerless tab-separated `(key, density)` table. Blank lines are skipped.
pub fn read_density_table<R: BufRead>(reader: R) -> Result<Vec<DensityRow>> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let key = fields.next().unwrap_or("").to_string();
        let density = fields
            .next()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan());
        rows.push(DensityRow { key, density });
    }
    Ok(rows)
}

/// Nbtest command configuration.
#[derive(Debug, Clone)]
pub struct NbTestCommand {
    /// Adjusted p-value below which a row is significant
    pub alpha: f64,
}

impl Default for NbTestCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl NbTestCommand {
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Align two tables by row position and test every row where both
    /// densities are present. Keys come from the first table.
    pub fn test(
        &self,
        control: &[DensityRow],
        treatment: &[DensityRow],
    ) -> (Vec<TestedRow>, NbTestStats) {
        let rows = control.len().max(treatment.len());
        let mut keys = Vec::new();
        let mut pvalues = Vec::new();
        for (a, b) in control.iter().zip(treatment.iter()) {
            if let (Some(x), Some(y)) = (a.density, b.density) {
                keys.push(a.key.clone());
                pvalues.push(negative_binomial_pvalue(&[x, y]));
            }
        }

        let adjusted = benjamini_hochberg(&pvalues);
        let tested: Vec<TestedRow> = keys
            .into_iter()
            .zip(pvalues)
            .zip(adjusted)
            .map(|((key, p_value), adjusted_p_value)| TestedRow {
                key,
                p_value,
                adjusted_p_value,
            })
            .collect();

        let stats = NbTestStats {
            rows_tested: tested.len(),
            rows_dropped: rows - tested.len(),
            significant: tested
                .iter()
                .filter(|r| r.adjusted_p_value < self.alpha)
                .count(),
        };
        (tested, stats)
    }

    /// Write results as CSV with a `Distance,p_value,adjusted_p_value` header.
    pub fn write_results<W: Write>(&self, rows: &[TestedRow], output: &mut W) -> Result<()> {
        let mut ryu_buf = ryu::Buffer::new();
        writeln!(output, "Distance,p_value,adjusted_p_value")?;
        for row in rows {
            output.write_all(row.key.as_bytes())?;
            output.write_all(b",")?;
            output.write_all(ryu_buf.format(row.p_value).as_bytes())?;
            output.write_all(b",")?;
            output.write_all(ryu_buf.format(row.adjusted_p_value).as_bytes())?;
            output.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Execute nbtest on files.
    pub fn run<P: AsRef<Path>>(&self, control: P, treatment: P, output: P) -> Result<NbTestStats> {
        let control = read_density_table(open_input(control)?)?;
        let treatment = read_density_table(open_input(treatment)?)?;
        let (rows, stats) = self.test(&control, &treatment);

        let mut out = BufWriter::new(File::create(output)?);
        self.write_results(&rows, &mut out)?;
        out.flush()?;

        info!("Number of significant peaks: {}", stats.significant);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> Vec<DensityRow> {
        read_density_table(content.as_bytes()).unwrap()
    }

    #[test]
    fn test_read_density_table() {
        let rows = table("100\t2.5\n\n110\tn/a\n120\n130\tNaN\n");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].density, Some(2.5));
        assert_eq!(rows[1].density, None);
        assert_eq!(rows[2].density, None);
        assert_eq!(rows[3].density, None);
    }

    #[test]
    fn test_rows_missing_on_either_side_are_dropped() {
        let control = table("a\t0\nb\tx\nc\t1\nd\t3\n");
        let treatment = table("a\t100\nb\t4\nc\t1\n");
        let (rows, stats) = NbTestCommand::new().test(&control, &treatment);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(stats.rows_tested, 2);
        assert_eq!(stats.rows_dropped, 2);
        // c is not overdispersed
        assert_eq!(rows[1].p_value, 0.0);
        assert!(rows[0].p_value > 0.9);
    }

    #[test]
    fn test_significance_counts_adjusted_values() {
        let control = table("a\t0\nb\t5\n");
        let treatment = table("a\t100\nb\t5\n");
        let (rows, stats) = NbTestCommand::new().with_alpha(0.05).test(&control, &treatment);
        // Non-overdispersed rows carry p = 0 and therefore count as significant
        assert_eq!(rows[1].adjusted_p_value, 0.0);
        assert_eq!(stats.significant, 1);
    }

    #[test]
    fn test_write_results() {
        let rows = vec![TestedRow {
            key: "100".to_string(),
            p_value: 0.5,
            adjusted_p_value: 1.0,
        }];
        let mut out = Vec::new();
        NbTestCommand::new().write_results(&rows, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Distance,p_value,adjusted_p_value\n100,0.5,1.0\n"
        );
    }
}
