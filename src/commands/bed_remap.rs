//! Bed-remap command implementation - lift region-relative BED records into
//! genome coordinates.
//!
//! Records produced against extracted regions carry a `chrom:start-end` label
//! in their first column and offsets relative to that region. Offsets on the
//! `-` strand count back from the region end.

use crate::error::{CwpairError, Result};
use crate::gff::open_input;
use crate::peak::Strand;
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// A record lifted to genome coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedRecord {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

impl fmt::Display for RemappedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t.\t.\t{}",
            self.chrom, self.start, self.end, self.strand
        )
    }
}

/// Counts from a remap run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BedRemapStats {
    pub remapped: usize,
    pub skipped: usize,
}

impl fmt::Display for BedRemapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remapped={} skipped={}", self.remapped, self.skipped)
    }
}

/// Why a line was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownStrand(String),
    BadRegion(String),
    BadOffset(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownStrand(s) => write!(f, "Unexpected strand value: {}", s),
            SkipReason::BadRegion(s) => write!(f, "Could not parse chromosome info: {}", s),
            SkipReason::BadOffset(s) => write!(f, "Invalid offset: {}", s),
        }
    }
}

/// Bed-remap command configuration.
#[derive(Debug, Clone)]
pub struct BedRemapCommand {
    region: Regex,
}

impl BedRemapCommand {
    pub fn new() -> Result<Self> {
        let region = Regex::new(r"^([^:]+):(\d+)-(\d+)")
            .map_err(|e| CwpairError::InvalidConfig(e.to_string()))?;
        Ok(Self { region })
    }

    /// Remap one line. The strand is taken from the last column.
    pub fn remap_line(&self, line: &str) -> std::result::Result<RemappedRecord, SkipReason> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(SkipReason::BadOffset(line.to_string()));
        }
        let parse_offset = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| SkipReason::BadOffset(s.to_string()))
        };
        let start_offset = parse_offset(fields[1])?;
        let end_offset = parse_offset(fields[2])?;
        let strand_field = fields[fields.len() - 1].trim();

        let caps = self
            .region
            .captures(fields[0])
            .ok_or_else(|| SkipReason::BadRegion(fields[0].to_string()))?;
        let chrom = caps[1].to_string();
        let base_start: i64 = caps[2]
            .parse()
            .map_err(|_| SkipReason::BadRegion(fields[0].to_string()))?;
        let base_end: i64 = caps[3]
            .parse()
            .map_err(|_| SkipReason::BadRegion(fields[0].to_string()))?;

        let strand = Strand::from_field(strand_field);
        let (start, end) = match strand {
            Strand::Plus => (base_start + start_offset, base_start + end_offset),
            Strand::Minus => (base_end - end_offset, base_end - start_offset),
            Strand::Unknown => return Err(SkipReason::UnknownStrand(strand_field.to_string())),
        };

        Ok(RemappedRecord {
            chrom,
            start,
            end,
            strand,
        })
    }

    /// Remap every non-blank line from `input` into `output`.
    pub fn remap<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<BedRemapStats> {
        let mut stats = BedRemapStats::default();
        for (line_num, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            match self.remap_line(line) {
                Ok(record) => {
                    writeln!(output, "{}", record)?;
                    stats.remapped += 1;
                }
                Err(reason) => {
                    warn!("line {}: {}", line_num + 1, reason);
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Execute bed-remap on files.
    pub fn run<P: AsRef<Path>>(&self, input: P, output: P) -> Result<BedRemapStats> {
        let reader = open_input(input)?;
        let mut out = BufWriter::new(File::create(output)?);
        let stats = self.remap(reader, &mut out)?;
        out.flush()?;
        Ok(stats)
    }
}
