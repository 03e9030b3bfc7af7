//! Tabular report assembly: matched-pair summaries, details, orphans and run
//! statistics.
//!
//! Uses itoa for integer formatting and ryu for float formatting to avoid
//! allocating per field.

use crate::engine::{PairingOutcome, PeakPair};
use crate::error::Result;
use crate::peak::{Peak, Strand};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffer size for report writers.
const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// GFF source column of matched-pair rows.
pub const PAIR_SOURCE: &str = "cwpair";

pub const DETAILS_HEADER: [&str; 13] = [
    "chrom",
    "start",
    "end",
    "value",
    "strand",
    "chrom",
    "start",
    "end",
    "value",
    "strand",
    "midpoint",
    "c-w reads sum",
    "c-w distance (bp)",
];

pub const ORPHANS_HEADER: [&str; 5] = ["chrom", "strand", "start", "end", "value"];

pub const STATISTICS_HEADER: [&str; 6] = [
    "fname",
    "final_mode",
    "preview_mode",
    "perc95",
    "paired",
    "orphans",
];

/// Placeholder for undefined statistics.
pub const NOT_AVAILABLE: &str = "NA";

/// One tab-separated field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    /// A float, or `NA` when undefined
    OptFloat(Option<f64>),
}

/// Buffered tab-separated writer.
pub struct TsvWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }

    /// Write one row followed by a newline.
    pub fn write_row(&mut self, fields: &[Field<'_>]) -> Result<()> {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b"\t")?;
            }
            match *field {
                Field::Str(s) => self.writer.write_all(s.as_bytes())?,
                Field::Int(v) => self.writer.write_all(self.itoa_buf.format(v).as_bytes())?,
                Field::Float(v) => self.writer.write_all(self.ryu_buf.format(v).as_bytes())?,
                Field::OptFloat(Some(v)) => {
                    self.writer.write_all(self.ryu_buf.format(v).as_bytes())?
                }
                Field::OptFloat(None) => self.writer.write_all(NOT_AVAILABLE.as_bytes())?,
            }
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write a header row.
    pub fn write_header(&mut self, names: &[&str]) -> Result<()> {
        let fields: Vec<Field<'_>> = names.iter().map(|n| Field::Str(n)).collect();
        self.write_row(&fields)
    }

    /// Flush buffered output and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }
}

impl TsvWriter<File> {
    /// Create a plain-text writer at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    pub fn finish(self) -> Result<()> {
        self.into_inner()?.flush()?;
        Ok(())
    }
}

impl TsvWriter<GzEncoder<File>> {
    /// Create a gzip-compressed writer at `path`.
    pub fn create_gzip<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(GzEncoder::new(file, Compression::default())))
    }

    /// Flush and write the gzip trailer.
    pub fn finish_gzip(self) -> Result<()> {
        self.into_inner()?.finish()?;
        Ok(())
    }
}

/// Rewrite the numeric chromosome sentinels used by some peak callers:
/// `999 -> chrM`, `998 -> chrY`, `997 -> chrX`.
pub fn display_chrom(chrom: &str) -> &str {
    match chrom {
        "999" => "chrM",
        "998" => "chrY",
        "997" => "chrX",
        other => other,
    }
}

/// One matched-pair summary row in GFF layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Chromosome name after sentinel remapping
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub value: f64,
    pub distance: f64,
}

impl SummaryRow {
    pub fn new(chrom: &str, pair: &PeakPair) -> Self {
        Self {
            chrom: display_chrom(chrom).to_string(),
            start: pair.midpoint,
            end: pair.midpoint + 1,
            value: pair.value,
            distance: pair.distance,
        }
    }

    pub fn write<W: Write>(&self, out: &mut TsvWriter<W>) -> Result<()> {
        let mut ryu_buf = ryu::Buffer::new();
        let attrs = format!("cw_distance={}", ryu_buf.format(self.distance));
        out.write_row(&[
            Field::Str(&self.chrom),
            Field::Str(PAIR_SOURCE),
            Field::Str("."),
            Field::Int(self.start),
            Field::Int(self.end),
            Field::Float(self.value),
            Field::Str("."),
            Field::Str("."),
            Field::Str(&attrs),
        ])
    }
}

/// Summary rows of every pair, sorted by combined value descending. Equal
/// values keep chromosome and processing order.
pub fn summary_rows(outcome: &PairingOutcome) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = outcome
        .chromosomes
        .iter()
        .flat_map(|(chrom, pairing)| pairing.pairs.iter().map(move |p| SummaryRow::new(chrom, p)))
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));
    rows
}

/// Write one details row: both peaks, the pair midpoint, summed value and distance.
pub fn write_detail<W: Write>(out: &mut TsvWriter<W>, chrom: &str, pair: &PeakPair) -> Result<()> {
    out.write_row(&[
        Field::Str(chrom),
        Field::Int(pair.watson.start),
        Field::Int(pair.watson.end),
        Field::Float(pair.watson.value),
        Field::Str("+"),
        Field::Str(chrom),
        Field::Int(pair.crick.start),
        Field::Int(pair.crick.end),
        Field::Float(pair.crick.value),
        Field::Str("-"),
        Field::Int(pair.midpoint),
        Field::Float(pair.value),
        Field::Float(pair.distance),
    ])
}

pub fn write_orphan<W: Write>(out: &mut TsvWriter<W>, chrom: &str, peak: &Peak) -> Result<()> {
    let strand = match peak.strand {
        Strand::Plus => "+",
        Strand::Minus => "-",
        Strand::Unknown => ".",
    };
    out.write_row(&[
        Field::Str(chrom),
        Field::Str(strand),
        Field::Int(peak.start),
        Field::Int(peak.end),
        Field::Float(peak.value),
    ])
}

/// Statistics of one (input, method) run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    /// `"<method>: data <id>"`
    pub fname: String,
    pub final_mode: Option<f64>,
    /// Only defined for the `mode` method
    pub preview_mode: Option<f64>,
    /// 95th percentile of the unfiltered peak values
    pub perc95: Option<f64>,
    pub paired: u64,
    pub orphans: u64,
}

impl RunStatistics {
    pub fn write<W: Write>(&self, out: &mut TsvWriter<W>) -> Result<()> {
        out.write_row(&[
            Field::Str(&self.fname),
            Field::OptFloat(self.final_mode),
            Field::OptFloat(self.preview_mode),
            Field::OptFloat(self.perc95),
            Field::Int(self.paired as i64),
            Field::Int(self.orphans as i64),
        ])
    }
}

/// Write the run statistics table.
pub fn write_statistics<P: AsRef<Path>>(path: P, statistics: &[RunStatistics]) -> Result<()> {
    let mut out = TsvWriter::create(path)?;
    out.write_header(&STATISTICS_HEADER)?;
    for stats in statistics {
        stats.write(&mut out)?;
    }
    out.finish()
}
