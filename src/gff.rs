//! Streaming GFF peak parser.
//!
//! Only the `chrom`, `start`, `end`, `value` and `strand` columns of the nine
//! GFF columns are consumed. Inputs may be gzip-compressed; compression is
//! detected from the leading magic bytes, not the file extension.

use crate::chromosomes::Chromosomes;
use crate::error::{CwpairError, Result};
use crate::peak::{Peak, Strand};
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Number of tab-separated columns in a GFF row.
pub const GFF_COLUMNS: usize = 9;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a file for reading, transparently decompressing gzip input.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    if is_gzip(&mut reader)? {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Peek at the first two bytes without consuming them.
fn is_gzip<R: BufRead>(reader: &mut R) -> Result<bool> {
    let buf = reader.fill_buf()?;
    Ok(buf.len() >= 2 && buf[..2] == GZIP_MAGIC)
}

/// A streaming GFF reader yielding `(chrom, Peak)` rows.
pub struct GffReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl GffReader<Box<dyn BufRead>> {
    /// Open a GFF file (plain or gzip) from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: Read> GffReader<R> {
    /// Create a new GFF reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    /// Read the next peak row.
    pub fn read_peak(&mut self) -> Result<Option<(String, Peak)>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\r', '\n']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    /// Parse a single GFF line.
    fn parse_line(&self, line: &str) -> Result<(String, Peak)> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != GFF_COLUMNS {
            return Err(CwpairError::Parse {
                line: self.line_number,
                message: format!(
                    "Expected {} fields, got {}: '{}'",
                    GFF_COLUMNS,
                    fields.len(),
                    line
                ),
            });
        }

        let start = self.parse_coordinate(fields[3], "start")?;
        let end = self.parse_coordinate(fields[4], "end")?;
        let value = fields[5]
            .trim()
            .parse::<f64>()
            .map_err(|_| CwpairError::Parse {
                line: self.line_number,
                message: format!("Invalid value: '{}'", fields[5]),
            })?;
        let strand = Strand::from_field(fields[6]);

        Ok((fields[0].to_string(), Peak::new(strand, start, end, value)))
    }

    fn parse_coordinate(&self, s: &str, field_name: &str) -> Result<i64> {
        s.trim().parse().map_err(|_| CwpairError::Parse {
            line: self.line_number,
            message: format!("Invalid {} position: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all rows.
    pub fn peaks(self) -> GffPeakIter<R> {
        GffPeakIter { reader: self }
    }

    /// Group every row by chromosome.
    pub fn into_chromosomes(self) -> Result<Chromosomes> {
        let mut chromosomes = Chromosomes::new();
        for row in self.peaks() {
            let (chrom, peak) = row?;
            chromosomes.push(&chrom, peak);
        }
        Ok(chromosomes)
    }
}

/// Iterator over GFF peak rows.
pub struct GffPeakIter<R: Read> {
    reader: GffReader<R>,
}

impl<R: Read> Iterator for GffPeakIter<R> {
    type Item = Result<(String, Peak)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_peak() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all peaks of a GFF file grouped by chromosome.
///
/// Any malformed row aborts the read; the error carries the file path.
pub fn read_chromosomes<P: AsRef<Path>>(path: P) -> Result<Chromosomes> {
    let path = path.as_ref();
    GffReader::from_path(path)
        .and_then(GffReader::into_chromosomes)
        .map_err(|e| e.with_path(path))
}

/// Parse peaks from a string (useful for testing).
pub fn parse_chromosomes(content: &str) -> Result<Chromosomes> {
    GffReader::new(content.as_bytes()).into_chromosomes()
}
