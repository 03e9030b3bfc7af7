//! Meme-split command implementation - separate motif-scan GFF rows by their
//! `Alias=MEME-<n>` attribute.

use crate::error::Result;
use crate::gff::open_input;
use memchr::memmem;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ALIAS_PREFIX: &str = "Alias=MEME-";
pub const DEFAULT_MOTIFS: usize = 3;

/// Meme-split command configuration.
#[derive(Debug, Clone)]
pub struct MemeSplitCommand {
    /// Motifs `1..=motifs` get an output file
    pub motifs: usize,
}

impl Default for MemeSplitCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Motif number of a GFF line, from the first `;`-separated part that starts
/// with `Alias=MEME-`.
pub fn motif_number(line: &str) -> Option<usize> {
    if memmem::find(line.as_bytes(), ALIAS_PREFIX.as_bytes()).is_none() {
        return None;
    }
    line.split(';')
        .find_map(|part| part.strip_prefix(ALIAS_PREFIX))
        .and_then(|value| value.trim().parse().ok())
}

impl MemeSplitCommand {
    pub fn new() -> Self {
        Self {
            motifs: DEFAULT_MOTIFS,
        }
    }

    pub fn with_motifs(mut self, motifs: usize) -> Self {
        self.motifs = motifs;
        self
    }

    /// Group input lines (newline included) by motif number. Index `i` holds
    /// motif `i + 1`.
    pub fn split<R: BufRead>(&self, mut input: R) -> Result<Vec<Vec<String>>> {
        let mut groups = vec![Vec::new(); self.motifs];
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            if let Some(n) = motif_number(&line) {
                if (1..=self.motifs).contains(&n) {
                    groups[n - 1].push(line.clone());
                }
            }
        }
        Ok(groups)
    }

    /// `<output_dir>/meme_<n>_<stem>.gff`
    pub fn output_path(output_dir: &Path, motif: usize, stem: &str) -> PathBuf {
        output_dir.join(format!("meme_{}_{}.gff", motif, stem))
    }

    /// Execute meme-split, writing one file per motif (empty files included).
    pub fn run<P: AsRef<Path>>(&self, input: P, output_dir: P) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        let output_dir = output_dir.as_ref();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let groups = self.split(open_input(input)?)?;
        fs::create_dir_all(output_dir)?;

        let mut written = Vec::with_capacity(groups.len());
        for (i, lines) in groups.iter().enumerate() {
            let path = Self::output_path(output_dir, i + 1, &stem);
            let mut out = BufWriter::new(File::create(&path)?);
            for line in lines {
                out.write_all(line.as_bytes())?;
            }
            out.flush()?;
            info!(
                motif = i + 1,
                lines = lines.len(),
                path = %path.display(),
                "wrote motif rows"
            );
            written.push(path);
        }
        Ok(written)
    }
}
