//! Common helpers shared by the scanner: the crate error type and minimal
//! FASTA handling.
//!
//! ## FASTA
//! The parser is intentionally permissive and suitable for small/medium files
//! and tests. It supports multi-record inputs and keeps all non‑alphabetic
//! symbols as‑is (conversion to uppercase only).
//!
//! ## Examples
//! ```rust
//! use mirscan::parse_fasta;
//! let recs = parse_fasta(">let-7a\nUGAGGUAG\nUAGGUUGUAUAGUU\n>utr\nACGU\n");
//! assert_eq!(recs.len(), 2);
//! assert_eq!(recs[0].seq, "UGAGGUAGUAGGUUGUAUAGUU");
//! ```
//!
use std::fs;
use std::path::Path;

/// Errors that can be returned by the scanner.
#[derive(thiserror::Error, Debug)]
pub enum MirscanError {
    /// Returned when a [`ScanParams`](crate::ScanParams) value is unusable.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Returned when sequence input is empty or otherwise invalid.
    #[error("invalid sequence input: {0}")]
    InvalidSequence(String),
    /// I/O failure while reading sequences or writing a report.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Failure inside the tab-separated report writer.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// A simple in-memory FASTA record parsed by [`parse_fasta`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastaRecord {
    /// Identifier from the FASTA header (first word after '>').
    pub id: String,
    /// Sequence letters (uppercase). Non-nucleotide symbols are kept as-is.
    pub seq: String,
}

impl FastaRecord {
    pub fn new(id: impl Into<String>, seq: impl AsRef<str>) -> Self {
        Self { id: id.into(), seq: seq.as_ref().to_ascii_uppercase() }
    }

    /// Number of symbols in the sequence.
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// A copy with the symbols in reverse order, used to present a microRNA
    /// 3'→5' so that it pairs antiparallel with a 5'→3' target.
    pub fn reversed(&self) -> Self {
        Self { id: self.id.clone(), seq: self.seq.chars().rev().collect() }
    }
}

/// Parse a minimal FASTA string into a vector of [`FastaRecord`].
///
/// *Lines starting with `>` start a new record.* All other lines are appended
/// (without spaces) to the current sequence. Sequences are uppercased.
///
/// ## Panics
/// This function does not panic.
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    let mut out: Vec<FastaRecord> = vec![];
    let mut id: Option<String> = None;
    let mut seq = String::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix('>') {
            if let Some(prev) = id.take() {
                out.push(FastaRecord::new(prev, &seq));
                seq.clear();
            }
            id = Some(rest.split_whitespace().next().unwrap_or("").to_string());
        } else if id.is_some() {
            seq.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }
    if let Some(prev) = id {
        out.push(FastaRecord::new(prev, &seq));
    }
    out
}

/// Read every record from a FASTA file. A file without records is an error.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>, MirscanError> {
    let text = fs::read_to_string(path)?;
    let recs = parse_fasta(&text);
    if recs.is_empty() {
        return Err(MirscanError::InvalidSequence(format!("no FASTA records in {}", path.display())));
    }
    Ok(recs)
}
