//! Nucleotide pair scoring.
//!
//! The [`ScoringScheme`] enum describes either plain identity scoring or
//! base-pair complementarity (Watson–Crick plus G:U wobble), the latter being
//! what a microRNA/target duplex needs. [`ScoreTable::build`] turns a scheme
//! and a pair of sequences into the per-position lookup consumed by the DP.
//!
//! Symbols are compared case-insensitively and `T` is treated as `U`.
use crate::params::{QueryOrientation, ScanParams};

/// Substitution rule used to score one query symbol against one reference symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoringScheme {
    /// Equal nucleotides score `match_score`, anything else `mismatch`.
    Identity { match_score: i32, mismatch: i32 },
    /// A:U and G:C score `watson_crick`, G:U scores `wobble`, anything else `mismatch`.
    Complementary { watson_crick: i32, wobble: i32, mismatch: i32 },
}

impl Default for ScoringScheme {
    fn default() -> Self {
        ScoringScheme::Complementary { watson_crick: 5, wobble: 2, mismatch: -3 }
    }
}

/// How well two symbols pair, independent of the numeric scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairKind {
    /// Identical (identity scheme) or Watson–Crick (complementary scheme).
    Exact,
    /// G:U wobble under the complementary scheme.
    Partial,
    /// Anything else, including wildcards.
    Mismatch,
}

impl PairKind {
    /// Marker drawn between the two aligned rows.
    pub fn marker(self) -> char {
        match self {
            PairKind::Exact => '|',
            PairKind::Partial => ':',
            PairKind::Mismatch => ' ',
        }
    }
}

/// Map a symbol onto `A`, `C`, `G`, `U`, or `None` for anything else.
pub fn nucleotide(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' => Some(b'A'),
        b'C' => Some(b'C'),
        b'G' => Some(b'G'),
        b'T' | b'U' => Some(b'U'),
        _ => None,
    }
}

/// Watson–Crick or wobble pairing of two symbols, regardless of scheme.
pub fn base_pair(x: u8, y: u8) -> PairKind {
    match (nucleotide(x), nucleotide(y)) {
        (Some(a), Some(b)) => match (a, b) {
            (b'A', b'U') | (b'U', b'A') | (b'G', b'C') | (b'C', b'G') => PairKind::Exact,
            (b'G', b'U') | (b'U', b'G') => PairKind::Partial,
            _ => PairKind::Mismatch,
        },
        _ => PairKind::Mismatch,
    }
}

impl ScoringScheme {
    /// Classify a (query, reference) pair under this scheme.
    pub fn pair_kind(&self, q: u8, r: u8) -> PairKind {
        match self {
            ScoringScheme::Identity { .. } => match (nucleotide(q), nucleotide(r)) {
                (Some(a), Some(b)) if a == b => PairKind::Exact,
                _ => PairKind::Mismatch,
            },
            ScoringScheme::Complementary { .. } => base_pair(q, r),
        }
    }

    /// Unweighted score of a (query, reference) pair.
    pub fn score(&self, q: u8, r: u8, wildcard: i32) -> i32 {
        if nucleotide(q).is_none() || nucleotide(r).is_none() {
            return wildcard;
        }
        match (self, self.pair_kind(q, r)) {
            (ScoringScheme::Identity { match_score, .. }, PairKind::Exact) => *match_score,
            (ScoringScheme::Identity { mismatch, .. }, _) => *mismatch,
            (ScoringScheme::Complementary { watson_crick, .. }, PairKind::Exact) => *watson_crick,
            (ScoringScheme::Complementary { wobble, .. }, PairKind::Partial) => *wobble,
            (ScoringScheme::Complementary { mismatch, .. }, PairKind::Mismatch) => *mismatch,
        }
    }
}

/// Whether 1-based query position `i` (of `n`) lies in the weighted 5' region.
pub fn in_five_prime_region(i: usize, n: usize, params: &ScanParams) -> bool {
    match params.orientation {
        QueryOrientation::FivePrimeFirst => i <= params.five_prime_length,
        QueryOrientation::ThreePrimeFirst => i > n.saturating_sub(params.five_prime_length),
    }
}

/// Pair scores for every (query, reference) position, 1-based, with row 0
/// and column 0 held at zero.
#[derive(Clone, Debug)]
pub struct ScoreTable {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl ScoreTable {
    /// Score every (query, reference) combination, applying the 5' weighting.
    pub fn build(query: &[u8], reference: &[u8], params: &ScanParams) -> Self {
        let n = query.len();
        let m = reference.len();
        let cols = m + 1;
        let mut data = vec![0i32; (n + 1) * cols];
        for (i, &q) in query.iter().enumerate() {
            let weighted = in_five_prime_region(i + 1, n, params);
            let row = &mut data[(i + 1) * cols..(i + 2) * cols];
            for (j, &r) in reference.iter().enumerate() {
                let raw = params.scheme.score(q, r, params.wildcard_score);
                row[j + 1] = if weighted { (raw as f32 * params.scale).round() as i32 } else { raw };
            }
        }
        Self { rows: n + 1, cols, data }
    }

    /// Score at 1-based `(i, j)`; zero on the boundary.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.data[i * self.cols + j]
    }

    /// `(query length + 1, reference length + 1)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}
