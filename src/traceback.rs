//! Alignment reconstruction from a candidate endpoint.
use std::ops::Range;

use crate::flank::Flanks;
use crate::matrix::{AlignmentMatrix, CandidateEndpoint, State, Trace};
use crate::scoring::ScoringScheme;

/// One reconstructed alignment between query and reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// Alignment score (weighted, as computed by the matrix).
    pub score: i32,
    /// Aligned query positions, 0-based, end exclusive.
    pub query_core: Range<usize>,
    /// Aligned reference positions, 0-based, end exclusive.
    pub ref_core: Range<usize>,
    /// Reference positions covered by the core plus its paired flanks.
    /// Equal to `ref_core` until flanks are attached.
    pub ref_span: Range<usize>,
    /// Query row of the aligned core, `-` for gaps.
    pub query_row: String,
    /// Marker row: `|` exact pair, `:` partial pair, space otherwise.
    pub marker_row: String,
    /// Reference row of the aligned core, `-` for gaps.
    pub ref_row: String,
    /// Unaligned context; empty until [`Flanks::attach`] runs.
    pub flanks: Flanks,
}

impl Hit {
    /// Number of alignment columns in the core.
    pub fn aligned_len(&self) -> usize {
        self.marker_row.len()
    }

    /// Percent of core columns that are exact pairs.
    pub fn pct_identity(&self) -> f64 {
        let exact = self.marker_row.chars().filter(|&c| c == '|').count();
        exact as f64 * 100.0 / self.aligned_len().max(1) as f64
    }

    /// Percent of core columns that are exact or partial pairs.
    pub fn pct_similarity(&self) -> f64 {
        let paired = self.marker_row.chars().filter(|&c| c != ' ').count();
        paired as f64 * 100.0 / self.aligned_len().max(1) as f64
    }

    /// Core columns where either row holds a gap.
    pub fn gap_count(&self) -> usize {
        self.query_row.chars().zip(self.ref_row.chars()).filter(|&(q, r)| q == '-' || r == '-').count()
    }

    pub(crate) fn uppercase_core(&mut self) {
        self.query_row.make_ascii_uppercase();
        self.ref_row.make_ascii_uppercase();
    }
}

/// Walk back from `end` until the restart node and rebuild the alignment.
pub fn traceback(
    matrix: &AlignmentMatrix,
    end: &CandidateEndpoint,
    query: &[u8],
    reference: &[u8],
    scheme: &ScoringScheme,
) -> Hit {
    let (mut i, mut j) = (end.query_end, end.ref_end);
    let mut state = State::Aligned;
    let mut q_aln: Vec<char> = Vec::new();
    let mut mid: Vec<char> = Vec::new();
    let mut r_aln: Vec<char> = Vec::new();

    loop {
        match state {
            State::Aligned => {
                let (q, r) = (query[i - 1], reference[j - 1]);
                q_aln.push(char::from(q));
                mid.push(scheme.pair_kind(q, r).marker());
                r_aln.push(char::from(r));
            }
            State::GapInReference => {
                q_aln.push(char::from(query[i - 1]));
                mid.push(' ');
                r_aln.push('-');
            }
            State::GapInQuery => {
                q_aln.push('-');
                mid.push(' ');
                r_aln.push(char::from(reference[j - 1]));
            }
        }
        match matrix.cell(i, j).trace(state) {
            Trace::Restart => break,
            Trace::Diagonal(s) => { i -= 1; j -= 1; state = s; }
            Trace::Up(s) => { i -= 1; state = s; }
            Trace::Left(s) => { j -= 1; state = s; }
        }
    }
    q_aln.reverse(); mid.reverse(); r_aln.reverse();

    let ref_core = (j - 1)..end.ref_end;
    Hit {
        score: end.score,
        query_core: (i - 1)..end.query_end,
        ref_span: ref_core.clone(),
        ref_core,
        query_row: q_aln.into_iter().collect(),
        marker_row: mid.into_iter().collect(),
        ref_row: r_aln.into_iter().collect(),
        flanks: Flanks::default(),
    }
}
