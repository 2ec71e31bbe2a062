//! Three-state local alignment matrix and suboptimal endpoint detection.
//!
//! Each cell keeps three running scores: an aligned pair, a gap in the
//! reference (the query advances alone, moving down) and a gap in the query
//! (the reference advances alone, moving right). Scores never drop below
//! zero at the cell level, so every alignment may restart anywhere.
//!
//! Instead of a single best cell, the builder reports every *peak*: a cell
//! whose aligned state cannot be improved, or matched, by any alignment that
//! extends through it. Peaks are the candidate endpoints from which
//! [`traceback`](crate::traceback) rebuilds alignments.
//!
//! ### Example
//! ```rust
//! use mirscan::{AlignmentMatrix, ScanParams, ScoreTable, ScoringScheme};
//! let params = ScanParams { scheme: ScoringScheme::Identity { match_score: 5, mismatch: -4 },
//!                           scale: 1.0, ..Default::default() };
//! let table = ScoreTable::build(b"ACGU", b"GGACGUGG", &params);
//! let matrix = AlignmentMatrix::build(&table, &params);
//! assert_eq!(matrix.candidates()[0].score, 20);
//! ```
use std::cmp::Reverse;
use std::ops::{Index, IndexMut};

use crate::params::ScanParams;
use crate::scoring::ScoreTable;

/// The three DP states of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Aligned,
    GapInReference,
    GapInQuery,
}

impl State {
    /// Tie preference when picking a cell's best state.
    pub const ALL: [State; 3] = [State::Aligned, State::GapInReference, State::GapInQuery];

    #[inline]
    fn idx(self) -> usize {
        match self {
            State::Aligned => 0,
            State::GapInReference => 1,
            State::GapInQuery => 2,
        }
    }
}

/// Where a state's score came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Trace {
    /// The alignment starts at this cell.
    #[default]
    Restart,
    /// From the given state of `(i-1, j-1)`.
    Diagonal(State),
    /// From the given state of `(i-1, j)`.
    Up(State),
    /// From the given state of `(i, j-1)`.
    Left(State),
}

/// One DP cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cell {
    scores: [i32; 3],
    traces: [Trace; 3],
    origin: [usize; 3],
}

impl Cell {
    #[inline]
    pub fn score(&self, s: State) -> i32 {
        self.scores[s.idx()]
    }

    #[inline]
    pub fn trace(&self, s: State) -> Trace {
        self.traces[s.idx()]
    }

    /// Best score across the three states and zero, with the state it came
    /// from (`None` when nothing beats zero).
    pub fn best(&self) -> (i32, Option<State>) {
        let mut out = (0, None);
        for s in State::ALL {
            if self.score(s) > out.0 {
                out = (self.score(s), Some(s));
            }
        }
        out
    }

    fn set(&mut self, s: State, score: i32, trace: Trace, origin: usize) {
        self.scores[s.idx()] = score;
        self.traces[s.idx()] = trace;
        self.origin[s.idx()] = origin;
    }
}

/// Owned row-major `(rows × cols)` grid.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, cells: vec![T::default(); rows * cols] }
    }
}

impl<T> Grid<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.cells[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.cells[i * self.cols + j]
    }
}

/// A local score peak from which an alignment can be traced back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateEndpoint {
    /// 1-based query position of the last aligned pair.
    pub query_end: usize,
    /// 1-based reference position of the last aligned pair.
    pub ref_end: usize,
    /// 1-based reference position where the alignment restarts.
    pub ref_start: usize,
    pub score: i32,
}

/// The filled DP matrix plus its ordered candidate endpoints.
#[derive(Clone, Debug)]
pub struct AlignmentMatrix {
    cells: Grid<Cell>,
    candidates: Vec<CandidateEndpoint>,
}

impl AlignmentMatrix {
    /// Fill the matrix for a score table and collect candidate endpoints.
    ///
    /// Candidates are ordered by descending score, then ascending reference
    /// start, reference end and query end. The grid is allocated in one
    /// piece; running out of memory aborts the process.
    pub fn build(table: &ScoreTable, params: &ScanParams) -> Self {
        let (rows, cols) = table.dims();
        let mut cells: Grid<Cell> = Grid::new(rows, cols);
        let (go, ge) = (params.gap_open, params.gap_extend);

        for i in 1..rows {
            for j in 1..cols {
                let mut cell = Cell::default();

                let diag = cells[(i - 1, j - 1)];
                let s = table.get(i, j);
                match diag.best() {
                    (b, Some(st)) if b + s > 0 => {
                        cell.set(State::Aligned, b + s, Trace::Diagonal(st), diag.origin[st.idx()])
                    }
                    _ => cell.set(State::Aligned, s.max(0), Trace::Restart, j),
                }

                let up = cells[(i - 1, j)];
                let (open, ext) = (up.score(State::Aligned) + go, up.score(State::GapInReference) + ge);
                if open >= ext {
                    cell.set(State::GapInReference, open, Trace::Up(State::Aligned), up.origin[0]);
                } else {
                    cell.set(State::GapInReference, ext, Trace::Up(State::GapInReference), up.origin[1]);
                }

                let left = cells[(i, j - 1)];
                let (open, ext) = (left.score(State::Aligned) + go, left.score(State::GapInQuery) + ge);
                if open >= ext {
                    cell.set(State::GapInQuery, open, Trace::Left(State::Aligned), left.origin[0]);
                } else {
                    cell.set(State::GapInQuery, ext, Trace::Left(State::GapInQuery), left.origin[2]);
                }

                cells[(i, j)] = cell;
            }
        }

        let candidates = find_peaks(&cells);
        log::trace!("matrix {}x{}: {} candidate endpoints", rows, cols, candidates.len());
        Self { cells, candidates }
    }

    pub fn cell(&self, i: usize, j: usize) -> &Cell {
        &self.cells[(i, j)]
    }

    /// Best score at `(i, j)` across all states and zero.
    pub fn best(&self, i: usize, j: usize) -> i32 {
        self.cells[(i, j)].best().0
    }

    pub fn candidates(&self) -> &[CandidateEndpoint] {
        &self.candidates
    }

    /// `(query length + 1, reference length + 1)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.cells.rows(), self.cells.cols())
    }
}

/// Predecessor node of a positive state, if it lies inside the grid.
fn predecessor(i: usize, j: usize, trace: Trace) -> Option<(usize, usize, State)> {
    let (pi, pj, ps) = match trace {
        Trace::Restart => return None,
        Trace::Diagonal(s) => (i - 1, j - 1, s),
        Trace::Up(s) => (i - 1, j, s),
        Trace::Left(s) => (i, j - 1, s),
    };
    (pi > 0 && pj > 0).then_some((pi, pj, ps))
}

/// Collect every aligned-state peak.
///
/// Traceback pointers of positive states form a forest whose edges always
/// point to an earlier cell in row-major order, so a single reverse sweep
/// gives every node the best score found among its forward extensions.
fn find_peaks(cells: &Grid<Cell>) -> Vec<CandidateEndpoint> {
    let (rows, cols) = (cells.rows(), cells.cols());
    let mut ahead: Grid<[i32; 3]> = Grid::new(rows, cols);

    for i in (1..rows).rev() {
        for j in (1..cols).rev() {
            let cell = &cells[(i, j)];
            for s in State::ALL {
                let score = cell.score(s);
                if score <= 0 {
                    continue;
                }
                let reach = score.max(ahead[(i, j)][s.idx()]);
                if let Some((pi, pj, ps)) = predecessor(i, j, cell.trace(s)) {
                    let slot = &mut ahead[(pi, pj)][ps.idx()];
                    *slot = (*slot).max(reach);
                }
            }
        }
    }

    let mut out = Vec::new();
    for i in 1..rows {
        for j in 1..cols {
            let cell = &cells[(i, j)];
            if let (score, Some(State::Aligned)) = cell.best() {
                if ahead[(i, j)][State::Aligned.idx()] < score {
                    out.push(CandidateEndpoint {
                        query_end: i,
                        ref_end: j,
                        ref_start: cell.origin[State::Aligned.idx()],
                        score,
                    });
                }
            }
        }
    }
    out.sort_by_key(|c| (Reverse(c.score), c.ref_start, c.ref_end, c.query_end));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringScheme;

    fn identity() -> ScanParams {
        ScanParams {
            scheme: ScoringScheme::Identity { match_score: 5, mismatch: -4 },
            gap_open: -8,
            gap_extend: -8,
            scale: 1.0,
            ..Default::default()
        }
    }

    fn build(q: &str, r: &str, p: &ScanParams) -> AlignmentMatrix {
        AlignmentMatrix::build(&ScoreTable::build(q.as_bytes(), r.as_bytes(), p), p)
    }

    #[test]
    fn empty_inputs_have_no_candidates() {
        let p = identity();
        assert!(build("", "ACGU", &p).candidates().is_empty());
        assert!(build("ACGU", "", &p).candidates().is_empty());
        assert!(build("", "", &p).candidates().is_empty());
    }

    #[test]
    fn recurrence_matches_hand_computation() {
        let p = identity();
        let m = build("AC", "AC", &p);
        assert_eq!(m.cell(1, 1).score(State::Aligned), 5);
        assert_eq!(m.cell(1, 1).trace(State::Aligned), Trace::Restart);
        assert_eq!(m.cell(2, 2).score(State::Aligned), 10);
        assert_eq!(m.cell(2, 2).trace(State::Aligned), Trace::Diagonal(State::Aligned));
        // gap after the first pair: 5 - 8 < 0, so best stays at zero
        assert_eq!(m.cell(2, 1).score(State::GapInReference), -3);
        assert_eq!(m.best(2, 1), 0);
        assert_eq!(m.cell(1, 2).trace(State::GapInQuery), Trace::Left(State::Aligned));
    }

    #[test]
    fn scores_never_negative_at_cell_level() {
        let p = identity();
        let m = build("ACGUAGGCU", "UUGACGAUCGA", &p);
        let (rows, cols) = m.dims();
        for i in 0..rows {
            for j in 0..cols {
                assert!(m.best(i, j) >= 0);
            }
        }
    }

    #[test]
    fn single_peak_for_exact_substring() {
        let p = identity();
        let m = build("ACGU", "GGACGUGG", &p);
        let top = m.candidates()[0];
        assert_eq!(top, CandidateEndpoint { query_end: 4, ref_end: 6, ref_start: 3, score: 20 });
        // no second candidate along the same diagonal
        assert!(m.candidates()[1..].iter().all(|c| c.ref_end != 5 || c.query_end != 3));
    }

    #[test]
    fn dominated_prefix_is_not_a_candidate() {
        // ACG matches, U mismatches, then AAA matches again: one path, one peak at the end.
        let p = identity();
        let m = build("ACGUAAA", "ACGCAAA", &p);
        let ends: Vec<_> = m.candidates().iter().filter(|c| c.ref_start == 1 && c.score > 5).map(|c| c.ref_end).collect();
        assert_eq!(ends, vec![7]);
        assert_eq!(m.candidates()[0].score, 5 * 6 - 4);
    }

    #[test]
    fn gapped_alignment_is_found() {
        let p = ScanParams { gap_open: -6, gap_extend: -2, ..identity() };
        let m = build("AAAAAGGGGG", "AAAAAUGGGGG", &p);
        let top = m.candidates()[0];
        assert_eq!(top.score, 50 - 6);
        assert_eq!((top.query_end, top.ref_end, top.ref_start), (10, 11, 1));
    }

    #[test]
    fn candidate_order_is_score_then_position() {
        let p = identity();
        let m = build("ACGU", "ACGUCCCCACGUUUUUACG", &p);
        let c = m.candidates();
        assert_eq!((c[0].score, c[0].ref_start), (20, 1));
        assert_eq!((c[1].score, c[1].ref_start), (20, 9));
        assert!(c.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
