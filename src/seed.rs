//! Strict seed check over the 5' end of the query.
//!
//! The flank and core rows are joined into one query row and one marker row,
//! read from the query's 5' end. Query positions are counted over non-gap
//! symbols; inside the seed window every column must be an exact pair and
//! the query must not be gapped.
use crate::common::MirscanError;
use crate::params::QueryOrientation;
use crate::traceback::Hit;

/// Seed window (1-based query positions, inclusive) and the minimum number
/// of exact and of paired columns required inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedRule {
    pub first: usize,
    pub last: usize,
    pub min_matches: usize,
}

impl Default for SeedRule {
    fn default() -> Self {
        Self { first: 2, last: 8, min_matches: 7 }
    }
}

impl SeedRule {
    pub fn validate(&self) -> Result<(), MirscanError> {
        if self.first == 0 || self.first > self.last {
            return Err(MirscanError::InvalidParams(format!(
                "invalid seed window: {}..={}",
                self.first, self.last
            )));
        }
        Ok(())
    }
}

/// Column counts inside the seed window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedCounts {
    /// Columns with a non-blank marker.
    pub paired: usize,
    /// Columns with an exact-pair marker.
    pub exact: usize,
    /// Columns with a gap on the query side.
    pub gaps: usize,
}

impl SeedCounts {
    pub fn passes(&self, rule: &SeedRule) -> bool {
        self.exact >= rule.min_matches && self.paired >= rule.min_matches && self.gaps == 0
    }
}

/// Count the seed window columns of a hit with flanks attached.
pub fn seed_counts(hit: &Hit, orientation: QueryOrientation, rule: &SeedRule) -> SeedCounts {
    let query: Vec<char> = hit.full_query_row().chars().collect();
    let markers: Vec<char> = hit.full_marker_row().chars().collect();
    let mut columns: Vec<(char, char)> = query.into_iter().zip(markers).collect();
    if orientation == QueryOrientation::ThreePrimeFirst {
        columns.reverse();
    }

    let mut counts = SeedCounts::default();
    let mut pos = 0usize;
    for (q, m) in columns {
        if q != '-' {
            pos += 1;
        }
        if (rule.first..=rule.last).contains(&pos) {
            if m != ' ' {
                counts.paired += 1;
            }
            if m == '|' {
                counts.exact += 1;
            }
            if q == '-' {
                counts.gaps += 1;
            }
        }
        if pos == rule.last {
            break;
        }
    }
    counts
}

/// Apply the strict seed rule.
pub fn seed_passes(hit: &Hit, orientation: QueryOrientation, rule: &SeedRule) -> bool {
    seed_counts(hit, orientation, rule).passes(rule)
}
