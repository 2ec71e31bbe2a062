//! Scan configuration.
//!
//! A single [`ScanParams`] value carries every threshold and mode flag the
//! engine reads. It is built once (usually from the command line), checked
//! with [`ScanParams::validate`] and then passed by reference into each
//! component; nothing in the engine mutates it.
use crate::common::MirscanError;
use crate::scoring::ScoringScheme;
use crate::seed::SeedRule;

/// Energy substituted for every hit when energy evaluation is switched off.
/// Always far below any sensible threshold, so the energy gate passes.
pub const DISABLED_ENERGY: f64 = -1_000_000.0;

/// Which end of the query comes first in the supplied string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryOrientation {
    /// The query string reads 5'→3'.
    #[default]
    FivePrimeFirst,
    /// The query string reads 3'→5' (a reversed microRNA).
    ThreePrimeFirst,
}

/// Parameters for [`scan_pair`](crate::scan_pair).
#[derive(Clone, Debug)]
pub struct ScanParams {
    /// Substitution rule used to build the score table.
    pub scheme: ScoringScheme,
    /// Score for any pair involving a symbol outside `ACGTU`.
    pub wildcard_score: i32,
    /// Penalty for opening a gap (must be negative).
    pub gap_open: i32,
    /// Penalty for extending a gap (must be negative).
    pub gap_extend: i32,
    /// Multiplier applied to pair scores inside the query's 5' region.
    pub scale: f32,
    /// Length of the query's 5' region that receives `scale`.
    pub five_prime_length: usize,
    /// Minimum alignment score for a candidate to be traced at all.
    pub score_threshold: f64,
    /// Hits must have an energy strictly below this value.
    pub energy_threshold: f64,
    /// Require a clean seed match (see [`SeedRule`]).
    pub strict: bool,
    /// Evaluate energies; when false [`DISABLED_ENERGY`] is used instead.
    pub energy_enabled: bool,
    /// Seed window and acceptance minimum for strict mode.
    pub seed: SeedRule,
    /// Orientation of the query string.
    pub orientation: QueryOrientation,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            scheme: ScoringScheme::default(),
            wildcard_score: -1,
            gap_open: -9,
            gap_extend: -4,
            scale: 4.0,
            five_prime_length: 8,
            score_threshold: 140.0,
            energy_threshold: 1.0,
            strict: false,
            energy_enabled: true,
            seed: SeedRule::default(),
            orientation: QueryOrientation::default(),
        }
    }
}

impl ScanParams {
    /// Reject parameter combinations the engine cannot work with.
    pub fn validate(&self) -> Result<(), MirscanError> {
        if self.gap_open >= 0 || self.gap_extend >= 0 {
            return Err(MirscanError::InvalidParams(format!(
                "gap penalties must be negative (open={}, extend={})",
                self.gap_open, self.gap_extend
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(MirscanError::InvalidParams(format!("scale must be > 0 (scale={})", self.scale)));
        }
        if self.score_threshold.is_nan() || self.energy_threshold.is_nan() {
            return Err(MirscanError::InvalidParams("thresholds must be numbers".into()));
        }
        self.seed.validate()
    }

    /// The energy gate: strictly below the threshold.
    pub fn energy_passes(&self, energy: f64) -> bool {
        energy < self.energy_threshold
    }

    pub fn score_passes(&self, score: i32) -> bool {
        f64::from(score) >= self.score_threshold
    }
}
