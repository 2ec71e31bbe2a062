//! Duplex free-energy estimation.
//!
//! The scanner only needs a number per hit (more negative is more stable),
//! so the estimator sits behind [`EnergyEstimator`]. [`StackingEnergy`] is a
//! nearest-neighbour approximation over the aligned core: the reference row
//! is read as the 5'→3' strand, each pair of adjacent paired columns
//! contributes a stacking free energy, every helix pays an initiation cost
//! and every break between helices pays a loop penalty. It does not fold
//! the flanks or model dangling ends.
use crate::scoring::{base_pair, nucleotide, PairKind};
use crate::traceback::Hit;

/// Anything that can assign a free energy (kcal/mol) to a hit.
pub trait EnergyEstimator {
    fn energy(&self, hit: &Hit) -> f64;
}

impl<F: Fn(&Hit) -> f64> EnergyEstimator for F {
    fn energy(&self, hit: &Hit) -> f64 {
        self(hit)
    }
}

/// Watson–Crick stacking free energy keyed by the 5'→3' top-strand
/// dinucleotide (37 °C, kcal/mol).
pub fn watson_crick_stack(x: u8, y: u8) -> Option<f64> {
    let v = match (nucleotide(x)?, nucleotide(y)?) {
        (b'A', b'A') | (b'U', b'U') => -0.93,
        (b'A', b'U') => -1.10,
        (b'U', b'A') => -1.33,
        (b'C', b'U') | (b'A', b'G') => -2.08,
        (b'C', b'A') | (b'U', b'G') => -2.11,
        (b'G', b'U') | (b'A', b'C') => -2.24,
        (b'G', b'A') | (b'U', b'C') => -2.35,
        (b'C', b'G') => -2.36,
        (b'G', b'G') | (b'C', b'C') => -3.26,
        (b'G', b'C') => -3.42,
        _ => return None,
    };
    Some(v)
}

/// Stacking-only duplex energy model.
#[derive(Clone, Debug)]
pub struct StackingEnergy {
    /// Cost paid once per helix.
    pub helix_initiation: f64,
    /// Stack energy used when either pair is a G:U wobble.
    pub wobble_stack: f64,
    /// Cost of each unpaired stretch between two helices.
    pub loop_open: f64,
    /// Extra cost per unpaired column inside such a stretch.
    pub loop_per_column: f64,
}

impl Default for StackingEnergy {
    fn default() -> Self {
        Self { helix_initiation: 4.09, wobble_stack: -1.3, loop_open: 2.0, loop_per_column: 0.3 }
    }
}

impl StackingEnergy {
    fn stack(&self, top: (u8, u8), kinds: (PairKind, PairKind)) -> f64 {
        match kinds {
            (PairKind::Exact, PairKind::Exact) => watson_crick_stack(top.0, top.1).unwrap_or(self.wobble_stack),
            _ => self.wobble_stack,
        }
    }
}

impl EnergyEstimator for StackingEnergy {
    fn energy(&self, hit: &Hit) -> f64 {
        let cols: Vec<(u8, Option<PairKind>)> = hit
            .query_row
            .bytes()
            .zip(hit.ref_row.bytes())
            .map(|(q, r)| {
                let kind = match (q, r) {
                    (b'-', _) | (_, b'-') => None,
                    _ => Some(base_pair(q, r)).filter(|k| *k != PairKind::Mismatch),
                };
                (r, kind)
            })
            .collect();

        let mut total = 0.0;
        let mut prev: Option<(u8, PairKind)> = None;
        let mut unpaired_run = 0usize;
        let mut seen_helix = false;
        let mut helix_open = false;
        for (r, kind) in cols {
            match (prev, kind) {
                (Some((pr, pk)), Some(k)) => {
                    if !helix_open {
                        total += self.helix_initiation;
                        helix_open = true;
                        seen_helix = true;
                    }
                    total += self.stack((pr, r), (pk, k));
                }
                (None, Some(_)) if seen_helix && unpaired_run > 0 => {
                    total += self.loop_open + self.loop_per_column * unpaired_run as f64;
                }
                _ => {}
            }
            match kind {
                Some(k) => {
                    prev = Some((r, k));
                    unpaired_run = 0;
                }
                None => {
                    prev = None;
                    helix_open = false;
                    unpaired_run += 1;
                }
            }
        }
        total
    }
}
