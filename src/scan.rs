//! Per-pair scanning: candidate extraction, filtering and aggregation.
//!
//! [`scan_pair`] runs the whole pipeline for one query/reference pair:
//!
//! 1. score table and DP matrix ([`ScoreTable`], [`AlignmentMatrix`]);
//! 2. for each candidate endpoint, best first, while the score threshold
//!    holds: traceback, flanks, a claim on the reference footprint (the
//!    first candidate to touch a stretch keeps it), strict seed check (if
//!    enabled), energy (or [`DISABLED_ENERGY`]);
//! 3. [`HitAggregator`] accepts hits whose energy is below the threshold,
//!    updates the [`HitSummary`] and the reporter sees each accepted hit;
//! 4. the summary is reported when its scan score is positive.
//!
//! ### Example
//! ```rust
//! use mirscan::{scan_pair, FastaRecord, HitCollector, ScanParams, StackingEnergy};
//! let mirna = FastaRecord::new("mir", "UGAGGUAG");
//! let utr = FastaRecord::new("utr", "GGGGACUCCAUCGGGG");
//! let params = ScanParams { energy_enabled: false, ..Default::default() };
//! let mut out = HitCollector::default();
//! let summary = scan_pair(&mirna, &utr, &params, &StackingEnergy::default(), &mut out).unwrap();
//! assert_eq!(summary.hits, 1);
//! assert_eq!(summary.positions, vec![5]);
//! ```
use std::fmt;

use log::{debug, info};

use crate::common::{FastaRecord, MirscanError};
use crate::energy::EnergyEstimator;
use crate::flank::Flanks;
use crate::matrix::AlignmentMatrix;
use crate::overlap::OverlapFilter;
use crate::params::{ScanParams, DISABLED_ENERGY};
use crate::report::Reporter;
use crate::scoring::ScoreTable;
use crate::seed::seed_passes;
use crate::traceback::{traceback, Hit};

/// Totals for one query/reference pair.
#[derive(Clone, Debug, PartialEq)]
pub struct HitSummary {
    /// Number of accepted hits.
    pub hits: usize,
    /// Sum of negated energies of accepted hits.
    pub scan_score: f64,
    /// Sum of accepted hit scores.
    pub total_score: f64,
    /// Highest accepted hit score.
    pub max_score: f64,
    /// Most favourable (lowest) accepted energy; zero until one is below it.
    pub min_energy: f64,
    /// 1-based reference start of each accepted hit, in acceptance order.
    pub positions: Vec<usize>,
    /// Whether energies came from an estimator rather than the sentinel.
    pub energy_evaluated: bool,
}

impl HitSummary {
    pub fn new(energy_evaluated: bool) -> Self {
        Self {
            hits: 0,
            scan_score: 0.0,
            total_score: 0.0,
            max_score: 0.0,
            min_energy: 0.0,
            positions: Vec::new(),
            energy_evaluated,
        }
    }
}

/// Outcome of offering a hit to the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    BelowScore,
    Overlap,
    Seed,
    Energy,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Accepted => "accepted",
            Verdict::BelowScore => "score below threshold",
            Verdict::Overlap => "overlaps a claimed footprint",
            Verdict::Seed => "seed check failed",
            Verdict::Energy => "energy above threshold",
        };
        f.write_str(s)
    }
}

/// Applies the acceptance gates and accumulates the pair's summary.
#[derive(Debug)]
pub struct HitAggregator<'p> {
    params: &'p ScanParams,
    overlap: OverlapFilter,
    summary: HitSummary,
}

impl<'p> HitAggregator<'p> {
    pub fn new(params: &'p ScanParams) -> Self {
        Self { params, overlap: OverlapFilter::new(), summary: HitSummary::new(params.energy_enabled) }
    }

    /// Claim the reference footprint of `hit`. Returns false when an earlier
    /// candidate already holds part of it. A claimed footprint stays taken
    /// even if the hit later fails the seed or energy gate.
    pub fn claim(&mut self, hit: &Hit) -> bool {
        self.overlap.try_claim(hit.ref_span.clone())
    }

    /// Gate a claimed `hit` and, when every gate passes, fold it into the summary.
    pub fn offer(&mut self, hit: &Hit, seed_ok: bool, energy: f64) -> Verdict {
        if !self.params.score_passes(hit.score) {
            return Verdict::BelowScore;
        }
        if self.params.strict && !seed_ok {
            return Verdict::Seed;
        }
        if !self.params.energy_passes(energy) {
            return Verdict::Energy;
        }

        let s = &mut self.summary;
        s.hits += 1;
        s.scan_score += -energy;
        s.total_score += f64::from(hit.score);
        s.max_score = s.max_score.max(f64::from(hit.score));
        if energy < s.min_energy {
            s.min_energy = energy;
        }
        s.positions.push(hit.ref_span.start + 1);
        Verdict::Accepted
    }

    pub fn summary(&self) -> &HitSummary {
        &self.summary
    }

    pub fn finish(self) -> HitSummary {
        self.summary
    }
}

/// Scan one query against one reference, reporting accepted hits.
///
/// Empty sequences produce an empty summary. Errors come only from
/// parameter validation and from the reporter.
pub fn scan_pair(
    query: &FastaRecord,
    reference: &FastaRecord,
    params: &ScanParams,
    estimator: &dyn EnergyEstimator,
    reporter: &mut dyn Reporter,
) -> Result<HitSummary, MirscanError> {
    params.validate()?;
    let (q, r) = (query.seq.as_bytes(), reference.seq.as_bytes());
    let table = ScoreTable::build(q, r, params);
    let matrix = AlignmentMatrix::build(&table, params);
    let mut agg = HitAggregator::new(params);

    for end in matrix.candidates().iter().take_while(|c| params.score_passes(c.score)) {
        let mut hit = traceback(&matrix, end, q, r, &params.scheme);
        Flanks::attach(&mut hit, q, r);

        if !agg.claim(&hit) {
            debug!("{} vs {}: R:{}..{} score {}: {}", query.id, reference.id,
                hit.ref_span.start + 1, hit.ref_span.end, hit.score, Verdict::Overlap);
            continue;
        }
        let seed_ok = !params.strict || seed_passes(&hit, params.orientation, &params.seed);
        let energy = if params.energy_enabled && seed_ok { estimator.energy(&hit) } else { DISABLED_ENERGY };

        match agg.offer(&hit, seed_ok, energy) {
            Verdict::Accepted => reporter.report_hit(query, reference, &hit, energy)?,
            verdict => debug!("{} vs {}: R:{}..{} score {}: {}", query.id, reference.id,
                hit.ref_span.start + 1, hit.ref_span.end, hit.score, verdict),
        }
    }

    let summary = agg.finish();
    if summary.scan_score > 0.0 {
        reporter.report_summary(query, reference, &summary)?;
    }
    Ok(summary)
}

/// Scan every query against every reference in input order and flush the
/// reporter. Returns one summary per pair.
pub fn scan_records(
    queries: &[FastaRecord],
    references: &[FastaRecord],
    params: &ScanParams,
    estimator: &dyn EnergyEstimator,
    reporter: &mut dyn Reporter,
) -> Result<Vec<HitSummary>, MirscanError> {
    let mut out = Vec::with_capacity(queries.len() * references.len());
    for q in queries {
        for r in references {
            let summary = scan_pair(q, r, params, estimator, reporter)?;
            info!("{} vs {}: {} hit(s), total score {:.2}", q.id, r.id, summary.hits, summary.total_score);
            out.push(summary);
        }
    }
    reporter.finish()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::StackingEnergy;
    use crate::params::QueryOrientation;
    use crate::report::HitCollector;
    use crate::scoring::ScoringScheme;
    use crate::seed::seed_counts;
    use std::ops::Range;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn identity(threshold: f64) -> ScanParams {
        ScanParams {
            scheme: ScoringScheme::Identity { match_score: 5, mismatch: -4 },
            gap_open: -8,
            gap_extend: -8,
            scale: 1.0,
            score_threshold: threshold,
            energy_enabled: false,
            ..Default::default()
        }
    }

    fn run(q: &str, r: &str, params: &ScanParams) -> (HitSummary, HitCollector) {
        let mut out = HitCollector::default();
        let summary = scan_pair(&FastaRecord::new("q", q), &FastaRecord::new("r", r), params,
            &StackingEnergy::default(), &mut out).unwrap();
        (summary, out)
    }

    fn random_seq(rng: &mut StdRng, len: usize) -> String {
        (0..len).map(|_| ['A', 'C', 'G', 'U'][rng.gen_range(0..4)]).collect()
    }

    #[test]
    fn exact_repeat_is_found() {
        let (summary, out) = run("AGCUAGCUAG", "CCCCAGCUAGCUAGCCCC", &identity(30.0));
        assert_eq!(summary.hits, 1);
        let (hit, _) = &out.hits[0];
        assert_eq!(hit.ref_core, 4..14);
        assert_eq!(hit.query_core, 0..10);
        assert_eq!(hit.marker_row, "||||||||||");
        assert_eq!(hit.gap_count(), 0);
        assert_eq!(hit.score, 50);
        assert_eq!(summary.positions, vec![5]);
    }

    #[test]
    fn complementary_pair_passes_strict_seed() {
        let params = ScanParams { strict: true, energy_enabled: false, ..Default::default() };
        let (summary, out) = run("UGAGGUAG", "ACUCCAUC", &params);
        assert_eq!(summary.hits, 1);
        let (hit, energy) = &out.hits[0];
        assert_eq!(hit.score, 160);
        assert_eq!(*energy, DISABLED_ENERGY);
        assert_eq!(hit.ref_span, 0..8);
        assert_eq!(summary.scan_score, -DISABLED_ENERGY);
        assert_eq!(out.summaries.len(), 1);
    }

    #[test]
    fn two_separate_sites() {
        let q = "ACGUACGGAU";
        let r = format!("GGGG{q}UUUUUUUUUUUU{q}GGGG");
        let (summary, out) = run(q, &r, &identity(40.0));
        assert_eq!(summary.hits, 2);
        assert_eq!(summary.positions, vec![5, 27]);
        let (a, b) = (&out.hits[0].0, &out.hits[1].0);
        assert!(a.ref_span.end <= b.ref_span.start);
        assert_eq!(summary.total_score, 100.0);
        assert_eq!(summary.max_score, 50.0);
    }

    // A clean copy of the first eight query bases directly followed by a full
    // copy with a mismatch at query position 4. The weaker site's trailing
    // flank runs into the stronger one.
    const OVERLAP_QUERY: &str = "ACGGAUCCUUGA";
    const OVERLAP_REF: &str = "UUUUACGGAUCCACGCAUCCUUGAUUUU";

    fn candidate_spans(q: &str, r: &str, params: &ScanParams) -> Vec<(i32, Range<usize>)> {
        let (qb, rb) = (q.as_bytes(), r.as_bytes());
        let table = ScoreTable::build(qb, rb, params);
        let matrix = AlignmentMatrix::build(&table, params);
        matrix
            .candidates()
            .iter()
            .take_while(|c| params.score_passes(c.score))
            .map(|end| {
                let mut hit = traceback(&matrix, end, qb, rb, &params.scheme);
                Flanks::attach(&mut hit, qb, rb);
                (hit.score, hit.ref_span)
            })
            .collect()
    }

    #[test]
    fn overlapping_sites_keep_the_first_candidate() {
        let params = identity(35.0);
        let spans = candidate_spans(OVERLAP_QUERY, OVERLAP_REF, &params);
        assert!(spans.len() >= 2, "expected competing candidates, got {spans:?}");
        assert_eq!(spans[0], (51, 12..24));
        assert!(spans.contains(&(40, 4..16)));
        let first = &spans[0].1;
        for (_, span) in &spans[1..] {
            assert!(span.start < first.end && first.start < span.end, "{span:?} misses {first:?}");
        }

        let (summary, out) = run(OVERLAP_QUERY, OVERLAP_REF, &params);
        assert_eq!(summary.hits, 1);
        assert_eq!(out.hits[0].0.score, 51);
        assert_eq!(out.hits[0].0.ref_span, 12..24);
        assert_eq!(summary.positions, vec![13]);
    }

    #[test]
    fn seed_failure_still_claims_its_footprint() {
        // The 51 site fails the seed (mismatch at position 4) but keeps the
        // overlapping clean-seed site from being reported.
        let params = ScanParams { strict: true, ..identity(35.0) };
        let (summary, out) = run(OVERLAP_QUERY, OVERLAP_REF, &params);
        assert_eq!(summary.hits, 0);
        assert!(out.hits.is_empty());
        assert!(out.summaries.is_empty());

        let (lone, _) = run(OVERLAP_QUERY, "UUUUACGGAUCCUUUUUUUUUUUU", &params);
        assert_eq!(lone.hits, 1);
    }

    #[test]
    fn aggregator_claims_before_gating() {
        let params = ScanParams { strict: true, ..identity(10.0) };
        let mut agg = HitAggregator::new(&params);
        let hit = |score, span: Range<usize>| Hit {
            score,
            query_core: 0..0,
            ref_core: span.clone(),
            ref_span: span,
            query_row: String::new(),
            marker_row: String::new(),
            ref_row: String::new(),
            flanks: Flanks::default(),
        };

        let top = hit(50, 10..20);
        assert!(agg.claim(&top));
        assert_eq!(agg.offer(&top, false, DISABLED_ENERGY), Verdict::Seed);
        assert!(!agg.claim(&hit(40, 15..25)));

        let clean = hit(30, 20..30);
        assert!(agg.claim(&clean));
        assert_eq!(agg.offer(&clean, true, DISABLED_ENERGY), Verdict::Accepted);
        assert_eq!(agg.summary().hits, 1);
        assert_eq!(agg.summary().positions, vec![21]);
        assert_eq!(agg.offer(&hit(5, 40..45), true, DISABLED_ENERGY), Verdict::BelowScore);
        assert_eq!(agg.finish().total_score, 30.0);
    }

    #[test]
    fn empty_sequences_give_empty_summary() {
        for (q, r) in [("", "ACGU"), ("ACGU", ""), ("", "")] {
            let (summary, out) = run(q, r, &identity(1.0));
            assert_eq!(summary, HitSummary::new(false));
            assert!(out.hits.is_empty() && out.summaries.is_empty());
        }
    }

    #[test]
    fn energy_gate_rejects_unstable_hits() {
        let params = ScanParams { energy_threshold: -100.0, ..identity(30.0) };
        let params = ScanParams { energy_enabled: true, ..params };
        let mut out = HitCollector::default();
        let always_weak = |_: &Hit| -5.0;
        let summary = scan_pair(&FastaRecord::new("q", "AGCUAGCUAG"), &FastaRecord::new("r", "CCCCAGCUAGCUAGCCCC"),
            &params, &always_weak, &mut out).unwrap();
        assert_eq!(summary.hits, 0);
        assert!(out.summaries.is_empty());
    }

    #[test]
    fn summary_tracks_energies() {
        let q = "ACGUACGGAU";
        let r = format!("GGGG{q}UUUUUUUUUUUU{q}GGGG");
        let params = ScanParams { energy_enabled: true, ..identity(40.0) };
        let mut out = HitCollector::default();
        let by_start = |h: &Hit| if h.ref_core.start < 10 { -7.5 } else { -2.5 };
        let summary = scan_pair(&FastaRecord::new("q", q), &FastaRecord::new("r", &r), &params,
            &by_start, &mut out).unwrap();
        assert_eq!(summary.hits, 2);
        assert_eq!(summary.scan_score, 10.0);
        assert_eq!(summary.min_energy, -7.5);
        assert!(summary.energy_evaluated);
    }

    #[test]
    fn reversed_mirna_site_passes_strict_seed() {
        let params = ScanParams {
            strict: true,
            energy_enabled: false,
            orientation: QueryOrientation::ThreePrimeFirst,
            score_threshold: 100.0,
            ..Default::default()
        };
        let mirna = "GAUGGAGU"; // UGAGGUAG read 3'→5'
        let site = "CUACCUCA";
        let (summary, out) = run(mirna, &format!("AAAA{site}AAAA"), &params);
        assert_eq!(summary.hits, 1);
        let counts = seed_counts(&out.hits[0].0, params.orientation, &params.seed);
        assert!(counts.passes(&params.seed));
    }

    #[test]
    fn invalid_params_are_reported() {
        let params = ScanParams { gap_open: 1, ..Default::default() };
        let mut out = HitCollector::default();
        let err = scan_pair(&FastaRecord::new("q", "ACGU"), &FastaRecord::new("r", "ACGU"), &params,
            &StackingEnergy::default(), &mut out);
        assert!(matches!(err, Err(MirscanError::InvalidParams(_))));
    }

    #[test]
    fn random_pairs_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..40 {
            let (q_len, r_len) = (rng.gen_range(0..25), rng.gen_range(0..120));
            let q = random_seq(&mut rng, q_len);
            let r = random_seq(&mut rng, r_len);
            for strict in [false, true] {
                let params = ScanParams { strict, score_threshold: 20.0, energy_enabled: false, ..Default::default() };
                let (summary, out) = run(&q, &r, &params);
                let (again, out_again) = run(&q, &r, &params);
                assert_eq!(summary, again);
                assert_eq!(out.hits, out_again.hits);

                for (i, (a, _)) in out.hits.iter().enumerate() {
                    for (b, _) in &out.hits[i + 1..] {
                        assert!(a.ref_span.end <= b.ref_span.start || b.ref_span.end <= a.ref_span.start);
                    }
                    if strict {
                        let c = seed_counts(a, params.orientation, &params.seed);
                        assert_eq!(c.gaps, 0);
                        assert!(c.exact >= 7);
                    }
                }
                assert_eq!(summary.hits, out.hits.len());
            }
        }
    }

    #[test]
    fn raising_threshold_only_removes_hits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..30 {
            let q = random_seq(&mut rng, 20);
            let r = random_seq(&mut rng, 150);
            let low = ScanParams { score_threshold: 15.0, energy_enabled: false, ..Default::default() };
            let high = ScanParams { score_threshold: 40.0, ..low.clone() };
            let (_, lo) = run(&q, &r, &low);
            let (_, hi) = run(&q, &r, &high);
            assert!(hi.hits.len() <= lo.hits.len());
            assert_eq!(hi.hits[..], lo.hits[..hi.hits.len()]);
        }
    }

    #[test]
    fn rescanning_gives_identical_results() {
        let mut rng = StdRng::seed_from_u64(11);
        let q = random_seq(&mut rng, 22);
        let r = random_seq(&mut rng, 200);
        let params = ScanParams { score_threshold: 20.0, ..Default::default() };
        let (s1, h1) = run(&q, &r, &params);
        let (s2, h2) = run(&q, &r, &params);
        assert_eq!(s1, s2);
        assert_eq!(h1.hits, h2.hits);
        assert_eq!(h1.summaries, h2.summaries);
    }
}
