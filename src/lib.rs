//! # mirscan
//!
//! microRNA target scanning in Rust.
//!
//! A short query (a microRNA) is aligned against a longer reference (a 3'
//! UTR) with a three-state local alignment. Rather than keeping only the
//! single best alignment, every local score peak becomes a candidate; the
//! candidates are traced back, extended with their unaligned flanks, kept
//! free of reference overlap, optionally required to pair cleanly over the
//! seed (query positions 2–8) and finally gated on an estimated duplex
//! free energy.
//!
//! ## Pipeline
//! ```text
//! ScoreTable ─▶ AlignmentMatrix ─▶ candidates (best first)
//!     └─▶ traceback ─▶ Flanks ─▶ overlap ─▶ seed ─▶ energy ─▶ HitAggregator ─▶ Reporter
//! ```
//!
//! ### Example
//! ```
//! use mirscan::{scan_pair, FastaRecord, HitCollector, QueryOrientation, ScanParams, StackingEnergy};
//! // let-7 seed region read 3'→5', against its complementary site
//! let mirna = FastaRecord::new("let-7", "UGAGGUAG").reversed();
//! let utr = FastaRecord::new("utr", "AAAACUACCUCAAAAA");
//! let params = ScanParams { orientation: QueryOrientation::ThreePrimeFirst, strict: true,
//!                           energy_enabled: false, ..Default::default() };
//! let mut hits = HitCollector::default();
//! let summary = scan_pair(&mirna, &utr, &params, &StackingEnergy::default(), &mut hits).unwrap();
//! assert_eq!(summary.hits, 1);
//! assert_eq!(hits.hits[0].0.marker_row, "||||||||");
//! ```
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod common;
pub mod energy;
pub mod flank;
pub mod matrix;
pub mod overlap;
pub mod params;
pub mod report;
pub mod scan;
pub mod scoring;
pub mod seed;
pub mod traceback;

pub use common::{parse_fasta, read_fasta, FastaRecord, MirscanError};
pub use energy::{EnergyEstimator, StackingEnergy};
pub use flank::{FlankOffsets, Flanks};
pub use matrix::{AlignmentMatrix, CandidateEndpoint, State, Trace};
pub use overlap::OverlapFilter;
pub use params::{QueryOrientation, ScanParams, DISABLED_ENERGY};
pub use report::{HitCollector, MultiReporter, Reporter, TextReporter, TsvReporter};
pub use scan::{scan_pair, scan_records, HitAggregator, HitSummary, Verdict};
pub use scoring::{PairKind, ScoreTable, ScoringScheme};
pub use seed::{seed_counts, seed_passes, SeedCounts, SeedRule};
pub use traceback::{traceback, Hit};
