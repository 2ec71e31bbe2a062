//! Hit and per-pair summary reporting.
//!
//! The scanner hands every accepted hit, and afterwards the pair's
//! [`HitSummary`], to a [`Reporter`]. Reporters here:
//!
//! - [`TextReporter`]: human-readable alignment blocks with `>` hit lines
//!   and `>>` summary lines.
//! - [`TsvReporter`]: tab-separated tables (via the `csv` crate).
//! - [`HitCollector`]: keeps everything in memory.
//! - [`MultiReporter`]: fans out to several reporters.
use std::io::Write;

use crate::common::{FastaRecord, MirscanError};
use crate::params::{QueryOrientation, ScanParams};
use crate::scan::HitSummary;
use crate::traceback::Hit;

/// Receiver of scan results.
pub trait Reporter {
    /// Called once per accepted hit.
    fn report_hit(&mut self, query: &FastaRecord, reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError>;

    /// Called once per pair, only when its scan score is positive.
    fn report_summary(&mut self, query: &FastaRecord, reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError>;

    /// Flush buffered output.
    fn finish(&mut self) -> Result<(), MirscanError> {
        Ok(())
    }
}

/// 1-based inclusive query bounds of the core, numbered along the
/// molecule's 5'→3' direction.
pub fn query_bounds(hit: &Hit, query_len: usize, orientation: QueryOrientation) -> (usize, usize) {
    match orientation {
        QueryOrientation::FivePrimeFirst => (hit.query_core.start + 1, hit.query_core.end),
        QueryOrientation::ThreePrimeFirst => (query_len - hit.query_core.end + 1, query_len - hit.query_core.start),
    }
}

/// 1-based inclusive reference bounds of the hit's footprint.
pub fn ref_bounds(hit: &Hit) -> (usize, usize) {
    (hit.ref_span.start + 1, hit.ref_span.end)
}

fn positions_text(positions: &[usize]) -> String {
    positions.iter().map(|p| format!(" {p}")).collect()
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report_hit(&mut self, query: &FastaRecord, reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError> {
        (**self).report_hit(query, reference, hit, energy)
    }

    fn report_summary(&mut self, query: &FastaRecord, reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError> {
        (**self).report_summary(query, reference, summary)
    }

    fn finish(&mut self) -> Result<(), MirscanError> {
        (**self).finish()
    }
}

/// Plain-text report.
pub struct TextReporter<W: Write> {
    out: W,
    orientation: QueryOrientation,
    energy_enabled: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, params: &ScanParams) -> Self {
        Self { out, orientation: params.orientation, energy_enabled: params.energy_enabled }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report_hit(&mut self, query: &FastaRecord, reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError> {
        let (qs, qe) = query_bounds(hit, query.len(), self.orientation);
        let (rs, re) = ref_bounds(hit);
        let (q5, q3) = match self.orientation {
            QueryOrientation::FivePrimeFirst => ("5'", "3'"),
            QueryOrientation::ThreePrimeFirst => ("3'", "5'"),
        };
        let f = &mut self.out;
        writeln!(f, "   Forward:\tScore: {:.6}  Q:{} to {}  R:{} to {} Align Len ({}) ({:.2}%) ({:.2}%)",
            f64::from(hit.score), qs, qe, rs, re, hit.aligned_len(), hit.pct_identity(), hit.pct_similarity())?;
        writeln!(f)?;
        writeln!(f, "   Query:    {} {} {}", q5, hit.full_query_row(), q3)?;
        writeln!(f, "                {}", hit.full_marker_row())?;
        writeln!(f, "   Ref:      5' {} 3'", hit.full_ref_row())?;
        writeln!(f)?;
        if self.energy_enabled {
            writeln!(f, "   Energy:  {:.2} kCal/Mol", energy)?;
            writeln!(f)?;
        }
        writeln!(f, "Scores for this hit:")?;
        let energy_col = if self.energy_enabled { energy } else { 0.0 };
        writeln!(f, ">{}\t{}\t{:.2}\t{:.2}\t{} {}\t{} {}\t{}\t{:.2}%\t{:.2}%",
            query.id, reference.id, f64::from(hit.score), energy_col, qs, qe, rs, re,
            hit.aligned_len(), hit.pct_identity(), hit.pct_similarity())?;
        writeln!(f)?;
        Ok(())
    }

    fn report_summary(&mut self, query: &FastaRecord, reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError> {
        let f = &mut self.out;
        writeln!(f, "Score for this Scan:")?;
        writeln!(f, "Seq1,Seq2,Tot Score,Tot Energy,Max Score,Max Energy,Len1,Len2,Positions")?;
        let (tot_energy, max_energy) = if summary.energy_evaluated {
            (-summary.scan_score, summary.min_energy)
        } else {
            (0.0, 0.0)
        };
        writeln!(f, ">>{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}",
            query.id, reference.id, summary.total_score, tot_energy, summary.max_score, max_energy,
            query.len(), reference.len(), positions_text(&summary.positions))?;
        writeln!(f, "Complete")?;
        writeln!(f)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MirscanError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Tab-separated hit table with an optional per-pair summary table.
pub struct TsvReporter<W: Write> {
    hits: csv::Writer<W>,
    summaries: Option<csv::Writer<W>>,
    orientation: QueryOrientation,
    energy_enabled: bool,
}

impl<W: Write> TsvReporter<W> {
    /// Create the writers and emit both header rows.
    pub fn new(hits: W, summaries: Option<W>, params: &ScanParams) -> Result<Self, MirscanError> {
        let tsv = |w: W| csv::WriterBuilder::new().delimiter(b'\t').from_writer(w);
        let mut hits = tsv(hits);
        hits.write_record([
            "query_id", "ref_id", "score", "energy", "query_start", "query_end", "ref_start", "ref_end",
            "aln_len", "pct_identity", "pct_similarity", "query_aln", "markers", "ref_aln",
        ])?;
        let summaries = match summaries {
            Some(w) => {
                let mut s = tsv(w);
                s.write_record([
                    "query_id", "ref_id", "hits", "total_score", "total_energy", "max_score", "max_energy",
                    "query_len", "ref_len", "positions",
                ])?;
                Some(s)
            }
            None => None,
        };
        Ok(Self { hits, summaries, orientation: params.orientation, energy_enabled: params.energy_enabled })
    }
}

impl<W: Write> Reporter for TsvReporter<W> {
    fn report_hit(&mut self, query: &FastaRecord, reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError> {
        let (qs, qe) = query_bounds(hit, query.len(), self.orientation);
        let (rs, re) = ref_bounds(hit);
        let energy = if self.energy_enabled { energy } else { 0.0 };
        let row: Vec<String> = vec![
            query.id.clone(), reference.id.clone(),
            hit.score.to_string(),
            format!("{:.2}", energy),
            qs.to_string(), qe.to_string(),
            rs.to_string(), re.to_string(),
            hit.aligned_len().to_string(),
            format!("{:.2}", hit.pct_identity()),
            format!("{:.2}", hit.pct_similarity()),
            hit.full_query_row(), hit.full_marker_row(), hit.full_ref_row(),
        ];
        self.hits.write_record(&row)?;
        Ok(())
    }

    fn report_summary(&mut self, query: &FastaRecord, reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError> {
        if let Some(w) = self.summaries.as_mut() {
            let (tot_energy, max_energy) = if summary.energy_evaluated {
                (-summary.scan_score, summary.min_energy)
            } else {
                (0.0, 0.0)
            };
            let row: Vec<String> = vec![
                query.id.clone(), reference.id.clone(),
                summary.hits.to_string(),
                format!("{:.2}", summary.total_score),
                format!("{:.2}", tot_energy),
                format!("{:.2}", summary.max_score),
                format!("{:.2}", max_energy),
                query.len().to_string(), reference.len().to_string(),
                positions_text(&summary.positions).trim_start().to_string(),
            ];
            w.write_record(&row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MirscanError> {
        self.hits.flush()?;
        if let Some(w) = self.summaries.as_mut() {
            w.flush()?;
        }
        Ok(())
    }
}

/// Keeps every reported hit and summary in memory.
#[derive(Clone, Debug, Default)]
pub struct HitCollector {
    pub hits: Vec<(Hit, f64)>,
    pub summaries: Vec<HitSummary>,
}

impl Reporter for HitCollector {
    fn report_hit(&mut self, _query: &FastaRecord, _reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError> {
        self.hits.push((hit.clone(), energy));
        Ok(())
    }

    fn report_summary(&mut self, _query: &FastaRecord, _reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}

/// Forwards every call to each inner reporter in order.
#[derive(Default)]
pub struct MultiReporter<'a> {
    sinks: Vec<Box<dyn Reporter + 'a>>,
}

impl<'a> MultiReporter<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: impl Reporter + 'a) {
        self.sinks.push(Box::new(sink));
    }
}

impl Reporter for MultiReporter<'_> {
    fn report_hit(&mut self, query: &FastaRecord, reference: &FastaRecord, hit: &Hit, energy: f64)
        -> Result<(), MirscanError> {
        self.sinks.iter_mut().try_for_each(|s| s.report_hit(query, reference, hit, energy))
    }

    fn report_summary(&mut self, query: &FastaRecord, reference: &FastaRecord, summary: &HitSummary)
        -> Result<(), MirscanError> {
        self.sinks.iter_mut().try_for_each(|s| s.report_summary(query, reference, summary))
    }

    fn finish(&mut self) -> Result<(), MirscanError> {
        self.sinks.iter_mut().try_for_each(|s| s.finish())
    }
}
