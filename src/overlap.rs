//! Greedy non-overlap of accepted hits on the reference axis.
//!
//! Hits are offered in candidate order; the first one to claim a stretch of
//! reference keeps it. This does not try to maximise the number or total
//! score of accepted hits.
use std::ops::Range;

#[derive(Clone, Debug, Default)]
pub struct OverlapFilter {
    accepted: Vec<Range<usize>>,
}

impl OverlapFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `span` shares a reference position with any recorded span.
    pub fn overlaps(&self, span: &Range<usize>) -> bool {
        self.accepted.iter().any(|a| span.start < a.end && a.start < span.end)
    }

    /// Record an accepted span.
    pub fn record(&mut self, span: Range<usize>) {
        self.accepted.push(span);
    }

    /// Check and record in one step; returns whether `span` was free.
    pub fn try_claim(&mut self, span: Range<usize>) -> bool {
        if self.overlaps(&span) {
            return false;
        }
        self.record(span);
        true
    }

    pub fn accepted(&self) -> &[Range<usize>] {
        &self.accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_spans_do_not_overlap() {
        let mut f = OverlapFilter::new();
        assert!(f.try_claim(10..20));
        assert!(f.try_claim(20..30));
        assert!(f.try_claim(0..10));
        assert_eq!(f.accepted().len(), 3);
    }

    #[test]
    fn shared_position_rejects() {
        let mut f = OverlapFilter::new();
        f.record(10..20);
        assert!(f.overlaps(&(19..25)));
        assert!(f.overlaps(&(5..11)));
        assert!(f.overlaps(&(12..15)));
        assert!(f.overlaps(&(0..40)));
        assert!(!f.try_claim(15..16));
        assert_eq!(f.accepted(), &[10..20]);
    }

    #[test]
    fn empty_filter_accepts_everything() {
        assert!(!OverlapFilter::new().overlaps(&(0..1000)));
    }
}
