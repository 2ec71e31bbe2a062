//! Unaligned context around an alignment core.
//!
//! Every query position outside the core is shown against the reference
//! symbol that would pair with it if the core's diagonal were extended
//! ungapped, in lowercase. Past either end of the reference the row holds a
//! `-`. The reference symbols that do exist widen the hit's reference span.
use crate::traceback::Hit;

/// The six flank rows of a hit. `leading_*` precede the core in query
/// order, `trailing_*` follow it; `*_spacer` rows are blank marker rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flanks {
    pub leading_query: String,
    pub leading_ref: String,
    pub leading_spacer: String,
    pub trailing_query: String,
    pub trailing_ref: String,
    pub trailing_spacer: String,
}

/// How many reference symbols each flank actually covered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlankOffsets {
    pub leading: usize,
    pub trailing: usize,
}

impl Flanks {
    /// Build the flanks for `hit`, widen `hit.ref_span` by the covered
    /// reference symbols and upper-case the core rows.
    pub fn attach(hit: &mut Hit, query: &[u8], reference: &[u8]) -> FlankOffsets {
        let mut flanks = Flanks::default();
        let mut offsets = FlankOffsets::default();
        let (q_start, q_end) = (hit.query_core.start, hit.query_core.end);
        let (r_start, r_end) = (hit.ref_core.start, hit.ref_core.end);

        for (k, &q) in query[..q_start].iter().enumerate() {
            let back = q_start - k;
            flanks.leading_query.push(char::from(q.to_ascii_lowercase()));
            match r_start.checked_sub(back) {
                Some(r) => {
                    flanks.leading_ref.push(char::from(reference[r].to_ascii_lowercase()));
                    offsets.leading += 1;
                }
                None => flanks.leading_ref.push('-'),
            }
            flanks.leading_spacer.push(' ');
        }

        for (k, &q) in query[q_end..].iter().enumerate() {
            flanks.trailing_query.push(char::from(q.to_ascii_lowercase()));
            match reference.get(r_end + k) {
                Some(r) => {
                    flanks.trailing_ref.push(char::from(r.to_ascii_lowercase()));
                    offsets.trailing += 1;
                }
                None => flanks.trailing_ref.push('-'),
            }
            flanks.trailing_spacer.push(' ');
        }

        hit.ref_span = (r_start - offsets.leading)..(r_end + offsets.trailing);
        hit.flanks = flanks;
        hit.uppercase_core();
        offsets
    }
}

impl Hit {
    /// Query row including flanks, in the order the query was supplied.
    pub fn full_query_row(&self) -> String {
        [self.flanks.leading_query.as_str(), &self.query_row, &self.flanks.trailing_query].concat()
    }

    /// Marker row including the blank flank spacers.
    pub fn full_marker_row(&self) -> String {
        [self.flanks.leading_spacer.as_str(), &self.marker_row, &self.flanks.trailing_spacer].concat()
    }

    /// Reference row including flanks.
    pub fn full_ref_row(&self) -> String {
        [self.flanks.leading_ref.as_str(), &self.ref_row, &self.flanks.trailing_ref].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_hit(query_core: std::ops::Range<usize>, ref_core: std::ops::Range<usize>, rows: (&str, &str, &str)) -> Hit {
        Hit {
            score: 0,
            query_core,
            ref_span: ref_core.clone(),
            ref_core,
            query_row: rows.0.into(),
            marker_row: rows.1.into(),
            ref_row: rows.2.into(),
            flanks: Flanks::default(),
        }
    }

    #[test]
    fn flanks_inside_reference() {
        // core ACGU of ggACGUcc sits on reference 6..10
        let query = b"GGACGUCC";
        let reference = b"UUUUUUACGUAAAAAA";
        let mut hit = core_hit(2..6, 6..10, ("acgu", "||||", "acgu"));
        let off = Flanks::attach(&mut hit, query, reference);
        assert_eq!(off, FlankOffsets { leading: 2, trailing: 2 });
        assert_eq!(hit.flanks.leading_query, "gg");
        assert_eq!(hit.flanks.leading_ref, "uu");
        assert_eq!(hit.flanks.trailing_query, "cc");
        assert_eq!(hit.flanks.trailing_ref, "aa");
        assert_eq!(hit.flanks.leading_spacer, "  ");
        assert_eq!(hit.ref_span, 4..12);
        assert_eq!(hit.query_row, "ACGU");
        assert_eq!(hit.ref_row, "ACGU");
        assert_eq!(hit.full_query_row(), "ggACGUcc");
        assert_eq!(hit.full_marker_row(), "  ||||  ");
    }

    #[test]
    fn flanks_clip_at_reference_ends() {
        let query = b"AAACGUAAA";
        let reference = b"ACGUA";
        let mut hit = core_hit(2..6, 0..4, ("ACGU", "||||", "ACGU"));
        let off = Flanks::attach(&mut hit, query, reference);
        assert_eq!(off, FlankOffsets { leading: 0, trailing: 1 });
        assert_eq!(hit.flanks.leading_ref, "--");
        assert_eq!(hit.flanks.trailing_ref, "a--");
        assert_eq!(hit.ref_span, 0..5);
        assert_eq!(hit.full_ref_row(), "--ACGUa--");
    }

    #[test]
    fn whole_query_aligned_has_no_flanks() {
        let mut hit = core_hit(0..4, 3..7, ("ACGU", "||||", "ACGU"));
        let off = Flanks::attach(&mut hit, b"ACGU", b"GGGACGUGGG");
        assert_eq!(off, FlankOffsets::default());
        assert_eq!(hit.flanks, Flanks::default());
        assert_eq!(hit.ref_span, 3..7);
    }
}
