//! Orientation of a contig from the co-linearity of its markers.
//!
//! Markers are walked in contig order. Every adjacent pair whose genetic
//! positions differ says whether genetic and contig coordinates run the same
//! way ([`Strand::Forward`]) or opposite ways ([`Strand::Reverse`]). The contig
//! can only be oriented when every such pair agrees.
use std::cmp::Ordering;
use std::fmt;

use crate::marker::Marker;

/// The orientation of a contig relative to the genetic map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    /// `+`: contig and genetic positions increase together.
    Forward,
    /// `-`: genetic positions decrease along the contig.
    Reverse,
    /// The markers carry no orientation information.
    #[default]
    Unknown,
}

impl Strand {
    pub fn symbol(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => "",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The strand implied by one adjacent pair of markers, or `None` if their
/// genetic positions are equal.
fn pair_strand(m1: &Marker, m2: &Marker) -> Option<Strand> {
    let genetic = m1.gen_pos.cmp(&m2.gen_pos);
    if genetic == Ordering::Equal {
        return None;
    }
    if genetic == m1.con_pos.cmp(&m2.con_pos) {
        Some(Strand::Forward)
    } else {
        Some(Strand::Reverse)
    }
}

/// Orient a set of markers.
///
/// Returns `None` if two informative pairs disagree, meaning the markers cannot
/// be placed consistently. Otherwise returns the agreed strand, which is
/// [`Strand::Unknown`] when no pair was informative.
///
/// Markers are ordered by contig position, with genetic position breaking
/// ties, so the result does not depend on the input order.
pub fn orient_markers<'a, I>(markers: I) -> Option<Strand>
where
    I: IntoIterator<Item = &'a Marker>,
{
    let mut markers: Vec<&Marker> = markers.into_iter().collect();
    markers.sort_by_key(|m| (m.con_pos, m.gen_pos));

    let mut strand = Strand::Unknown;
    for pair in markers.windows(2) {
        let Some(local) = pair_strand(pair[0], pair[1]) else {
            continue;
        };
        match strand {
            Strand::Unknown => strand = local,
            agreed if agreed != local => return None,
            _ => {}
        }
    }
    Some(strand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(con_pos: u64, gen_pos: u64) -> Marker {
        Marker::synthetic(con_pos, gen_pos, 1)
    }

    #[test]
    fn test_forward() {
        let markers = [marker(10, 100), marker(20, 200), marker(30, 300)];
        assert_eq!(orient_markers(&markers), Some(Strand::Forward));
    }

    #[test]
    fn test_reverse() {
        let markers = [marker(10, 300), marker(20, 200), marker(30, 100)];
        assert_eq!(orient_markers(&markers), Some(Strand::Reverse));
    }

    #[test]
    fn test_conflict() {
        let markers = [marker(10, 100), marker(20, 300), marker(30, 200)];
        assert_eq!(orient_markers(&markers), None);
    }

    #[test]
    fn test_equal_genetic_positions_are_skipped() {
        let markers = [marker(10, 100), marker(20, 100), marker(30, 200)];
        assert_eq!(orient_markers(&markers), Some(Strand::Forward));

        let flat = [marker(10, 100), marker(20, 100)];
        assert_eq!(orient_markers(&flat), Some(Strand::Unknown));
    }

    #[test]
    fn test_no_pairs() {
        assert_eq!(orient_markers(&[marker(10, 100)]), Some(Strand::Unknown));
        assert_eq!(orient_markers(Vec::<&Marker>::new()), Some(Strand::Unknown));
    }

    #[test]
    fn test_equal_contig_positions_read_as_reverse() {
        let markers = [marker(10, 100), marker(10, 200)];
        assert_eq!(orient_markers(&markers), Some(Strand::Reverse));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let markers = vec![
            marker(50, 100),
            marker(10, 400),
            marker(20, 300),
            marker(20, 300),
            marker(30, 200),
        ];
        let mut reversed = markers.clone();
        reversed.reverse();
        assert_eq!(orient_markers(&markers), Some(Strand::Reverse));
        assert_eq!(orient_markers(&reversed), Some(Strand::Reverse));

        let tied = vec![marker(10, 100), marker(10, 150), marker(20, 200)];
        let mut reversed = tied.clone();
        reversed.reverse();
        assert_eq!(orient_markers(&tied), orient_markers(&reversed));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert_eq!(Strand::Unknown.to_string(), "");
    }
}
