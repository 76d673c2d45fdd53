//! Region enumeration
//!
//! A region picks one segment from every dimension. Regions are identified by
//! a tuple of segment indexes, one per dimension, in dimension order.

use crate::model::{DimensionModel, SegmentModel};
use crate::source::Source;

/// Every region of `dimensions`, as segment index tuples
///
/// The cross-join is built left to right; within each step the tuples of the
/// preceding dimensions vary fastest. Segment counts `[2, 3]` give
/// `[0,0] [1,0] [0,1] [1,1] [0,2] [1,2]`.
pub fn region_indexes<S: Source>(dimensions: &[DimensionModel<S>]) -> Vec<Vec<usize>> {
    let mut dimensions = dimensions.iter();
    let first = match dimensions.next() {
        Some(first) => first.index_list(None),
        None => return Vec::new(),
    };
    dimensions.fold(first, |prefixes, dimension| {
        dimension.index_list(Some(prefixes.as_slice()))
    })
}

/// The segments a region tuple selects, in dimension order
///
/// Returns `None` if the tuple length does not match the dimension count or
/// any index is out of range.
pub fn region_for<'a, S: Source>(
    dimensions: &'a [DimensionModel<S>],
    indexes: &[usize],
) -> Option<Vec<&'a SegmentModel<S>>> {
    if indexes.len() != dimensions.len() {
        return None;
    }
    dimensions
        .iter()
        .zip(indexes)
        .map(|(dimension, &i)| dimension.segments().get(i))
        .collect()
}
