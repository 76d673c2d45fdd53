//! Per-region query construction

use std::fmt;

use crate::model::{MeasureModel, SegmentModel};
use crate::source::{Row, Source};

/// The aggregate query of one region, ready to run
///
/// `source` has been narrowed by every segment of the region. The select list
/// holds the segment projections first, then the measure expressions; the
/// query groups by the positions of the segment projections.
pub struct RegionQuery<S: Source> {
    source: S,
    select: Vec<String>,
    group_by: Vec<usize>,
}

impl<S: Source> RegionQuery<S> {
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn select(&self) -> &[String] {
        &self.select
    }

    /// 1-based positions of the grouped select expressions
    pub fn group_by(&self) -> &[usize] {
        &self.group_by
    }

    pub fn execute(&self) -> Result<Vec<Row>, S::Error> {
        self.source.select_and_group(&self.select, &self.group_by)
    }
}

impl<S: Source> fmt::Debug for RegionQuery<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionQuery")
            .field("select", &self.select)
            .field("group_by", &self.group_by)
            .finish_non_exhaustive()
    }
}

/// Build the query for `region` over `source`
///
/// Narrows are folded in dimension order. Measure expressions are folded
/// through every segment's modifier in the same order.
pub fn construct_query<S: Source>(
    source: &S,
    region: &[&SegmentModel<S>],
    measures: &[MeasureModel],
) -> Result<RegionQuery<S>, S::Error> {
    let mut narrowed = source.clone();
    for segment in region {
        narrowed = segment.narrow(&narrowed)?;
    }

    let mut select: Vec<String> = region.iter().map(|s| s.resolve_select_expression()).collect();
    select.extend(measures.iter().map(|m| m.select_expression(region)));

    Ok(RegionQuery {
        source: narrowed,
        select,
        group_by: (1..=region.len()).collect(),
    })
}
