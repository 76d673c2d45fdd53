//! Dataset models

use std::collections::HashSet;
use std::fmt;

use super::dimension::DimensionModel;
use super::measure::MeasureModel;
use super::segment::SegmentModel;
use crate::dataset::{Dataset, Point};
use crate::error::{ConfigError, ExecutionError};
use crate::planner::{self, RegionQuery};
use crate::source::{Row, Source};

/// A source, the dimensions to break it down by and the measures to compute
///
/// Resolving the model runs one aggregate query per region, where a region
/// picks one segment from every dimension.
pub struct DatasetModel<S: Source> {
    source: S,
    dimensions: Vec<DimensionModel<S>>,
    measures: Vec<MeasureModel>,
}

impl<S: Source> DatasetModel<S> {
    pub fn new(
        source: S,
        dimensions: Vec<DimensionModel<S>>,
        measures: Vec<MeasureModel>,
    ) -> Result<Self, ConfigError> {
        if dimensions.is_empty() {
            return Err(ConfigError::NoDimensions);
        }
        if measures.is_empty() {
            return Err(ConfigError::NoMeasures);
        }

        // Points are flat maps, so dimension and measure keys share one
        // namespace. Result columns match keys case-insensitively.
        let mut keys = HashSet::new();
        let all_keys = dimensions
            .iter()
            .map(|d| d.key())
            .chain(measures.iter().map(|m| m.key()));
        for key in all_keys {
            if !keys.insert(key.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateKey(key.to_string()));
            }
        }

        Ok(Self {
            source,
            dimensions,
            measures,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn dimensions(&self) -> &[DimensionModel<S>] {
        &self.dimensions
    }

    pub fn measures(&self) -> &[MeasureModel] {
        &self.measures
    }

    /// Get a dimension by key
    pub fn dimension(&self, key: &str) -> Option<&DimensionModel<S>> {
        self.dimensions.iter().find(|d| d.key() == key)
    }

    /// Get a measure by key
    pub fn measure(&self, key: &str) -> Option<&MeasureModel> {
        self.measures.iter().find(|m| m.key() == key)
    }

    /// Every region as a tuple of segment indexes, in query order
    pub fn region_indexes(&self) -> Vec<Vec<usize>> {
        planner::region_indexes(&self.dimensions)
    }

    /// The segments selected by a region tuple, in dimension order
    pub fn region_for(&self, indexes: &[usize]) -> Option<Vec<&SegmentModel<S>>> {
        planner::region_for(&self.dimensions, indexes)
    }

    pub fn construct_query(&self, region: &[&SegmentModel<S>]) -> Result<RegionQuery<S>, S::Error> {
        planner::construct_query(&self.source, region, &self.measures)
    }

    pub fn extract(
        &self,
        rows: &[Row],
        region: &[&SegmentModel<S>],
    ) -> Result<Vec<Point>, ExecutionError<S::Error>> {
        planner::extract(rows, region, &self.measures)
    }

    /// Run the query of one region, given as a tuple of segment indexes
    ///
    /// A tuple that does not pick one existing segment from every dimension
    /// is `ExecutionError::InvalidRegion`.
    pub fn run_region(&self, indexes: &[usize]) -> Result<Vec<Point>, ExecutionError<S::Error>> {
        let region = self
            .region_for(indexes)
            .ok_or_else(|| ExecutionError::InvalidRegion {
                indexes: indexes.to_vec(),
            })?;
        let query = self.construct_query(&region).map_err(ExecutionError::Source)?;

        log::debug!(
            "region [{}]: select {:?} group by {:?}",
            region_keys(&region),
            query.select(),
            query.group_by()
        );

        let rows = query.execute().map_err(ExecutionError::Source)?;
        log::trace!("region [{}]: {} rows", region_keys(&region), rows.len());

        self.extract(&rows, &region)
    }

    /// Run every region query and collect the points in region order
    ///
    /// The first failing region aborts the run.
    pub fn run_all_queries(&self) -> Result<Vec<Point>, ExecutionError<S::Error>> {
        let mut points = Vec::new();
        for indexes in self.region_indexes() {
            points.extend(self.run_region(&indexes)?);
        }
        Ok(points)
    }

    /// Run every query and build the indexed dataset
    pub fn resolve_dataset(&self) -> Result<Dataset, ExecutionError<S::Error>> {
        let data = self.run_all_queries()?;
        let dimensions = self
            .dimensions
            .iter()
            .map(|d| d.resolve(&self.source))
            .collect::<Result<Vec<_>, _>>()?;
        let dataset = Dataset::new(dimensions, self.measures.clone(), data);
        log::info!(
            "resolved dataset: {} regions, {} points, {} index entries",
            self.region_indexes().len(),
            dataset.len(),
            dataset.indexed_data().len()
        );
        Ok(dataset)
    }
}

fn region_keys<S: Source>(region: &[&SegmentModel<S>]) -> String {
    region
        .iter()
        .map(|s| format!("{}={}", s.dimension_key(), s.key()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<S: Source + fmt::Debug> fmt::Debug for DatasetModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetModel")
            .field("source", &self.source)
            .field("dimensions", &self.dimensions)
            .field("measures", &self.measures)
            .finish()
    }
}
