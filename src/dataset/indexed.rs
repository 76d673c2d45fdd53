//! The indexed dataset

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::dimension::Dimension;
use crate::model::{MeasureModel, Value};

/// One output row: dimension keys and measure keys mapped to their values
pub type Point = BTreeMap<String, Value>;

/// A full assignment of values to dimension keys
pub type Assignment = BTreeMap<String, Value>;

/// Build an [`Assignment`] from `(dimension_key, value)` pairs
pub fn assignment<K, V, I>(pairs: I) -> Assignment
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Materialized query results, indexed by dimension assignment
///
/// Carries the resolved dimensions (with their labels) and the measure
/// definitions the points were computed from.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    dimensions: Vec<Dimension>,
    measures: Vec<MeasureModel>,
    data: Vec<Point>,
    #[serde(skip)]
    indexed_data: HashMap<Assignment, Point>,
    #[serde(skip)]
    collisions: usize,
}

impl Dataset {
    /// Build a dataset and index its points
    ///
    /// Points sharing a dimension assignment overwrite one another in order:
    /// the last one wins the index entry.
    pub fn new(dimensions: Vec<Dimension>, measures: Vec<MeasureModel>, data: Vec<Point>) -> Self {
        let mut dataset = Self {
            dimensions,
            measures,
            data,
            indexed_data: HashMap::new(),
            collisions: 0,
        };
        dataset.index();
        dataset
    }

    fn index(&mut self) {
        let mut indexed = HashMap::with_capacity(self.data.len());
        let mut collisions = 0;

        for point in &self.data {
            let key = self.index_key(point);
            let measures = self.index_data(point);
            if let Some(previous) = indexed.insert(key, measures) {
                collisions += 1;
                log::warn!(
                    "dataset index collision at {:?}: {:?} overwritten",
                    self.index_key(point),
                    previous
                );
            }
        }

        self.indexed_data = indexed;
        self.collisions = collisions;
    }

    fn index_key(&self, point: &Point) -> Assignment {
        self.dimensions
            .iter()
            .map(|d| {
                let value = point.get(d.key()).cloned().unwrap_or(Value::Null);
                (d.key().to_string(), value)
            })
            .collect()
    }

    fn index_data(&self, point: &Point) -> Point {
        self.measures
            .iter()
            .map(|m| {
                let value = point.get(m.key()).cloned().unwrap_or(Value::Null);
                (m.key().to_string(), value)
            })
            .collect()
    }

    pub fn data(&self) -> &[Point] {
        &self.data
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Get a dimension by key
    pub fn dimension(&self, key: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.key() == key)
    }

    pub fn dimension_keys(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|d| d.key())
    }

    pub fn measures(&self) -> &[MeasureModel] {
        &self.measures
    }

    /// Get a measure definition by key
    pub fn measure(&self, key: &str) -> Option<&MeasureModel> {
        self.measures.iter().find(|m| m.key() == key)
    }

    pub fn measure_keys(&self) -> impl Iterator<Item = &str> {
        self.measures.iter().map(|m| m.key())
    }

    pub fn indexed_data(&self) -> &HashMap<Assignment, Point> {
        &self.indexed_data
    }

    /// Look up one measure value by full dimension assignment
    pub fn datapoint(&self, assignment: &Assignment, measure: &str) -> Option<&Value> {
        self.indexed_data.get(assignment)?.get(measure)
    }

    /// Number of points whose index entry was overwritten by a later point
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
