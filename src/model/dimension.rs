//! Dimension models

use super::segment::SegmentModel;
use crate::dataset::{Dimension, DimensionSegment, DimensionValue};
use crate::error::{ConfigError, ExecutionError};
use crate::source::Source;

/// A dimension: an ordered, non-empty list of segments sharing a key
#[derive(Debug)]
pub struct DimensionModel<S: Source> {
    key: String,
    label: Option<String>,
    segments: Vec<SegmentModel<S>>,
}

impl<S: Source> DimensionModel<S> {
    pub fn new(
        key: impl Into<String>,
        label: Option<String>,
        segments: Vec<SegmentModel<S>>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::MissingKey { what: "dimension" });
        }
        if segments.is_empty() {
            return Err(ConfigError::NoSegments { dimension: key });
        }
        if let Some(stray) = segments.iter().find(|s| s.dimension_key() != key) {
            return Err(ConfigError::DimensionMismatch {
                segment: stray.key().to_string(),
                expected: key,
                found: stray.dimension_key().to_string(),
            });
        }
        Ok(Self { key, label, segments })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn segments(&self) -> &[SegmentModel<S>] {
        &self.segments
    }

    /// Get a segment by key
    pub fn segment(&self, key: &str) -> Option<&SegmentModel<S>> {
        self.segments.iter().find(|s| s.key() == key)
    }

    /// One step of the region cross-join
    ///
    /// For each segment index `i`, every prefix is extended with `i`; without
    /// prefixes each index becomes a singleton. Given 2 segments and prefixes
    /// `[[0], [1]]` the result is `[[0, 0], [1, 0], [0, 1], [1, 1]]`.
    pub fn index_list(&self, prefixes: Option<&[Vec<usize>]>) -> Vec<Vec<usize>> {
        let empty = [Vec::new()];
        let prefixes = prefixes.unwrap_or(&empty);
        (0..self.segments.len())
            .flat_map(|i| {
                prefixes.iter().map(move |prefix| {
                    let mut indexes = prefix.clone();
                    indexes.push(i);
                    indexes
                })
            })
            .collect()
    }

    /// Dimension values of every segment, concatenated in segment order
    pub fn dimension_values(
        &self,
        source: &S,
    ) -> Result<Vec<DimensionValue>, ExecutionError<S::Error>> {
        let mut values = Vec::new();
        for segment in &self.segments {
            values.extend(segment.dimension_values(source)?);
        }
        Ok(values)
    }

    /// Resolve the presentation view of this dimension against `source`
    pub fn resolve(&self, source: &S) -> Result<Dimension, ExecutionError<S::Error>> {
        let segments = self
            .segments
            .iter()
            .map(|segment| {
                Ok(DimensionSegment::new(
                    segment.key(),
                    segment.dimension_values(source)?,
                ))
            })
            .collect::<Result<Vec<_>, ExecutionError<S::Error>>>()?;
        Ok(Dimension::new(&self.key, self.label.clone(), segments))
    }
}
