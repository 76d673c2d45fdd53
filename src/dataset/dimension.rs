//! Resolved dimensions
//!
//! The presentation side of a dimension: every value each segment can take,
//! with labels, and O(1) reverse lookup from a raw value.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::Value;

/// One value of a dimension, with the segment that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionValue {
    pub segment_key: String,
    pub value: Value,
    pub label: String,
}

impl DimensionValue {
    pub fn new(segment_key: impl Into<String>, value: Value, label: impl Into<String>) -> Self {
        Self {
            segment_key: segment_key.into(),
            value,
            label: label.into(),
        }
    }
}

/// The resolved values of one segment
#[derive(Debug, Clone, Serialize)]
pub struct DimensionSegment {
    key: String,
    #[serde(rename = "values")]
    dimension_values: Vec<DimensionValue>,
    #[serde(skip)]
    index: HashMap<Value, usize>,
}

impl DimensionSegment {
    pub fn new(key: impl Into<String>, dimension_values: Vec<DimensionValue>) -> Self {
        let index = dimension_values
            .iter()
            .enumerate()
            .map(|(i, dv)| (dv.value.clone(), i))
            .collect();
        Self {
            key: key.into(),
            dimension_values,
            index,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> Vec<Value> {
        self.dimension_values.iter().map(|dv| dv.value.clone()).collect()
    }

    pub fn dimension_values(&self) -> &[DimensionValue] {
        &self.dimension_values
    }

    pub fn dimension_value_for(&self, value: &Value) -> Option<&DimensionValue> {
        self.index.get(value).map(|&i| &self.dimension_values[i])
    }

    pub fn label_for(&self, value: &Value) -> Option<&str> {
        self.dimension_value_for(value).map(|dv| dv.label.as_str())
    }
}

/// A resolved dimension
///
/// Reverse lookup by value is built once from every segment's values. If the
/// same raw value appears in more than one segment, the segment declared last
/// wins the lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    key: String,
    label: Option<String>,
    segments: Vec<DimensionSegment>,
    #[serde(skip)]
    value_index: HashMap<Value, (usize, usize)>,
}

impl Dimension {
    pub fn new(
        key: impl Into<String>,
        label: Option<String>,
        segments: Vec<DimensionSegment>,
    ) -> Self {
        let mut value_index = HashMap::new();
        for (si, segment) in segments.iter().enumerate() {
            for (vi, dv) in segment.dimension_values.iter().enumerate() {
                value_index.insert(dv.value.clone(), (si, vi));
            }
        }
        Self {
            key: key.into(),
            label,
            segments,
            value_index,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn segments(&self) -> &[DimensionSegment] {
        &self.segments
    }

    /// Get a segment by key
    pub fn segment(&self, key: &str) -> Option<&DimensionSegment> {
        self.segments.iter().find(|s| s.key == key)
    }

    /// Every value of every segment, in segment order
    pub fn values(&self) -> Vec<Value> {
        self.values_for_segments(&[])
    }

    /// Values of the named segments, in the order the keys are given
    ///
    /// An empty key list selects every segment in declaration order. Unknown
    /// keys contribute nothing.
    pub fn values_for_segments(&self, segment_keys: &[&str]) -> Vec<Value> {
        self.dimension_values_for_segments(segment_keys)
            .into_iter()
            .map(|dv| dv.value.clone())
            .collect()
    }

    pub fn dimension_values_for_segments(&self, segment_keys: &[&str]) -> Vec<&DimensionValue> {
        if segment_keys.is_empty() {
            return self
                .segments
                .iter()
                .flat_map(|s| s.dimension_values.iter())
                .collect();
        }
        segment_keys
            .iter()
            .filter_map(|key| self.segment(key))
            .flat_map(|s| s.dimension_values.iter())
            .collect()
    }

    pub fn dimension_value_for(&self, value: &Value) -> Option<&DimensionValue> {
        self.value_index
            .get(value)
            .map(|&(si, vi)| &self.segments[si].dimension_values[vi])
    }

    pub fn label_for(&self, value: &Value) -> Option<&str> {
        self.dimension_value_for(value).map(|dv| dv.label.as_str())
    }
}
