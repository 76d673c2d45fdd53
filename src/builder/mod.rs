//! Fluent model builder (verb module)
//!
//! Builds a validated [`DatasetModel`] in code:
//!
//! ```ignore
//! let model = DatasetBuilder::new()
//!     .source(orders)
//!     .dimension("status", |d| {
//!         d.label("Order Status")
//!             .segment("open", |s| s.fix_dimension("open").narrow_where("closed_at IS NULL"))
//!             .segment("closed", |s| s.extract_dimension("status").cast("sym"))
//!     })
//!     .measure("count", "count(*)")
//!     .build()?;
//! ```
//!
//! Misuse (an unknown cast name, a second source) is recorded where it
//! happens and reported by `build`.

use crate::error::ConfigError;
use crate::model::{
    Cast, DatasetModel, DimensionModel, LabelFn, MeasureModel, ModifierFn, NarrowFn, SegmentModel,
    Value, ValueSource, ValuesFn,
};
use crate::source::Source;

/// Builder for a [`DatasetModel`]
pub struct DatasetBuilder<S: Source> {
    source: Option<S>,
    dimensions: Vec<DimensionBuilder<S>>,
    measures: Vec<(String, String, Option<String>)>,
    error: Option<ConfigError>,
}

impl<S: Source> Default for DatasetBuilder<S> {
    fn default() -> Self {
        Self {
            source: None,
            dimensions: Vec::new(),
            measures: Vec::new(),
            error: None,
        }
    }
}

impl<S: Source> DatasetBuilder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source every region query runs against. May only be set once.
    pub fn source(mut self, source: S) -> Self {
        if self.source.is_some() {
            self.record(ConfigError::DuplicateSource);
        } else {
            self.source = Some(source);
        }
        self
    }

    pub fn dimension(
        mut self,
        key: impl Into<String>,
        define: impl FnOnce(DimensionBuilder<S>) -> DimensionBuilder<S>,
    ) -> Self {
        self.dimensions.push(define(DimensionBuilder::new(key)));
        self
    }

    pub fn measure(mut self, key: impl Into<String>, expression: impl Into<String>) -> Self {
        self.measures.push((key.into(), expression.into(), None));
        self
    }

    /// Add a measure whose values are converted by the named cast
    pub fn measure_with_cast(
        mut self,
        key: impl Into<String>,
        expression: impl Into<String>,
        cast: &str,
    ) -> Self {
        self.measures
            .push((key.into(), expression.into(), Some(cast.to_string())));
        self
    }

    fn record(&mut self, error: ConfigError) {
        self.error.get_or_insert(error);
    }

    pub fn build(self) -> Result<DatasetModel<S>, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let source = self.source.ok_or(ConfigError::MissingSource)?;

        let dimensions = self
            .dimensions
            .into_iter()
            .map(DimensionBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        let measures = self
            .measures
            .into_iter()
            .map(|(key, expression, cast)| {
                let cast = cast.map(|name| name.parse::<Cast>()).transpose()?;
                MeasureModel::new(key, expression, cast)
            })
            .collect::<Result<Vec<_>, _>>()?;

        DatasetModel::new(source, dimensions, measures)
    }
}

/// Builder for one dimension and its ordered segments
pub struct DimensionBuilder<S: Source> {
    key: String,
    label: Option<String>,
    segments: Vec<SegmentBuilder<S>>,
}

impl<S: Source> DimensionBuilder<S> {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            segments: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a segment. Keys should be unique within the dimension.
    pub fn segment(
        mut self,
        key: impl Into<String>,
        define: impl FnOnce(SegmentBuilder<S>) -> SegmentBuilder<S>,
    ) -> Self {
        self.segments.push(define(SegmentBuilder::new(key)));
        self
    }

    fn build(self) -> Result<DimensionModel<S>, ConfigError> {
        let segments = self
            .segments
            .into_iter()
            .map(|s| s.build(&self.key))
            .collect::<Result<Vec<_>, _>>()?;
        DimensionModel::new(self.key, self.label, segments)
    }
}

/// Builder for one segment
pub struct SegmentBuilder<S: Source> {
    key: String,
    fixed: Option<Value>,
    extracted: Option<String>,
    narrow: Option<NarrowFn<S>>,
    values: Option<ValuesFn<S>>,
    label: Option<LabelFn>,
    cast: Option<Cast>,
    modifiers: Vec<(String, ModifierFn)>,
    error: Option<ConfigError>,
}

impl<S: Source> SegmentBuilder<S> {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fixed: None,
            extracted: None,
            narrow: None,
            values: None,
            label: None,
            cast: None,
            modifiers: Vec::new(),
            error: None,
        }
    }

    /// Every row of the segment takes this dimension value
    pub fn fix_dimension(mut self, value: impl Into<Value>) -> Self {
        self.fixed = Some(value.into());
        self
    }

    /// The dimension value is read with this select expression
    pub fn extract_dimension(mut self, expression: impl Into<String>) -> Self {
        self.extracted = Some(expression.into());
        self
    }

    pub fn narrow(mut self, narrow: impl Fn(&S) -> Result<S, S::Error> + 'static) -> Self {
        self.narrow = Some(Box::new(narrow));
        self
    }

    /// Narrow with a single predicate
    pub fn narrow_where(self, predicate: impl Into<String>) -> Self {
        let predicate = predicate.into();
        self.narrow(move |source: &S| source.narrow(&predicate))
    }

    /// Enumerate the segment's values instead of querying them
    pub fn values(mut self, values: impl Fn(&S) -> Result<Vec<Value>, S::Error> + 'static) -> Self {
        self.values = Some(Box::new(values));
        self
    }

    pub fn label(mut self, label: impl Fn(&Value) -> String + 'static) -> Self {
        self.label = Some(Box::new(label));
        self
    }

    /// Convert extracted values with a registered cast (`sym`, `int`, ...)
    pub fn cast(mut self, name: &str) -> Self {
        match name.parse() {
            Ok(cast) => self.cast = Some(cast),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Rewrite `measure`'s expression in every region this segment is part of
    pub fn modify(
        mut self,
        measure: impl Into<String>,
        modifier: impl Fn(&str) -> String + 'static,
    ) -> Self {
        self.modifiers.push((measure.into(), Box::new(modifier)));
        self
    }

    fn build(self, dimension_key: &str) -> Result<SegmentModel<S>, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let value_source = match (self.fixed, self.extracted) {
            (Some(value), None) => ValueSource::Fixed(value),
            (None, Some(expression)) => ValueSource::Extracted(expression),
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingValueSource { segment: self.key })
            }
            (None, None) => return Err(ConfigError::MissingValueSource { segment: self.key }),
        };

        let mut segment = SegmentModel::new(self.key, dimension_key, value_source)?;
        if let Some(narrow) = self.narrow {
            segment = segment.with_narrow(narrow);
        }
        if let Some(values) = self.values {
            segment = segment.with_values(values);
        }
        if let Some(label) = self.label {
            segment = segment.with_label(label);
        }
        if let Some(cast) = self.cast {
            segment = segment.with_cast(cast);
        }
        for (measure, modifier) in self.modifiers {
            segment = segment.with_modifier(measure, modifier);
        }
        Ok(segment)
    }
}
