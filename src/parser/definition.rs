//! Declarative dataset definitions

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::builder::{DatasetBuilder, SegmentBuilder};
use crate::error::ConfigError;
use crate::model::{default_label, Cast, DatasetModel, Value};
use crate::source::Source;

/// A dataset as written in YAML
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Relation to query (a table name or parenthesized subquery), if the
    /// definition names one
    #[serde(default)]
    pub source: Option<String>,
    pub dimensions: Vec<DimensionDefinition>,
    pub measures: Vec<MeasureDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionDefinition {
    pub key: String,
    pub label: Option<String>,
    pub segments: Vec<SegmentDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentDefinition {
    pub key: String,
    /// Fixed dimension value
    pub fix: Option<LiteralValue>,
    /// Select expression for the dimension value
    pub extract: Option<String>,
    /// Predicate restricting the source to this segment
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    pub cast: Option<String>,
    /// Fixed enumeration of the segment's values
    pub values: Option<Vec<LiteralValue>>,
    /// Label overrides keyed by value
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Measure expression templates; `{expr}` stands for the measure's expression
    #[serde(default)]
    pub modify: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasureDefinition {
    pub key: String,
    pub expression: String,
    pub cast: Option<String>,
}

/// Scalar literals in definitions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<LiteralValue> for Value {
    fn from(literal: LiteralValue) -> Self {
        match literal {
            LiteralValue::Bool(b) => Value::Bool(b),
            LiteralValue::Int(i) => Value::Int(i),
            LiteralValue::Float(f) => Value::float(f),
            LiteralValue::String(s) => Value::Text(s),
        }
    }
}

impl DatasetDefinition {
    /// Build a validated model over `source`
    pub fn into_model<S: Source>(self, source: S) -> Result<DatasetModel<S>, ConfigError> {
        let mut builder = DatasetBuilder::new().source(source);

        for dimension in self.dimensions {
            let segments = dimension
                .segments
                .into_iter()
                .map(SegmentDefinition::into_builder_fn)
                .collect::<Result<Vec<_>, _>>()?;
            let label = dimension.label;

            builder = builder.dimension(dimension.key, move |mut d| {
                if let Some(label) = label {
                    d = d.label(label);
                }
                for (key, define) in segments {
                    d = d.segment(key, define);
                }
                d
            });
        }

        for measure in self.measures {
            builder = match measure.cast {
                Some(cast) => builder.measure_with_cast(measure.key, measure.expression, &cast),
                None => builder.measure(measure.key, measure.expression),
            };
        }

        builder.build()
    }
}

type DefineSegment<S> = Box<dyn FnOnce(SegmentBuilder<S>) -> SegmentBuilder<S>>;

impl SegmentDefinition {
    /// The segment key and a closure that configures its builder
    ///
    /// Listed values are converted with the segment's cast up front so they
    /// match the values extracted from the source.
    fn into_builder_fn<S: Source>(self) -> Result<(String, DefineSegment<S>), ConfigError> {
        let Self {
            key,
            fix,
            extract,
            where_clause,
            cast,
            values,
            labels,
            modify,
        } = self;

        let values = match values {
            Some(literals) => {
                let value_cast = cast.as_deref().map(str::parse::<Cast>).transpose()?;
                let values = literals
                    .into_iter()
                    .map(|literal| {
                        let value = Value::from(literal);
                        match value_cast {
                            Some(c) => c.apply(value),
                            None => Ok(value),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| ConfigError::InvalidValue {
                        segment: key.clone(),
                        source,
                    })?;
                Some(values)
            }
            None => None,
        };

        let define = move |mut s: SegmentBuilder<S>| {
            if let Some(value) = fix {
                s = s.fix_dimension(value);
            }
            if let Some(expression) = extract {
                s = s.extract_dimension(expression);
            }
            if let Some(predicate) = where_clause {
                s = s.narrow_where(predicate);
            }
            if let Some(cast) = cast {
                s = s.cast(&cast);
            }
            if let Some(values) = values {
                s = s.values(move |_: &S| Ok(values.clone()));
            }
            if !labels.is_empty() {
                s = s.label(move |value: &Value| {
                    labels
                        .get(&value.to_string())
                        .cloned()
                        .unwrap_or_else(|| default_label(value))
                });
            }
            for (measure, template) in modify {
                s = s.modify(measure, move |expr: &str| template.replace("{expr}", expr));
            }
            s
        };

        let define: DefineSegment<S> = Box::new(define);
        Ok((key, define))
    }
}
