//! Measure models

use serde::Serialize;

use super::cast::{Cast, CastError};
use super::segment::SegmentModel;
use super::value::Value;
use crate::error::ConfigError;
use crate::source::{sql, Source};

/// A named aggregate expression, e.g. `count(*)` or `sum(amount)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureModel {
    key: String,
    expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cast: Option<Cast>,
}

impl MeasureModel {
    pub fn new(
        key: impl Into<String>,
        expression: impl Into<String>,
        cast: Option<Cast>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let expression = expression.into();
        if key.trim().is_empty() {
            return Err(ConfigError::MissingKey { what: "measure" });
        }
        if expression.trim().is_empty() {
            return Err(ConfigError::BlankExpression { measure: key });
        }
        Ok(Self { key, expression, cast })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn cast(&self) -> Option<Cast> {
        self.cast
    }

    /// The aggregate expression as modified by a region, aliased to the key
    ///
    /// Every segment's modifier is folded over the expression in the order the
    /// segments are given.
    pub fn select_expression<S: Source>(&self, region: &[&SegmentModel<S>]) -> String {
        let modified = region
            .iter()
            .fold(self.expression.clone(), |expr, segment| {
                segment.modify_measure(&self.key, &expr)
            });
        sql::alias(&modified, &self.key)
    }

    pub fn cast_value(&self, raw: Value) -> Result<Value, CastError> {
        match self.cast {
            Some(cast) => cast.apply(raw),
            None => Ok(raw),
        }
    }
}
