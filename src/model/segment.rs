//! Segment models
//!
//! A segment is one sub-population of a dimension. Its dimension value is
//! either fixed or extracted from the source with an expression; it may
//! narrow the source, override how its values and labels are resolved, and
//! rewrite measure expressions inside the regions it takes part in.

use std::collections::HashMap;
use std::fmt;

use super::cast::{Cast, CastError};
use super::value::Value;
use crate::dataset::DimensionValue;
use crate::error::{ConfigError, ExecutionError};
use crate::source::{sql, Source};

/// Narrows a source to the rows of one segment
pub type NarrowFn<S> = Box<dyn Fn(&S) -> Result<S, <S as Source>::Error>>;
/// Enumerates the values of a segment from the un-narrowed source
pub type ValuesFn<S> = Box<dyn Fn(&S) -> Result<Vec<Value>, <S as Source>::Error>>;
/// Turns a dimension value into a display label
pub type LabelFn = Box<dyn Fn(&Value) -> String>;
/// Rewrites a measure's aggregate expression
pub type ModifierFn = Box<dyn Fn(&str) -> String>;

/// Where a segment's dimension value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// A constant value for every row of the segment
    Fixed(Value),
    /// A select expression evaluated against the source
    Extracted(String),
}

/// A segment of a dimension
pub struct SegmentModel<S: Source> {
    key: String,
    dimension_key: String,
    value_source: ValueSource,
    narrow: Option<NarrowFn<S>>,
    values: Option<ValuesFn<S>>,
    label: Option<LabelFn>,
    cast: Option<Cast>,
    measure_modifiers: HashMap<String, ModifierFn>,
}

/// Default label derivation: `"foo_bar baz"` becomes `"Foo Bar Baz"`
pub fn default_label(value: &Value) -> String {
    value
        .to_string()
        .replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl<S: Source> SegmentModel<S> {
    pub fn new(
        key: impl Into<String>,
        dimension_key: impl Into<String>,
        value_source: ValueSource,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let dimension_key = dimension_key.into();

        if key.trim().is_empty() {
            return Err(ConfigError::MissingKey { what: "segment" });
        }
        if dimension_key.trim().is_empty() {
            return Err(ConfigError::MissingDimension { segment: key });
        }
        match &value_source {
            ValueSource::Extracted(expr) if expr.trim().is_empty() => {
                return Err(ConfigError::BlankExtraction { segment: key });
            }
            ValueSource::Fixed(Value::Float(f)) if !f.0.is_finite() => {
                return Err(ConfigError::NonFiniteValue { segment: key });
            }
            _ => {}
        }

        Ok(Self {
            key,
            dimension_key,
            value_source,
            narrow: None,
            values: None,
            label: None,
            cast: None,
            measure_modifiers: HashMap::new(),
        })
    }

    pub fn with_narrow(mut self, narrow: impl Fn(&S) -> Result<S, S::Error> + 'static) -> Self {
        self.narrow = Some(Box::new(narrow));
        self
    }

    pub fn with_values(
        mut self,
        values: impl Fn(&S) -> Result<Vec<Value>, S::Error> + 'static,
    ) -> Self {
        self.values = Some(Box::new(values));
        self
    }

    pub fn with_label(mut self, label: impl Fn(&Value) -> String + 'static) -> Self {
        self.label = Some(Box::new(label));
        self
    }

    pub fn with_cast(mut self, cast: Cast) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn with_modifier(
        mut self,
        measure_key: impl Into<String>,
        modifier: impl Fn(&str) -> String + 'static,
    ) -> Self {
        self.measure_modifiers.insert(measure_key.into(), Box::new(modifier));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dimension_key(&self) -> &str {
        &self.dimension_key
    }

    pub fn value_source(&self) -> &ValueSource {
        &self.value_source
    }

    pub fn cast(&self) -> Option<Cast> {
        self.cast
    }

    /// Projection of this segment's dimension value, aliased to the dimension key
    pub fn resolve_select_expression(&self) -> String {
        match &self.value_source {
            ValueSource::Fixed(value) => sql::alias(&sql::quote_value(value), &self.dimension_key),
            ValueSource::Extracted(expr) => sql::alias(expr, &self.dimension_key),
        }
    }

    /// Restrict `source` to this segment, or return it unchanged
    pub fn narrow(&self, source: &S) -> Result<S, S::Error> {
        match &self.narrow {
            Some(narrow) => narrow(source),
            None => Ok(source.clone()),
        }
    }

    pub fn cast_value(&self, raw: Value) -> Result<Value, CastError> {
        match self.cast {
            Some(cast) => cast.apply(raw),
            None => Ok(raw),
        }
    }

    /// Apply this segment's modifier for `measure_key`, if any
    pub fn modify_measure(&self, measure_key: &str, expression: &str) -> String {
        match self.measure_modifiers.get(measure_key) {
            Some(modifier) => modifier(expression),
            None => expression.to_string(),
        }
    }

    /// Ordered raw values of this segment
    ///
    /// A fixed segment yields its value's string form. An extracted segment
    /// uses its enumerator against the un-narrowed source when one is set,
    /// otherwise it queries the distinct values of its select expression over
    /// the narrowed source and casts them.
    pub fn resolve_values(&self, source: &S) -> Result<Vec<Value>, ExecutionError<S::Error>> {
        if let ValueSource::Fixed(value) = &self.value_source {
            return Ok(vec![Value::Text(value.to_string())]);
        }
        if let Some(values) = &self.values {
            return values(source).map_err(ExecutionError::Source);
        }

        let narrowed = self.narrow(source).map_err(ExecutionError::Source)?;
        let rows = narrowed
            .select_distinct(&self.resolve_select_expression())
            .map_err(ExecutionError::Source)?;

        rows.iter()
            .map(|row| {
                let raw = row.get(&self.dimension_key).cloned().ok_or_else(|| {
                    ExecutionError::MissingColumn {
                        column: self.dimension_key.clone(),
                    }
                })?;
                self.cast_value(raw).map_err(|source| ExecutionError::Cast {
                    column: self.dimension_key.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn label_for(&self, value: &Value) -> String {
        match &self.label {
            Some(label) => label(value),
            None => default_label(value),
        }
    }

    /// Map each value to its label
    pub fn resolve_labels(&self, values: &[Value]) -> HashMap<Value, String> {
        values
            .iter()
            .map(|value| (value.clone(), self.label_for(value)))
            .collect()
    }

    /// Resolved values paired with their labels, in value order
    pub fn dimension_values(
        &self,
        source: &S,
    ) -> Result<Vec<DimensionValue>, ExecutionError<S::Error>> {
        let values = self.resolve_values(source)?;
        let mut labels = self.resolve_labels(&values);
        Ok(values
            .into_iter()
            .map(|value| {
                let label = labels
                    .remove(&value)
                    .unwrap_or_else(|| self.label_for(&value));
                DimensionValue::new(&self.key, value, label)
            })
            .collect())
    }
}

impl<S: Source> fmt::Debug for SegmentModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modifiers: Vec<&str> = self.measure_modifiers.keys().map(String::as_str).collect();
        modifiers.sort_unstable();
        f.debug_struct("SegmentModel")
            .field("key", &self.key)
            .field("dimension_key", &self.dimension_key)
            .field("value_source", &self.value_source)
            .field("narrow", &self.narrow.is_some())
            .field("values", &self.values.is_some())
            .field("label", &self.label.is_some())
            .field("cast", &self.cast)
            .field("measure_modifiers", &modifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Row;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every statement it is asked to run and answers distinct
    /// selects with canned rows.
    #[derive(Clone, Default)]
    struct Recorder {
        narrowed: Vec<String>,
        log: Rc<RefCell<Vec<String>>>,
        rows: Vec<Row>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder failure")]
    struct Failure;

    impl Source for Recorder {
        type Error = Failure;

        fn narrow(&self, predicate: &str) -> Result<Self, Failure> {
            let mut next = self.clone();
            next.narrowed.push(predicate.to_string());
            Ok(next)
        }

        fn select_distinct(&self, select_expression: &str) -> Result<Vec<Row>, Failure> {
            self.log.borrow_mut().push(format!(
                "distinct {} where {:?}",
                select_expression, self.narrowed
            ));
            Ok(self.rows.clone())
        }

        fn select_and_group(&self, _: &[String], _: &[usize]) -> Result<Vec<Row>, Failure> {
            Err(Failure)
        }
    }

    fn fixed(value: impl Into<Value>) -> SegmentModel<Recorder> {
        SegmentModel::new("foo", "foodim", ValueSource::Fixed(value.into())).unwrap()
    }

    fn extracted(expr: &str) -> SegmentModel<Recorder> {
        SegmentModel::new("foo", "foodim", ValueSource::Extracted(expr.to_string())).unwrap()
    }

    #[test]
    fn test_validation() {
        let blank_key = SegmentModel::<Recorder>::new(" ", "d", ValueSource::Fixed(1.into()));
        assert_eq!(blank_key.unwrap_err(), ConfigError::MissingKey { what: "segment" });

        let no_dim = SegmentModel::<Recorder>::new("s", "", ValueSource::Fixed(1.into()));
        assert!(matches!(no_dim.unwrap_err(), ConfigError::MissingDimension { .. }));

        let blank_expr =
            SegmentModel::<Recorder>::new("s", "d", ValueSource::Extracted("  ".into()));
        assert!(matches!(blank_expr.unwrap_err(), ConfigError::BlankExtraction { .. }));

        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = SegmentModel::<Recorder>::new("s", "d", ValueSource::Fixed(bad.into()));
            assert_eq!(err.unwrap_err(), ConfigError::NonFiniteValue { segment: "s".into() });
        }
    }

    #[test]
    fn test_narrow() {
        let src = Recorder::default();
        let plain = fixed("foofoo");
        assert!(plain.narrow(&src).unwrap().narrowed.is_empty());

        let narrowing = fixed("foofoo").with_narrow(|s: &Recorder| s.narrow("a = 1"));
        assert_eq!(narrowing.narrow(&src).unwrap().narrowed, vec!["a = 1"]);
    }

    #[test]
    fn test_cast_value() {
        assert_eq!(fixed("x").cast_value("100".into()).unwrap(), Value::from("100"));
        let cast = fixed("x").with_cast(Cast::Int);
        assert_eq!(cast.cast_value("100".into()).unwrap(), Value::Int(100));
    }

    #[test]
    fn test_modify_measure() {
        let seg = fixed("x").with_modifier("foo", |e| format!("{}/12", e));
        assert_eq!(seg.modify_measure("foo", "count(*)"), "count(*)/12");
        assert_eq!(seg.modify_measure("bar", "count(*)"), "count(*)");
        assert_eq!(fixed("x").modify_measure("foo", "count(*)"), "count(*)");
    }

    #[test]
    fn test_resolve_select_expression() {
        assert_eq!(fixed("foofoo").resolve_select_expression(), "'foofoo' as foodim");
        assert_eq!(fixed(3).resolve_select_expression(), "3 as foodim");
        assert_eq!(fixed(2.0).resolve_select_expression(), "2.0 as foodim");
        assert_eq!(extracted("foocol").resolve_select_expression(), "foocol as foodim");
    }

    #[test]
    fn test_fixed_values_ignore_source() {
        let src = Recorder {
            rows: vec![Row::new().with("foodim", "other")],
            ..Default::default()
        };
        let seg = fixed(Value::symbol("foofoo")).with_values(|_: &Recorder| Ok(vec![1.into()]));
        assert_eq!(seg.resolve_values(&src).unwrap(), vec![Value::from("foofoo")]);
        assert!(src.log.borrow().is_empty());
    }

    #[test]
    fn test_extracted_values_query_narrowed_source() {
        let src = Recorder {
            rows: vec![
                Row::new().with("foodim", "10"),
                Row::new().with("foodim", "20"),
            ],
            ..Default::default()
        };
        let seg = extracted("foocol")
            .with_cast(Cast::Int)
            .with_narrow(|s: &Recorder| s.narrow("x > 0"));

        assert_eq!(
            seg.resolve_values(&src).unwrap(),
            vec![Value::Int(10), Value::Int(20)]
        );
        assert_eq!(
            src.log.borrow().as_slice(),
            ["distinct foocol as foodim where [\"x > 0\"]"]
        );
    }

    #[test]
    fn test_extracted_values_use_enumerator_with_outer_source() {
        let src = Recorder::default();
        let seg = extracted("foocol")
            .with_narrow(|s: &Recorder| s.narrow("x > 0"))
            .with_values(|s: &Recorder| {
                assert!(s.narrowed.is_empty());
                Ok(vec![Value::from("b"), Value::from("a")])
            });
        assert_eq!(
            seg.resolve_values(&src).unwrap(),
            vec![Value::from("b"), Value::from("a")]
        );
        assert!(src.log.borrow().is_empty());
    }

    #[test]
    fn test_extracted_values_report_bad_casts() {
        let src = Recorder {
            rows: vec![Row::new().with("foodim", "ten")],
            ..Default::default()
        };
        let seg = extracted("foocol").with_cast(Cast::Int);
        let err = seg.resolve_values(&src).unwrap_err();
        assert!(matches!(err, ExecutionError::Cast { ref column, .. } if column == "foodim"));
    }

    #[test]
    fn test_default_labels() {
        let seg = fixed("x");
        let labels = seg.resolve_labels(&[
            Value::symbol("foo"),
            Value::symbol("foo_bar"),
            Value::from("foo_bar_baz"),
        ]);
        assert_eq!(labels[&Value::symbol("foo")], "Foo");
        assert_eq!(labels[&Value::symbol("foo_bar")], "Foo Bar");
        assert_eq!(labels[&Value::from("foo_bar_baz")], "Foo Bar Baz");
        assert_eq!(default_label(&Value::from("  mIXED  case_")), "Mixed Case");
    }

    #[test]
    fn test_label_function() {
        let seg = fixed("x").with_label(|v| v.to_string().to_uppercase());
        let labels = seg.resolve_labels(&[Value::symbol("foo")]);
        assert_eq!(labels[&Value::symbol("foo")], "FOO");
    }

    #[test]
    fn test_dimension_values() {
        let src = Recorder::default();
        let seg = extracted("foocol").with_values(|_: &Recorder| Ok(vec![1.into(), 2.into()]));
        let dvs = seg.dimension_values(&src).unwrap();
        assert_eq!(
            dvs.iter().map(|dv| dv.segment_key.as_str()).collect::<Vec<_>>(),
            vec!["foo", "foo"]
        );
        assert_eq!(
            dvs.iter().map(|dv| dv.value.clone()).collect::<Vec<_>>(),
            vec![Value::Int(1), Value::Int(2)]
        );
        assert_eq!(
            dvs.iter().map(|dv| dv.label.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );
    }
}
