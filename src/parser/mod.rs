//! Definition parser (verb module)
//!
//! Transforms YAML files into dataset definitions, which build models.

mod definition;

use std::path::Path;

use crate::error::ParseError;
use crate::model::DatasetModel;
use crate::source::Source;

pub use definition::{
    DatasetDefinition, DimensionDefinition, LiteralValue, MeasureDefinition, SegmentDefinition,
};

/// Parse a dataset definition from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DatasetDefinition, ParseError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })?;
    parse_str(&contents)
}

/// Parse a dataset definition from a YAML string
pub fn parse_str(yaml: &str) -> Result<DatasetDefinition, ParseError> {
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}

/// Parse a YAML definition and build its model over `source`
pub fn parse_model<S: Source>(yaml: &str, source: S) -> Result<DatasetModel<S>, ParseError> {
    Ok(parse_str(yaml)?.into_model(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::model::{Cast, Value, ValueSource};
    use crate::source::SqliteSource;
    use rusqlite::Connection;
    use std::rc::Rc;

    fn source() -> SqliteSource {
        SqliteSource::new(Rc::new(Connection::open_in_memory().unwrap()), "orders")
    }

    #[test]
    fn test_parse_orders() {
        let def = parse_file("tests/test_data/orders.yaml").unwrap();
        assert_eq!(def.source.as_deref(), Some("orders"));
        assert_eq!(def.dimensions.len(), 2);
        assert_eq!(def.measures.len(), 2);

        let status = &def.dimensions[0];
        assert_eq!(status.key, "status");
        assert_eq!(status.label.as_deref(), Some("Order Status"));
        assert_eq!(status.segments[0].fix, Some(LiteralValue::String("open".into())));
        assert_eq!(status.segments[0].where_clause.as_deref(), Some("closed_at IS NULL"));
        assert_eq!(status.segments[1].extract.as_deref(), Some("status"));
        assert_eq!(status.segments[1].labels["shipped"], "Sent");
        assert_eq!(status.segments[1].modify["revenue"], "{expr} * 1.0");
    }

    #[test]
    fn test_into_model() {
        let model = parse_file("tests/test_data/orders.yaml")
            .unwrap()
            .into_model(source())
            .unwrap();

        let status = model.dimension("status").unwrap();
        assert_eq!(status.label(), Some("Order Status"));

        let open = status.segment("open").unwrap();
        assert_eq!(open.value_source(), &ValueSource::Fixed(Value::from("open")));
        assert_eq!(open.narrow(model.source()).unwrap().predicates(), ["closed_at IS NULL"]);

        let closed = status.segment("closed").unwrap();
        assert_eq!(closed.cast(), Some(Cast::Sym));
        assert_eq!(
            closed.resolve_values(model.source()).unwrap(),
            vec![Value::symbol("shipped"), Value::symbol("cancelled")]
        );
        assert_eq!(closed.label_for(&Value::symbol("shipped")), "Sent");
        assert_eq!(closed.label_for(&Value::symbol("cancelled")), "Cancelled");
        assert_eq!(closed.modify_measure("revenue", "sum(amount)"), "sum(amount) * 1.0");
        assert_eq!(closed.modify_measure("count", "count(*)"), "count(*)");

        assert_eq!(model.measure("revenue").unwrap().cast(), Some(Cast::Float));
    }

    #[test]
    fn test_parse_model() {
        let yaml = r#"
dimensions:
  - key: year
    segments:
      - key: all
        extract: "strftime('%Y', created_at)"
        cast: int
        values: ["2020", 2021]
measures:
  - key: count
    expression: count(*)
"#;
        let model = parse_model(yaml, source()).unwrap();
        let all = model.dimension("year").unwrap().segment("all").unwrap();
        assert_eq!(
            all.resolve_values(model.source()).unwrap(),
            vec![Value::Int(2020), Value::Int(2021)]
        );
    }

    #[test]
    fn test_invalid_definitions() {
        let unknown_cast = r#"
dimensions:
  - key: d
    segments:
      - key: s
        extract: x
        cast: decimal
measures:
  - key: count
    expression: count(*)
"#;
        let err = parse_model(unknown_cast, source()).unwrap_err();
        assert!(matches!(err, ParseError::Config(ConfigError::UnknownCast(ref c)) if c == "decimal"));

        let both = r#"
dimensions:
  - key: d
    segments:
      - key: s
        fix: 1
        extract: x
measures:
  - key: count
    expression: count(*)
"#;
        let err = parse_model(both, source()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Config(ConfigError::ConflictingValueSource { .. })
        ));

        let bad_value = r#"
dimensions:
  - key: d
    segments:
      - key: s
        extract: x
        cast: int
        values: [one]
measures:
  - key: count
    expression: count(*)
"#;
        let err = parse_model(bad_value, source()).unwrap_err();
        assert!(matches!(err, ParseError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_yaml_and_io_errors() {
        assert!(matches!(parse_str("dimensions: ["), Err(ParseError::Yaml(_))));
        assert!(matches!(parse_str("measures: []"), Err(ParseError::Yaml(_))));

        let err = parse_file("tests/test_data/does_not_exist.yaml").unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
        assert!(err.to_string().contains("does_not_exist.yaml"));
    }
}
