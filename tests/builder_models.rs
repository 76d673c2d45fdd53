//! Models defined with the fluent builder, run against SQLite

mod common;

use common::orders_source;
use mdcube::{assignment, ConfigError, DatasetBuilder, ExecutionError, Value};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

#[test]
fn test_region_cardinality() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("a", |d| {
            d.segment("a0", |s| s.fix_dimension(0))
                .segment("a1", |s| s.fix_dimension(1))
        })
        .dimension("b", |d| {
            d.segment("b0", |s| s.fix_dimension(0))
                .segment("b1", |s| s.fix_dimension(1))
                .segment("b2", |s| s.fix_dimension(2))
        })
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let regions = model.region_indexes();
    assert_eq!(regions.len(), 6);
    let distinct: HashSet<Vec<usize>> = regions.iter().cloned().collect();
    let product: HashSet<Vec<usize>> = (0..2)
        .flat_map(|a| (0..3).map(move |b| vec![a, b]))
        .collect();
    assert_eq!(distinct, product);

    // one point per region: fixed segments group into a single row
    let dataset = model.resolve_dataset().unwrap();
    assert_eq!(dataset.len(), 6);
    let a1b2 = assignment([("a", 1), ("b", 2)]);
    assert_eq!(dataset.datapoint(&a1b2, "count"), Some(&Value::Int(5)));
}

#[test]
fn test_narrows_compose_across_dimensions() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("state", |d| {
            d.segment("closed", |s| s.fix_dimension("closed").narrow_where("closed_at IS NOT NULL"))
        })
        .dimension("size", |d| {
            d.segment("big", |s| s.fix_dimension("big").narrow_where("amount >= 100"))
                .segment("small", |s| s.fix_dimension("small").narrow_where("amount < 100"))
        })
        .measure("count", "count(*)")
        .measure_with_cast("total", "sum(amount)", "int")
        .build()
        .unwrap();

    let dataset = model.resolve_dataset().unwrap();
    let closed_big = assignment([("state", "closed"), ("size", "big")]);
    let closed_small = assignment([("state", "closed"), ("size", "small")]);
    assert_eq!(dataset.datapoint(&closed_big, "count"), Some(&Value::Int(1)));
    assert_eq!(dataset.datapoint(&closed_big, "total"), Some(&Value::Int(300)));
    assert_eq!(dataset.datapoint(&closed_small, "count"), Some(&Value::Int(2)));
    assert_eq!(dataset.datapoint(&closed_small, "total"), Some(&Value::Int(130)));
}

#[test]
fn test_modifiers_apply_only_inside_their_segment() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("period", |d| {
            d.segment("yearly", |s| s.fix_dimension("yearly"))
                .segment("monthly", |s| {
                    s.fix_dimension("monthly").modify("total", |e| format!("{} / 12.0", e))
                })
        })
        .measure_with_cast("total", "sum(amount)", "float")
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let dataset = model.resolve_dataset().unwrap();
    let yearly = assignment([("period", "yearly")]);
    let monthly = assignment([("period", "monthly")]);
    assert_eq!(dataset.datapoint(&yearly, "total"), Some(&Value::float(780.0)));
    assert_eq!(dataset.datapoint(&monthly, "total"), Some(&Value::float(65.0)));
    assert_eq!(dataset.datapoint(&monthly, "count"), Some(&Value::Int(5)));
}

#[test]
fn test_colliding_points_last_write_wins() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("bucket", |d| {
            d.segment("small", |s| s.fix_dimension("x").narrow_where("amount < 100"))
                .segment("big", |s| s.fix_dimension("x").narrow_where("amount >= 100"))
        })
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let dataset = model.resolve_dataset().unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.indexed_data().len(), 1);
    assert_eq!(dataset.collisions(), 1);

    // "big" is enumerated after "small", so its point wins the index
    let x = assignment([("bucket", "x")]);
    assert_eq!(dataset.datapoint(&x, "count"), Some(&Value::Int(3)));

    let counts: Vec<i64> = dataset.data().iter().map(|p| p["count"].as_i64().unwrap()).collect();
    assert_eq!(counts, vec![2, 3]);
}

#[test]
fn test_custom_values_and_labels() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("status", |d| {
            d.segment("any", |s| {
                s.extract_dimension("status")
                    .cast("sym")
                    .values(|_| {
                        Ok(vec![
                            Value::symbol("shipped"),
                            Value::symbol("pending"),
                            Value::symbol("lost"),
                        ])
                    })
                    .label(|v| format!("<{}>", v))
            })
        })
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let dataset = model.resolve_dataset().unwrap();
    let status = dataset.dimension("status").unwrap();
    assert_eq!(
        status.values(),
        vec![Value::symbol("shipped"), Value::symbol("pending"), Value::symbol("lost")]
    );
    assert_eq!(status.label_for(&Value::symbol("lost")), Some("<lost>"));

    let mut statuses: Vec<String> = dataset.data().iter().map(|p| p["status"].to_string()).collect();
    statuses.sort();
    assert_eq!(statuses, vec!["cancelled", "pending", "shipped"]);
    assert!(dataset.data().iter().all(|p| matches!(p["status"], Value::Symbol(_))));
}

#[test]
fn test_builder_errors() {
    let err = DatasetBuilder::new()
        .source(orders_source())
        .dimension("d", |d| d.segment("s", |s| s.fix_dimension(1)))
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::NoMeasures);
    assert_eq!(err.to_string(), "no measures!");

    let err = DatasetBuilder::new()
        .source(orders_source())
        .measure("count", "count(*)")
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::NoDimensions);
}

#[test]
fn test_source_errors_abort_the_run() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("d", |d| d.segment("s", |s| s.extract_dimension("missing_column")))
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let err = model.resolve_dataset().unwrap_err();
    assert!(matches!(err, ExecutionError::Source(rusqlite::Error::SqliteFailure(..))));
    assert!(err.to_string().contains("missing_column"));
}

#[test]
fn test_fixed_float_segments_key_their_points() {
    let model = DatasetBuilder::new()
        .source(orders_source())
        .dimension("rate", |d| {
            d.segment("standard", |s| s.fix_dimension(2.0))
                .segment("reduced", |s| s.fix_dimension(0.5).narrow_where("amount < 100"))
        })
        .measure("count", "count(*)")
        .build()
        .unwrap();

    let dataset = model.resolve_dataset().unwrap();
    let standard = assignment([("rate", 2.0)]);
    let reduced = assignment([("rate", 0.5)]);
    assert_eq!(dataset.datapoint(&standard, "count"), Some(&Value::Int(5)));
    assert_eq!(dataset.datapoint(&reduced, "count"), Some(&Value::Int(2)));
    assert_eq!(dataset.data()[0]["rate"], Value::float(2.0));
}

#[test]
fn test_non_finite_fixed_values_are_rejected() {
    let err = DatasetBuilder::new()
        .source(orders_source())
        .dimension("rate", |d| d.segment("unbounded", |s| s.fix_dimension(f64::INFINITY)))
        .measure("count", "count(*)")
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::NonFiniteValue { segment: "unbounded".into() });
}

#[test]
fn test_keys_differing_only_in_case_are_rejected() {
    let err = DatasetBuilder::new()
        .source(orders_source())
        .dimension("status", |d| d.segment("all", |s| s.extract_dimension("status")))
        .measure("Status", "count(*)")
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateKey("Status".into()));
}
