//! Shared test utilities for integration tests

#![allow(dead_code)]

use mdcube::parser::{self, DatasetDefinition};
use mdcube::{DatasetModel, Point, SqliteSource, Value};
use rusqlite::Connection;
use std::rc::Rc;

/// Orders with a lifecycle status, an amount and creation/close dates
pub const ORDERS: &str = "
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        status TEXT NOT NULL,
        amount INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        closed_at TEXT
    );
    INSERT INTO orders VALUES
        (1, 'pending',   100, '2020-01-05', NULL),
        (2, 'pending',   250, '2021-03-10', NULL),
        (3, 'shipped',   300, '2020-02-01', '2020-02-10'),
        (4, 'shipped',    50, '2021-05-05', '2021-05-07'),
        (5, 'cancelled',  80, '2021-06-01', '2021-06-02');
";

/// An in-memory database holding `schema`
pub fn database(schema: &str) -> Rc<Connection> {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(schema)
        .unwrap_or_else(|e| panic!("Failed to load schema: {}", e));
    Rc::new(conn)
}

/// A source over the `orders` table
pub fn orders_source() -> SqliteSource {
    SqliteSource::new(database(ORDERS), "orders")
}

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> DatasetDefinition {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// The orders fixture as a model over the orders table
pub fn orders_model() -> DatasetModel<SqliteSource> {
    load_fixture("orders.yaml")
        .into_model(orders_source())
        .unwrap_or_else(|e| panic!("Failed to build orders model: {}", e))
}

/// Build a point from `(key, value)` pairs
pub fn point<V: Into<Value>>(pairs: Vec<(&str, V)>) -> Point {
    mdcube::assignment(pairs)
}

/// Points in value order, for order-insensitive comparison
pub fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort();
    points
}
