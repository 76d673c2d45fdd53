//! SQLite-backed source

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::rc::Rc;

use super::sql::{emit_sql, Select};
use super::{Row, Source};
use crate::model::Value;

/// A view over one relation of a SQLite database
///
/// The relation is a table name or a parenthesized subquery with an alias.
/// Narrowing accumulates WHERE predicates; the connection is shared between
/// every view derived from the same root.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    conn: Rc<Connection>,
    from: String,
    predicates: Vec<String>,
}

impl SqliteSource {
    pub fn new(conn: Rc<Connection>, from: impl Into<String>) -> Self {
        Self {
            conn,
            from: from.into(),
            predicates: Vec::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// The statement `select_distinct` would run
    pub fn distinct_statement(&self, select_expression: &str) -> String {
        emit_sql(
            &Select::new(&self.from)
                .with_predicates(self.predicates.clone())
                .with_expressions(vec![select_expression.to_string()])
                .distinct(),
        )
    }

    /// The statement `select_and_group` would run
    pub fn grouped_statement(&self, select_expressions: &[String], group_by: &[usize]) -> String {
        emit_sql(
            &Select::new(&self.from)
                .with_predicates(self.predicates.clone())
                .with_expressions(select_expressions.to_vec())
                .with_group_by(group_by.to_vec()),
        )
    }

    fn query(&self, sql: &str) -> rusqlite::Result<Vec<Row>> {
        log::debug!("sqlite: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query_map([], |r| {
            let mut row = Row::new();
            for (i, name) in names.iter().enumerate() {
                row.push(name.clone(), value_from_sql(r.get_ref(i)?));
            }
            Ok(row)
        })?;
        rows.collect()
    }
}

fn value_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl Source for SqliteSource {
    type Error = rusqlite::Error;

    fn narrow(&self, predicate: &str) -> Result<Self, Self::Error> {
        let mut narrowed = self.clone();
        narrowed.predicates.push(predicate.to_string());
        Ok(narrowed)
    }

    fn select_distinct(&self, select_expression: &str) -> Result<Vec<Row>, Self::Error> {
        self.query(&self.distinct_statement(select_expression))
    }

    fn select_and_group(
        &self,
        select_expressions: &[String],
        group_by: &[usize],
    ) -> Result<Vec<Row>, Self::Error> {
        self.query(&self.grouped_statement(select_expressions, group_by))
    }
}
