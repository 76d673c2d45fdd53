//! SQL emitter
//!
//! Renders the statements a SQL-backed source runs: distinct selects for
//! dimension values and grouped selects for region queries.

use crate::model::Value;

/// A single-relation SELECT statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    /// Relation to read: a table name or a parenthesized subquery
    pub from: String,
    /// Conjunctive WHERE predicates
    pub predicates: Vec<String>,
    /// Select list, already aliased
    pub expressions: Vec<String>,
    /// 1-based positional GROUP BY
    pub group_by: Vec<usize>,
    pub distinct: bool,
}

impl Select {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Default::default()
        }
    }

    pub fn with_predicates(mut self, predicates: Vec<String>) -> Self {
        self.predicates = predicates;
        self
    }

    pub fn with_expressions(mut self, expressions: Vec<String>) -> Self {
        self.expressions = expressions;
        self
    }

    pub fn with_group_by(mut self, positions: Vec<usize>) -> Self {
        self.group_by = positions;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

/// Emit a single-line SQL string for a SELECT statement
pub fn emit_sql(select: &Select) -> String {
    let mut sql = String::from("SELECT ");
    if select.distinct {
        sql.push_str("DISTINCT ");
    }
    if select.expressions.is_empty() {
        sql.push('*');
    } else {
        sql.push_str(&select.expressions.join(", "));
    }
    sql.push_str(" FROM ");
    sql.push_str(&select.from);

    if let Some(predicate) = emit_predicates(&select.predicates) {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate);
    }

    if !select.group_by.is_empty() {
        let positions: Vec<String> = select.group_by.iter().map(|p| p.to_string()).collect();
        sql.push_str(" GROUP BY ");
        sql.push_str(&positions.join(", "));
    }
    sql
}

fn emit_predicates(predicates: &[String]) -> Option<String> {
    match predicates {
        [] => None,
        [single] => Some(single.clone()),
        many => {
            let parts: Vec<String> = many.iter().map(|p| format!("({})", p)).collect();
            Some(parts.join(" AND "))
        }
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// Quote a value as a SQL literal
///
/// Floats always carry a decimal point or exponent so the engine reads them
/// back as reals. Non-finite floats have no literal and become `NULL`.
pub fn quote_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.0.is_finite() => format!("{:?}", f.0),
        Value::Float(_) => "NULL".to_string(),
        other => quote_str(&other.to_string()),
    }
}

fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Alias an expression: `expr as alias`
pub fn alias(expression: &str, alias: &str) -> String {
    format!("{} as {}", expression, alias)
}
