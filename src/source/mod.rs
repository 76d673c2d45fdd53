//! Data sources (noun module)
//!
//! A source is a narrowable view over tabular data which can run two kinds of
//! statements: a distinct select over one expression and a grouped select.
//! The engine never looks inside a source beyond this trait.

mod row;
pub mod sql;
mod sqlite;

pub use row::Row;
pub use sqlite::SqliteSource;

/// A narrowable view over tabular data
///
/// Narrowing must compose: narrowing an already narrowed view restricts it
/// further. Implementations are cheap handles, so `Clone` is expected to be
/// inexpensive. Sources are owned handles, never borrowed views.
pub trait Source: Clone + 'static {
    type Error: std::error::Error + 'static;

    /// Return a view restricted by `predicate`
    fn narrow(&self, predicate: &str) -> Result<Self, Self::Error>;

    /// Distinct rows of one aliased select expression (`expr as alias`)
    fn select_distinct(&self, select_expression: &str) -> Result<Vec<Row>, Self::Error>;

    /// Aggregated rows, grouped by the 1-based positions of `group_by`
    ///
    /// Each returned row exposes fields named by the select aliases.
    fn select_and_group(
        &self,
        select_expressions: &[String],
        group_by: &[usize],
    ) -> Result<Vec<Row>, Self::Error>;
}
