//! Row extraction

use crate::dataset::Point;
use crate::error::ExecutionError;
use crate::model::{MeasureModel, SegmentModel};
use crate::source::{Row, Source};

/// Turn the rows of a region query into points
///
/// Each segment contributes its dimension-key column and each measure its
/// measure-key column, cast as configured.
pub fn extract<S: Source>(
    rows: &[Row],
    region: &[&SegmentModel<S>],
    measures: &[MeasureModel],
) -> Result<Vec<Point>, ExecutionError<S::Error>> {
    rows.iter()
        .map(|row| extract_row(row, region, measures))
        .collect()
}

fn extract_row<S: Source>(
    row: &Row,
    region: &[&SegmentModel<S>],
    measures: &[MeasureModel],
) -> Result<Point, ExecutionError<S::Error>> {
    let mut point = Point::new();

    for segment in region {
        let column = segment.dimension_key();
        let value = segment
            .cast_value(column_value(row, column)?)
            .map_err(|source| ExecutionError::Cast {
                column: column.to_string(),
                source,
            })?;
        point.insert(column.to_string(), value);
    }

    for measure in measures {
        let column = measure.key();
        let value = measure
            .cast_value(column_value(row, column)?)
            .map_err(|source| ExecutionError::Cast {
                column: column.to_string(),
                source,
            })?;
        point.insert(column.to_string(), value);
    }

    Ok(point)
}

fn column_value<E: std::error::Error>(
    row: &Row,
    column: &str,
) -> Result<crate::model::Value, ExecutionError<E>> {
    row.get(column)
        .cloned()
        .ok_or_else(|| ExecutionError::MissingColumn {
            column: column.to_string(),
        })
}
