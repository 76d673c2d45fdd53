//! Dataset models (noun module)
//!
//! The definition side of the engine: values and casts, segments grouped
//! into dimensions, measures, and the dataset model that ties them to a
//! source.

mod cast;
mod dataset;
mod dimension;
mod measure;
mod segment;
mod value;

pub use cast::{Cast, CastError};
pub use dataset::DatasetModel;
pub use dimension::DimensionModel;
pub use measure::MeasureModel;
pub use segment::{default_label, LabelFn, ModifierFn, NarrowFn, SegmentModel, ValueSource, ValuesFn};
pub use value::{Symbol, Value};
