//! mdcube - Build indexed multi-dimensional datasets from SQL sources
//!
//! This library provides:
//! - Dataset model types (DatasetModel, DimensionModel, SegmentModel, MeasureModel)
//! - Model definition with a fluent builder or from YAML
//! - Region enumeration and per-region aggregate queries
//! - Row extraction and casting
//! - An indexed Dataset with labelled dimension values
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - definition concepts (Value, Cast, Segment, Dimension, Measure, DatasetModel)
//! - `dataset/` - resolved results (Dataset, Dimension, DimensionValue, Point)
//! - `source/` - the Source trait, SQL emission and the SQLite source
//!
//! **Verb modules** (transformations):
//! - `builder/` - fluent calls → DatasetModel
//! - `parser/` - YAML → DatasetDefinition → DatasetModel
//! - `planner/` - DatasetModel → regions → RegionQuery → Points
//!
//! # Example
//!
//! ```ignore
//! use mdcube::{parser, SqliteSource};
//!
//! let source = SqliteSource::new(Rc::new(Connection::open("orders.db")?), "orders");
//! let model = parser::parse_file("cube.yaml")?.into_model(source)?;
//! let dataset = model.resolve_dataset()?;
//! let count = dataset.datapoint(&assignment([("status", "open")]), "count");
//! ```

pub mod builder;
pub mod dataset;
pub mod error;
pub mod model;
pub mod parser;
pub mod planner;
pub mod source;

// Re-export commonly used types
pub use builder::{DatasetBuilder, DimensionBuilder, SegmentBuilder};
pub use dataset::{assignment, Assignment, Dataset, Dimension, DimensionSegment, DimensionValue, Point};
pub use error::{ConfigError, ExecutionError, ParseError};
pub use model::{Cast, CastError, DatasetModel, DimensionModel, MeasureModel, SegmentModel, Value, ValueSource};
pub use planner::RegionQuery;
pub use source::{Row, Source, SqliteSource};
