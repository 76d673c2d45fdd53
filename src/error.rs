//! Error types for mdcube

use crate::model::CastError;

/// A dataset definition that cannot be turned into a model
///
/// Raised while the model is being constructed, before any query runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no source!")]
    MissingSource,
    #[error("source already set")]
    DuplicateSource,
    #[error("no dimensions!")]
    NoDimensions,
    #[error("no measures!")]
    NoMeasures,
    #[error("dimension '{dimension}' has no segments")]
    NoSegments { dimension: String },
    /// A required key is blank (`what` names the kind of object)
    #[error("{what} has no key")]
    MissingKey { what: &'static str },
    #[error("segment '{segment}' has no dimension")]
    MissingDimension { segment: String },
    #[error("segment '{segment}' belongs to dimension '{found}', not '{expected}'")]
    DimensionMismatch {
        segment: String,
        expected: String,
        found: String,
    },
    #[error("segment '{segment}': only one of fix_dimension and extract_dimension can be given")]
    ConflictingValueSource { segment: String },
    #[error("segment '{segment}': one of fix_dimension or extract_dimension must be given")]
    MissingValueSource { segment: String },
    #[error("segment '{segment}' has a blank extract expression")]
    BlankExtraction { segment: String },
    #[error("segment '{segment}' has a non-finite fixed value")]
    NonFiniteValue { segment: String },
    #[error("measure '{measure}' has a blank expression")]
    BlankExpression { measure: String },
    #[error("segment '{segment}': {source}")]
    InvalidValue {
        segment: String,
        #[source]
        source: CastError,
    },
    #[error("unknown cast: {0:?}")]
    UnknownCast(String),
    #[error("key '{0}' is used by more than one dimension or measure")]
    DuplicateKey(String),
}

/// A failure while running region queries
///
/// Errors raised by the source are carried unchanged: `Display` and
/// `source()` are the source error's own.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Source(E),
    #[error("column '{column}': {source}")]
    Cast {
        column: String,
        #[source]
        source: CastError,
    },
    #[error("query result has no column '{column}'")]
    MissingColumn { column: String },
    /// An index tuple passed to `run_region` that does not pick one existing
    /// segment from every dimension
    #[error("region {indexes:?} does not match the dimensions")]
    InvalidRegion { indexes: Vec<usize> },
}

/// Errors that can occur while loading a YAML dataset definition
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The definition parsed but does not describe a valid model
    #[error("Invalid definition: {0}")]
    Config(#[from] ConfigError),
}
