use thiserror::Error;

/// Typed failure conditions raised by the transformation layer.
///
/// These travel inside `anyhow::Error`; callers that need to react to a
/// specific condition can recover it with `err.downcast_ref::<Error>()`.
/// Host failures are never wrapped in this type, they propagate as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The selection query returned more than one data table (e.g. a dual-axis
    /// worksheet). Value-based matching is only defined for a single table.
    #[error("selection spans {0} data tables; only a single table is supported")]
    MultipleTables(usize),

    /// A color string could not be parsed.
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// The active marks specification index points past the end of the list.
    #[error("active marks specification {index} out of range ({len} specifications)")]
    MarksSpecificationOutOfRange { index: usize, len: usize },

    /// A fog background was already installed and a different one was requested.
    #[error("fog background already initialised to {0}")]
    FogAlreadyInitialised(String),
}
