//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum Real2SimError {
    /// A range tuple with a non-positive number of points.
    #[error("Range ({min}, {max}, {num}) must have a positive number of points")]
    NonPositiveCount {
        /// Lower end of the range.
        min: f64,
        /// Upper end of the range.
        max: f64,
        /// Requested number of points.
        num: i64,
    },

    /// A list of range values with an unexpected length.
    #[error("Expected {expected} values for {name}, got {actual}")]
    RangeArity {
        /// Name of the parameter.
        name: String,
        /// Expected number of values.
        expected: usize,
        /// Number of values given.
        actual: usize,
    },

    /// Unknown policy model.
    #[error("Unknown policy model: {0} (expected one of rt1, octo-base, octo-small)")]
    UnknownPolicyModel(String),

    /// Unknown task family.
    #[error("Unknown task family: {0}")]
    UnknownTaskFamily(String),

    /// Malformed `key=value` environment build argument.
    #[error("Malformed build argument {0:?}: {1}")]
    KwargsSyntax(String, String),

    /// Unknown error policy of the sweep.
    #[error("Unknown episode error policy: {0} (expected abort or skip)")]
    UnknownErrorPolicy(String),
}
