use thiserror::Error;

/// Errors returned by the clustering core.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Input point set is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid hyperparameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// The hyperparameter search exhausted every candidate without finding a
    /// configuration whose cluster count lands in the target range.
    #[error(
        "no hyperparameter candidate produced a label maximum in {target_label_min}..={target_label_max}"
    )]
    NoViableParams {
        /// Lower bound of the requested label-max range.
        target_label_min: i32,
        /// Upper bound of the requested label-max range.
        target_label_max: i32,
    },
}

/// Result type used by the clustering core.
pub type Result<T> = std::result::Result<T, ClusterError>;
