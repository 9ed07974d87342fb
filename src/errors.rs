use thiserror::Error;

/// A result type for trust region sampling
pub type Result<T> = std::result::Result<T, SamplingError>;

/// An error when sampling a trust region
#[derive(Error, Debug)]
pub enum SamplingError {
    /// When a caller given argument is invalid (radius, number of points, criterion name...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// When more recycled points than requested points have to be kept
    #[error("Capacity error: {recycled} recycled points exceed the {n_points} requested points")]
    Capacity {
        /// Number of points to be recycled
        recycled: usize,
        /// Requested size of the design
        n_points: usize,
    },
    /// When a point lies outside the trust region
    #[error("Domain error: {0}")]
    Domain(String),
}
