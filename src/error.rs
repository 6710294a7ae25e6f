use thiserror::Error;

/// Errors raised by the table store, the spectral cache and the models that
/// read from it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SaberError {
    /// Empty input, or parallel slices with different lengths
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A buffer could not be reserved, or the memory limit was exceeded
    #[error("allocation failed while {0}")]
    AllocationFailure(&'static str),
    /// The cache was asked to build before every master table was loaded
    #[error("master tables not loaded: {}", .0.join(", "))]
    TablesMissing(Vec<&'static str>),
    /// A collaborator read the snapshot before any successful build
    #[error("spectral cache has not been built for any wavelength grid")]
    CacheNotBuilt,
    /// Bottom class name absent from the cached bottom reflectance table
    #[error("class name '{0}' not found in cached bottom reflectance")]
    ClassNotFound(String),
    /// Negative, NaN, or non-positive total mixture fractions
    #[error("invalid bottom fraction: {0}")]
    InvalidFraction(String),
}

pub type Result<T> = std::result::Result<T, SaberError>;
