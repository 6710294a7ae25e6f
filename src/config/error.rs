use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("target wavelength grid is empty")]
    EmptyGrid,
    #[error("target wavelength grid must be finite and strictly ascending (index {0})")]
    UnsortedGrid(usize),
    #[error("table '{table}': {reason}")]
    TableShape { table: String, reason: String },
    #[error("depth must be non-negative, got {0}")]
    NegativeDepth(f64),
    #[error("a bottom depth requires bottom_fractions")]
    MissingBottom,
    #[error("unknown raster '{0}', expected a constituent name or 'depth'")]
    UnknownRaster(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
