//! Shallow-water remote-sensing reflectance after Albert & Mobley (2003).
//!
//! Master spectral tables (pure-water absorption, phytoplankton slope
//! coefficients, bottom reflectance) are loaded once into a
//! [`cache::SpectralCache`] and resampled onto the wavelength grid of a run.
//! The IOP, bottom-mixing and reflectance models read from that cache.

pub mod bottom;
pub mod cache;
pub mod config;
pub mod error;
pub mod interp;
pub mod iop;
pub mod model;
pub mod processing;
pub mod readers;
pub mod tables;

pub use error::{Result, SaberError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
