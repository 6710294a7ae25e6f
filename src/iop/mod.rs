//! Inherent Optical Properties (IOP) module
//!
//! Absorption and backscattering of water and its optically active
//! constituents, resampled through the spectral cache.

pub mod constants;
pub mod oac;

pub use oac::{Iops, Oac, iop_from_oac};
