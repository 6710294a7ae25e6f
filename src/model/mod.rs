//! Radiative transfer for optically shallow water.

pub mod am03;
pub mod snell;

pub use am03::{Geometry, ShallowBottom, WaterType, forward_am03, retrieve_r_rs_b_am03};
pub use snell::snell_law;
