//! Optical constants and default spectral shapes
//!
//! Defaults used when a constituent is given without its own slope or
//! exponent, plus the pure-water backscattering law.

/// Pure-water backscattering at the reference wavelength (m^-1)
/// Morel (1974) as used by Albert & Mobley (2003)
pub const BB_W_REF: f64 = 0.00111;

/// Reference wavelength for pure-water backscattering (nm)
pub const BB_W_LAMBDA_REF: f64 = 500.0;

/// Spectral exponent of pure-water backscattering
pub const BB_W_EXPONENT: f64 = -4.32;

/// Reference wavelength for CDOM and NAP absorption (nm)
pub const LAMBDA_ABS_REF: f64 = 440.0;

/// Reference wavelength for particle backscattering (nm)
pub const LAMBDA_BBP_REF: f64 = 550.0;

/// Default CDOM spectral slope (nm^-1)
pub const S_CDOM: f64 = 0.017;

/// Default NAP spectral slope (nm^-1)
pub const S_NAP: f64 = 0.0116;

/// Default particle backscattering exponent
pub const GAMMA_BBP: f64 = 0.46;

/// aph(440) = APH_440_SCALE * chl^APH_440_EXPONENT (Bricaud et al. 1995)
pub const APH_440_SCALE: f64 = 0.06;
pub const APH_440_EXPONENT: f64 = 0.65;

/// Pure-water backscattering (m^-1) at `wavelength` (nm).
pub fn backscatter_water(wavelength: f64) -> f64 {
    BB_W_REF * (wavelength / BB_W_LAMBDA_REF).powf(BB_W_EXPONENT)
}
