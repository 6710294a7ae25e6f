//! IOPs from optically active constituents (OAC)
//!
//! Builds total absorption and backscattering spectra from phytoplankton
//! (chlorophyll), CDOM, non-algal particles and particle backscattering,
//! on top of the pure-water terms read from the [`SpectralCache`].

use crate::cache::SpectralCache;
use crate::error::{Result, SaberError};
use crate::iop::constants;
use log::debug;
use serde::Deserialize;

/// Constituent concentrations and optional spectral shapes.
///
/// Absent amplitudes contribute nothing; absent slopes fall back to the
/// defaults in [`constants`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Oac {
    /// Chlorophyll-a concentration [mg m^-3]
    pub chl: Option<f64>,
    /// CDOM absorption at 440 nm [m^-1]
    pub a_g_440: Option<f64>,
    /// NAP absorption at 440 nm [m^-1]
    pub a_nap_440: Option<f64>,
    /// Particle backscattering at 550 nm [m^-1]
    pub bb_p_550: Option<f64>,
    pub a_g_s_g: Option<f64>,
    pub a_g_s_d: Option<f64>,
    pub a_nap_s_d: Option<f64>,
    pub bb_p_gamma: Option<f64>,
}

impl Oac {
    /// Build from `(name, value)` pairs. The first occurrence of a name wins
    /// and unknown names are ignored.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut oac = Oac::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "chl" => &mut oac.chl,
                "a_g_440" => &mut oac.a_g_440,
                "a_nap_440" => &mut oac.a_nap_440,
                "bb_p_550" => &mut oac.bb_p_550,
                "a_g_s_g" => &mut oac.a_g_s_g,
                "a_g_s_d" => &mut oac.a_g_s_d,
                "a_nap_s_d" => &mut oac.a_nap_s_d,
                "bb_p_gamma" => &mut oac.bb_p_gamma,
                other => {
                    debug!("ignoring unknown constituent parameter '{other}'");
                    continue;
                }
            };
            slot.get_or_insert(value);
        }
        oac
    }

    /// Set a parameter by name, replacing any previous value.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let slot = match name {
            "chl" => &mut self.chl,
            "a_g_440" => &mut self.a_g_440,
            "a_nap_440" => &mut self.a_nap_440,
            "bb_p_550" => &mut self.bb_p_550,
            "a_g_s_g" => &mut self.a_g_s_g,
            "a_g_s_d" => &mut self.a_g_s_d,
            "a_nap_s_d" => &mut self.a_nap_s_d,
            "bb_p_gamma" => &mut self.bb_p_gamma,
            other => {
                return Err(SaberError::InvalidArgument(format!(
                    "unknown constituent parameter '{other}'"
                )));
            }
        };
        *slot = Some(value);
        Ok(())
    }

    // Either slope alone switches to the custom sum, a_g_s_g included.
    // The default applies only when both are absent.
    fn cdom_slope(&self) -> f64 {
        match (self.a_g_s_g, self.a_g_s_d) {
            (None, None) => constants::S_CDOM,
            (s_g, s_d) => s_g.unwrap_or(0.0) + s_d.unwrap_or(0.0),
        }
    }

    fn phytoplankton_absorption(&self, a0: f64, a1: f64) -> f64 {
        let Some(chl) = self.chl else {
            return 0.0;
        };
        let aph_440 = constants::APH_440_SCALE * chl.powf(constants::APH_440_EXPONENT);
        if aph_440 <= 0.0 || !aph_440.is_finite() {
            return 0.0;
        }
        ((a0 + a1 * aph_440.ln()) * aph_440).max(0.0)
    }
}

/// Total absorption and backscattering spectra [m^-1].
#[derive(Debug, Clone, PartialEq)]
pub struct Iops {
    pub a: Vec<f64>,
    pub bb: Vec<f64>,
}

/// Absorption and backscattering on `wavelengths` for the given constituents.
///
/// Refreshes the cache for `wavelengths` first, so repeated calls on the same
/// grid only pay for the per-band arithmetic.
pub fn iop_from_oac(cache: &mut SpectralCache, wavelengths: &[f64], oac: &Oac) -> Result<Iops> {
    cache.ensure_cache(wavelengths)?;

    let s_g = oac.cdom_slope();
    let s_nap = oac.a_nap_s_d.unwrap_or(constants::S_NAP);
    let gamma = oac.bb_p_gamma.unwrap_or(constants::GAMMA_BBP);

    let mut a = Vec::with_capacity(wavelengths.len());
    let mut bb = Vec::with_capacity(wavelengths.len());

    for (i, &wl) in wavelengths.iter().enumerate() {
        let a_phy = oac.phytoplankton_absorption(cache.a0()[i], cache.a1()[i]);

        let a_g = oac.a_g_440.map_or(0.0, |a_g_440| {
            a_g_440 * (-s_g * (wl - constants::LAMBDA_ABS_REF)).exp()
        });

        let a_nap = oac.a_nap_440.map_or(0.0, |a_nap_440| {
            a_nap_440 * (-s_nap * (wl - constants::LAMBDA_ABS_REF)).exp()
        });

        let bb_p = oac.bb_p_550.map_or(0.0, |bb_p_550| {
            bb_p_550 * (wl / constants::LAMBDA_BBP_REF).powf(-gamma)
        });

        a.push(cache.water_absorption()[i] + a_phy + a_g + a_nap);
        bb.push(cache.backscatter_water()[i] + bb_p);
    }

    Ok(Iops { a, bb })
}
