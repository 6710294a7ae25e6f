//! Reflectance computation for a scenario or a raster of pixels.
//!
//! [`ReflectanceModel`] keeps one [`SpectralCache`] for the whole run, so the
//! master tables are resampled once and every further pixel hits the cache.

pub mod batch_process;
pub mod pixel;

pub use batch_process::{BatchError, BatchOutput, BatchProcessor};
pub use pixel::PixelData;

use std::fmt;

use crate::bottom::r_rs_b_lmm;
use crate::cache::SpectralCache;
use crate::config::Config;
use crate::error::{Result, SaberError};
use crate::iop::{Iops, Oac, iop_from_oac};
use crate::model::{Geometry, ShallowBottom, WaterType, forward_am03};

#[derive(Debug)]
pub struct ReflectanceModel {
    cache: SpectralCache,
    wavelengths: Vec<f64>,
    water_type: WaterType,
    geometry: Geometry,
    r_b: Option<Vec<f64>>,
}

impl ReflectanceModel {
    /// Load the scenario tables, build the cache for its grid and mix the
    /// bottom reflectance once.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut cache = config.load_cache()?;
        cache.ensure_cache(config.wavelengths())?;

        let r_b = if config.bottom_fractions().is_empty() {
            None
        } else {
            Some(r_rs_b_lmm(&cache, config.bottom_fractions())?)
        };

        Ok(Self {
            cache,
            wavelengths: config.wavelengths().to_vec(),
            water_type: config.water_type(),
            geometry: config.geometry(),
            r_b,
        })
    }

    pub fn cache(&self) -> &SpectralCache {
        &self.cache
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Mixed bottom reflectance on the model grid, if a bottom was configured.
    pub fn bottom_reflectance(&self) -> Option<&[f64]> {
        self.r_b.as_deref()
    }

    pub fn iops(&mut self, oac: &Oac) -> Result<Iops> {
        iop_from_oac(&mut self.cache, &self.wavelengths, oac)
    }

    /// Remote-sensing reflectance for one set of constituents. `depth = None`
    /// treats the water as optically deep.
    pub fn reflectance(&mut self, oac: &Oac, depth: Option<f64>) -> Result<(Iops, Vec<f64>)> {
        let iops = self.iops(oac)?;

        let bottom = match (depth, self.r_b.as_deref()) {
            (Some(depth), Some(r_b)) => Some(ShallowBottom { depth, r_b }),
            (Some(_), None) => {
                return Err(SaberError::InvalidArgument(
                    "a bottom depth was given but no bottom classes were mixed".to_string(),
                ));
            }
            (None, _) => None,
        };

        let rrs = forward_am03(&iops.a, &iops.bb, self.water_type, self.geometry, bottom)?;
        Ok((iops, rrs))
    }
}

/// Spectra of a single scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    pub wavelengths: Vec<f64>,
    pub a: Vec<f64>,
    pub bb: Vec<f64>,
    pub r_b: Option<Vec<f64>>,
    pub rrs: Vec<f64>,
}

pub fn run_scenario(config: &Config) -> Result<ScenarioResult> {
    let mut model = ReflectanceModel::from_config(config)?;
    let (iops, rrs) = model.reflectance(config.constituents(), config.depth())?;

    Ok(ScenarioResult {
        wavelengths: model.wavelengths.clone(),
        a: iops.a,
        bb: iops.bb,
        r_b: model.r_b.clone(),
        rrs,
    })
}

fn write_vector(f: &mut fmt::Formatter<'_>, label: &str, values: &[f64]) -> fmt::Result {
    let formatted: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    writeln!(f, "{label} = [{}]", formatted.join(", "))
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted: Vec<String> = self.wavelengths.iter().map(|v| format!("{v}")).collect();
        writeln!(f, "wavelengths = [{}]", formatted.join(", "))?;
        write_vector(f, "a", &self.a)?;
        write_vector(f, "bb", &self.bb)?;
        if let Some(r_b) = &self.r_b {
            write_vector(f, "r_rs_b", r_b)?;
        }
        let formatted: Vec<String> = self.rrs.iter().map(|v| format!("{v:.6}")).collect();
        write!(f, "Rrs = [{}]", formatted.join(", "))
    }
}
