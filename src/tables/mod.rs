//! Master table store
//!
//! Holds the three reference tables the spectral cache resamples from. Each
//! table keeps its own wavelength axis. A load builds the complete new table
//! first and only then replaces the stored one, so a failed load never leaves
//! a table half updated.
//!
//! Wavelength axes must be strictly ascending and class names should be
//! unique. Neither is checked here.

pub mod alloc;

pub use alloc::MemoryLimit;

use crate::error::{Result, SaberError};
use log::debug;

/// Pure-water absorption spectrum [m^-1].
#[derive(Debug, Clone, PartialEq)]
pub struct WaterAbsorption {
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

impl WaterAbsorption {
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

/// Phytoplankton absorption shape coefficients `a0`/`a1`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeCoefficients {
    wavelengths: Vec<f64>,
    a0: Vec<f64>,
    a1: Vec<f64>,
}

impl SlopeCoefficients {
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn a0(&self) -> &[f64] {
        &self.a0
    }

    pub fn a1(&self) -> &[f64] {
        &self.a1
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

/// Bottom reflectance per named class.
///
/// The matrix is column-major: class `j` occupies
/// `matrix[j * W..(j + 1) * W]` where `W` is the number of wavelengths.
#[derive(Debug, Clone, PartialEq)]
pub struct BottomReflectance {
    wavelengths: Vec<f64>,
    class_names: Vec<String>,
    matrix: Vec<f64>,
}

impl BottomReflectance {
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn matrix(&self) -> &[f64] {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.class_names.len()
    }

    pub fn column(&self, class: usize) -> Option<&[f64]> {
        let n = self.wavelengths.len();
        self.matrix.get(class * n..(class + 1) * n)
    }
}

/// Store owning the three master tables.
#[derive(Debug, Default)]
pub struct MasterTables {
    water: Option<WaterAbsorption>,
    slopes: Option<SlopeCoefficients>,
    bottom: Option<BottomReflectance>,
    limit: MemoryLimit,
    generation: u64,
}

impl MasterTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: MemoryLimit) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> MemoryLimit {
        self.limit
    }

    pub fn set_limit(&mut self, limit: MemoryLimit) {
        self.limit = limit;
    }

    /// Counter advanced by every successful load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn water_absorption(&self) -> Option<&WaterAbsorption> {
        self.water.as_ref()
    }

    pub fn slope_coefficients(&self) -> Option<&SlopeCoefficients> {
        self.slopes.as_ref()
    }

    pub fn bottom_reflectance(&self) -> Option<&BottomReflectance> {
        self.bottom.as_ref()
    }

    /// Names of the tables that have not been loaded yet.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.water.is_none() {
            missing.push("water absorption");
        }
        if self.slopes.is_none() {
            missing.push("a0/a1 coefficients");
        }
        if self.bottom.is_none() {
            missing.push("bottom reflectance");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.water.is_some() && self.slopes.is_some() && self.bottom.is_some()
    }

    pub fn load_water_absorption(&mut self, wavelengths: &[f64], values: &[f64]) -> Result<()> {
        check_axis("water absorption", wavelengths)?;
        check_parallel("water absorption values", wavelengths.len(), values.len())?;

        let mut reservation = self.limit.reserve();
        let table = WaterAbsorption {
            wavelengths: reservation.copy_values(wavelengths, "loading water absorption")?,
            values: reservation.copy_values(values, "loading water absorption")?,
        };

        debug!("loaded water absorption table ({} wavelengths)", table.len());
        self.water = Some(table);
        self.generation += 1;
        Ok(())
    }

    pub fn load_slope_coefficients(
        &mut self,
        wavelengths: &[f64],
        a0: &[f64],
        a1: &[f64],
    ) -> Result<()> {
        check_axis("a0/a1 coefficients", wavelengths)?;
        check_parallel("a0 values", wavelengths.len(), a0.len())?;
        check_parallel("a1 values", wavelengths.len(), a1.len())?;

        let mut reservation = self.limit.reserve();
        let table = SlopeCoefficients {
            wavelengths: reservation.copy_values(wavelengths, "loading a0/a1 coefficients")?,
            a0: reservation.copy_values(a0, "loading a0/a1 coefficients")?,
            a1: reservation.copy_values(a1, "loading a0/a1 coefficients")?,
        };

        debug!("loaded a0/a1 coefficient table ({} wavelengths)", table.len());
        self.slopes = Some(table);
        self.generation += 1;
        Ok(())
    }

    /// Load a bottom reflectance matrix (column-major, one block per class).
    ///
    /// Class names are copied into the store. If copying fails part way, the
    /// names copied so far are dropped and the previous table stays in place.
    pub fn load_bottom_reflectance<S: AsRef<str>>(
        &mut self,
        wavelengths: &[f64],
        class_names: &[S],
        matrix: &[f64],
    ) -> Result<()> {
        check_axis("bottom reflectance", wavelengths)?;
        if class_names.is_empty() {
            return Err(SaberError::InvalidArgument(
                "bottom reflectance needs at least one class".to_string(),
            ));
        }
        let expected = wavelengths
            .len()
            .checked_mul(class_names.len())
            .ok_or_else(|| {
                SaberError::InvalidArgument("bottom reflectance matrix too large".to_string())
            })?;
        check_parallel("bottom reflectance matrix", expected, matrix.len())?;

        let mut reservation = self.limit.reserve();
        let wavelengths = reservation.copy_values(wavelengths, "loading bottom reflectance")?;
        let matrix = reservation.copy_values(matrix, "loading bottom reflectance")?;

        let mut names = Vec::new();
        names
            .try_reserve_exact(class_names.len())
            .map_err(|_| SaberError::AllocationFailure("duplicating class names"))?;
        for name in class_names {
            names.push(reservation.copy_name(name.as_ref(), "duplicating class names")?);
        }

        let table = BottomReflectance {
            wavelengths,
            class_names: names,
            matrix,
        };

        debug!(
            "loaded bottom reflectance table ({} wavelengths, classes {:?})",
            table.len(),
            table.class_names
        );
        self.bottom = Some(table);
        self.generation += 1;
        Ok(())
    }

    /// Drop every table. The memory limit is kept.
    pub fn clear(&mut self) {
        self.water = None;
        self.slopes = None;
        self.bottom = None;
        self.generation = 0;
    }
}

fn check_axis(table: &str, wavelengths: &[f64]) -> Result<()> {
    if wavelengths.is_empty() {
        return Err(SaberError::InvalidArgument(format!(
            "{table} needs at least one wavelength"
        )));
    }
    Ok(())
}

fn check_parallel(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(SaberError::InvalidArgument(format!(
            "{what}: expected {expected} values, got {found}"
        )));
    }
    Ok(())
}
