//! Spectral table cache
//!
//! [`SpectralCache`] owns the master tables and a snapshot of them resampled
//! onto the most recently requested wavelength grid. [`SpectralCache::ensure_cache`]
//! fingerprints the requested grid and only rebuilds the snapshot when the
//! grid (or a master table) changed since the last build.
//!
//! Accessors hand out slices borrowed from the snapshot. Rebuilding or
//! resetting needs `&mut self`, so no view can outlive the snapshot it was
//! taken from.

pub mod fingerprint;

pub use fingerprint::grid_fingerprint;

use crate::error::{Result, SaberError};
use crate::interp::{interpolate_matrix, interpolate_vector};
use crate::iop::constants::backscatter_water;
use crate::tables::{MasterTables, MemoryLimit};
use log::debug;

/// Outcome of [`SpectralCache::ensure_cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The snapshot already matched the grid
    Hit,
    /// The snapshot was rebuilt for the grid
    Rebuilt,
}

/// Master tables resampled onto one target grid.
#[derive(Debug, Default)]
struct CacheSnapshot {
    wavelengths: Vec<f64>,
    a_w: Vec<f64>,
    a0: Vec<f64>,
    a1: Vec<f64>,
    bb_w: Vec<f64>,
    r_rs_b: Vec<f64>,
    class_names: Vec<String>,
    // None until a build succeeds, and again after a failed one
    fingerprint: Option<u64>,
    generation: u64,
}

impl CacheSnapshot {
    fn matches(&self, wavelengths: &[f64], fingerprint: u64, generation: u64) -> bool {
        self.fingerprint == Some(fingerprint)
            && self.wavelengths.len() == wavelengths.len()
            && self.generation == generation
    }
}

#[derive(Debug, Default)]
pub struct SpectralCache {
    tables: MasterTables,
    snapshot: CacheSnapshot,
    rebuilds: u64,
}

impl SpectralCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose loads and rebuilds may each allocate at most `limit`.
    pub fn with_limit(limit: MemoryLimit) -> Self {
        Self {
            tables: MasterTables::with_limit(limit),
            ..Self::default()
        }
    }

    pub fn tables(&self) -> &MasterTables {
        &self.tables
    }

    pub fn set_limit(&mut self, limit: MemoryLimit) {
        self.tables.set_limit(limit);
    }

    pub fn load_water_absorption(&mut self, wavelengths: &[f64], values: &[f64]) -> Result<()> {
        self.tables.load_water_absorption(wavelengths, values)
    }

    pub fn load_slope_coefficients(
        &mut self,
        wavelengths: &[f64],
        a0: &[f64],
        a1: &[f64],
    ) -> Result<()> {
        self.tables.load_slope_coefficients(wavelengths, a0, a1)
    }

    pub fn load_bottom_reflectance<S: AsRef<str>>(
        &mut self,
        wavelengths: &[f64],
        class_names: &[S],
        matrix: &[f64],
    ) -> Result<()> {
        self.tables
            .load_bottom_reflectance(wavelengths, class_names, matrix)
    }

    /// Make sure the snapshot reflects `wavelengths`, rebuilding if needed.
    ///
    /// After an error the accessors must not be trusted until a later call
    /// succeeds.
    pub fn ensure_cache(&mut self, wavelengths: &[f64]) -> Result<CacheStatus> {
        let missing = self.tables.missing();
        if !missing.is_empty() {
            return Err(SaberError::TablesMissing(missing));
        }
        if wavelengths.is_empty() {
            return Err(SaberError::InvalidArgument(
                "target wavelength grid is empty".to_string(),
            ));
        }

        let fingerprint = grid_fingerprint(wavelengths);
        if self
            .snapshot
            .matches(wavelengths, fingerprint, self.tables.generation())
        {
            return Ok(CacheStatus::Hit);
        }

        self.build_cache(wavelengths)?;
        Ok(CacheStatus::Rebuilt)
    }

    /// Unconditionally resample every master table onto `wavelengths`.
    pub fn build_cache(&mut self, wavelengths: &[f64]) -> Result<()> {
        let (Some(water), Some(slopes), Some(bottom)) = (
            self.tables.water_absorption(),
            self.tables.slope_coefficients(),
            self.tables.bottom_reflectance(),
        ) else {
            return Err(SaberError::TablesMissing(self.tables.missing()));
        };

        let n = wavelengths.len();
        let n_classes = bottom.class_count();
        let matrix_len = n.checked_mul(n_classes).ok_or(SaberError::AllocationFailure(
            "sizing the bottom reflectance snapshot",
        ))?;

        let snapshot = &mut self.snapshot;
        snapshot.fingerprint = None;

        let mut reservation = self.tables.limit().reserve();
        reservation.resize(&mut snapshot.wavelengths, n, "resizing the wavelength grid")?;
        reservation.resize(&mut snapshot.a_w, n, "resizing water absorption")?;
        reservation.resize(&mut snapshot.a0, n, "resizing a0")?;
        reservation.resize(&mut snapshot.a1, n, "resizing a1")?;
        reservation.resize(&mut snapshot.bb_w, n, "resizing water backscattering")?;
        reservation.resize(
            &mut snapshot.r_rs_b,
            matrix_len,
            "resizing bottom reflectance",
        )?;

        let mut class_names = Vec::new();
        class_names
            .try_reserve_exact(n_classes)
            .map_err(|_| SaberError::AllocationFailure("copying class names"))?;
        for name in bottom.class_names() {
            class_names.push(reservation.copy_name(name, "copying class names")?);
        }
        snapshot.class_names = class_names;

        snapshot.wavelengths.copy_from_slice(wavelengths);
        interpolate_vector(
            water.wavelengths(),
            water.values(),
            wavelengths,
            &mut snapshot.a_w,
        );
        interpolate_vector(slopes.wavelengths(), slopes.a0(), wavelengths, &mut snapshot.a0);
        interpolate_vector(slopes.wavelengths(), slopes.a1(), wavelengths, &mut snapshot.a1);
        interpolate_matrix(
            bottom.wavelengths(),
            bottom.matrix(),
            wavelengths,
            n_classes,
            &mut snapshot.r_rs_b,
        );
        for (bb_w, &wl) in snapshot.bb_w.iter_mut().zip(wavelengths) {
            *bb_w = backscatter_water(wl);
        }

        snapshot.generation = self.tables.generation();
        snapshot.fingerprint = Some(grid_fingerprint(wavelengths));
        self.rebuilds += 1;

        debug!(
            "rebuilt spectral cache: {} wavelengths, {} bottom classes (rebuild #{})",
            n, n_classes, self.rebuilds
        );
        Ok(())
    }

    /// Drop every master table and snapshot buffer and zero all counters.
    ///
    /// The memory limit survives a reset.
    pub fn reset_tables(&mut self) {
        self.tables.clear();
        self.snapshot = CacheSnapshot::default();
        self.rebuilds = 0;
        debug!("spectral cache reset");
    }

    pub fn is_valid(&self) -> bool {
        self.snapshot.fingerprint.is_some()
    }

    pub fn fingerprint(&self) -> Option<u64> {
        self.snapshot.fingerprint
    }

    /// Number of full rebuilds since creation or the last reset.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.snapshot.wavelengths
    }

    pub fn water_absorption(&self) -> &[f64] {
        &self.snapshot.a_w
    }

    pub fn a0(&self) -> &[f64] {
        &self.snapshot.a0
    }

    pub fn a1(&self) -> &[f64] {
        &self.snapshot.a1
    }

    pub fn backscatter_water(&self) -> &[f64] {
        &self.snapshot.bb_w
    }

    /// Column-major `grid_size() x class_count()` bottom reflectance.
    pub fn bottom_reflectance_matrix(&self) -> &[f64] {
        &self.snapshot.r_rs_b
    }

    pub fn bottom_reflectance_column(&self, class: usize) -> Option<&[f64]> {
        let n = self.grid_size();
        self.snapshot.r_rs_b.get(class * n..(class + 1) * n)
    }

    pub fn class_names(&self) -> &[String] {
        &self.snapshot.class_names
    }

    pub fn grid_size(&self) -> usize {
        self.snapshot.wavelengths.len()
    }

    pub fn class_count(&self) -> usize {
        self.snapshot.class_names.len()
    }
}
