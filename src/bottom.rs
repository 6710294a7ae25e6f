//! Linear mixture of cached bottom reflectance classes.

use crate::cache::SpectralCache;
use crate::error::{Result, SaberError};

/// Fraction-weighted sum of named bottom classes on the cached grid.
///
/// Fractions are normalised to sum to one. Class names are matched against
/// the classes of the current snapshot; with duplicate names the first match
/// is used.
pub fn r_rs_b_lmm<S: AsRef<str>>(cache: &SpectralCache, fractions: &[(S, f64)]) -> Result<Vec<f64>> {
    if !cache.is_valid() || cache.class_count() == 0 {
        return Err(SaberError::CacheNotBuilt);
    }

    let mut total = 0.0;
    for (name, fraction) in fractions {
        if fraction.is_nan() || *fraction < 0.0 {
            return Err(SaberError::InvalidFraction(format!(
                "fraction for '{}' is {fraction}",
                name.as_ref()
            )));
        }
        total += fraction;
    }
    if total <= 0.0 {
        return Err(SaberError::InvalidFraction(format!(
            "fractions sum to {total}"
        )));
    }

    let mut columns = Vec::with_capacity(fractions.len());
    for (name, fraction) in fractions {
        let name = name.as_ref();
        let class = cache
            .class_names()
            .iter()
            .position(|class| class == name)
            .ok_or_else(|| SaberError::ClassNotFound(name.to_string()))?;
        let column = cache
            .bottom_reflectance_column(class)
            .ok_or_else(|| SaberError::ClassNotFound(name.to_string()))?;
        columns.push((column, fraction / total));
    }

    let mut r_rs_b = vec![0.0; cache.grid_size()];
    for (column, weight) in columns {
        for (out, value) in r_rs_b.iter_mut().zip(column) {
            *out += weight * value;
        }
    }

    Ok(r_rs_b)
}
