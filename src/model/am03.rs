//! Albert & Mobley (2003) shallow-water reflectance model
//!
//! Forward: subsurface remote-sensing reflectance from absorption,
//! backscattering, geometry and (optionally) bottom depth and reflectance.
//! Inverse: bottom reflectance from an observed reflectance spectrum.
//!
//! ## References
//!
//! - Albert, A., & Mobley, C. D. (2003). An analytical model for subsurface
//!   irradiance and remote sensing reflectance in deep and shallow case-2
//!   waters. *Optics Express*, 11(22), 2873-2890.

use crate::error::{Result, SaberError};
use crate::model::snell::snell_law;
use serde::Deserialize;

// Shallow-water amplitudes for the water column and bottom terms
const A_RS1: f64 = 1.1576;
const A_RS2: f64 = 1.0389;

/// Parameterisation selector of the AM03 model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum WaterType {
    /// Constant `f_rs = 0.095`, `k0 = 1.0395`
    Type1,
    /// Polynomial `f_rs` in the single-scattering albedo, `k0 = 1.0546`
    Type2,
}

impl WaterType {
    fn k0(self) -> f64 {
        match self {
            WaterType::Type1 => 1.0395,
            WaterType::Type2 => 1.0546,
        }
    }
}

impl TryFrom<u8> for WaterType {
    type Error = SaberError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(WaterType::Type1),
            2 => Ok(WaterType::Type2),
            other => Err(SaberError::InvalidArgument(format!(
                "water type must be 1 or 2, got {other}"
            ))),
        }
    }
}

/// Sun and view zenith angles in air (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Geometry {
    pub theta_sun: f64,
    pub theta_view: f64,
}

/// Bottom depth (m) and bottom reflectance per band for optically shallow water.
#[derive(Debug, Clone, Copy)]
pub struct ShallowBottom<'a> {
    pub depth: f64,
    pub r_b: &'a [f64],
}

/// Per-band quantities shared by the forward and inverse models.
struct Band {
    rrs_deep: f64,
    // exp(-H (Kd + kuW)) and exp(-H (Kd + kuB))
    column: f64,
    bottom: f64,
}

struct Angles {
    cos_sun: f64,
    cos_view: f64,
}

impl Angles {
    fn new(geometry: Geometry) -> Self {
        let (view_w, sun_w) = snell_law(geometry.theta_view, geometry.theta_sun);
        Self {
            cos_sun: sun_w.cos(),
            cos_view: view_w.cos(),
        }
    }
}

fn band(a: f64, bb: f64, water_type: WaterType, angles: &Angles, depth: f64) -> Option<Band> {
    let ext = a + bb;
    if ext == 0.0 {
        return None;
    }
    let omega_b = bb / ext;

    let f_rs = match water_type {
        WaterType::Type1 => 0.095,
        WaterType::Type2 => {
            0.0512
                * (1.0 + 4.6659 * omega_b - 7.8387 * omega_b.powi(2) + 5.4571 * omega_b.powi(3))
                * (1.0 + 0.1098 / angles.cos_sun)
                * (1.0 + 0.4021 / angles.cos_view)
        }
    };

    let kd = water_type.k0() * ext / angles.cos_sun;
    let ku_w = (ext / angles.cos_view)
        * (1.0 + omega_b).powf(3.5421)
        * (1.0 - 0.2786 / angles.cos_sun);
    let ku_b = (ext / angles.cos_view)
        * (1.0 + omega_b).powf(2.2658)
        * (1.0 - 0.0577 / angles.cos_sun);

    Some(Band {
        rrs_deep: f_rs * omega_b,
        column: (-depth * (kd + ku_w)).exp(),
        bottom: (-depth * (kd + ku_b)).exp(),
    })
}

fn check_lengths(expected: usize, found: usize, what: &str) -> Result<()> {
    if expected != found {
        return Err(SaberError::InvalidArgument(format!(
            "{what}: expected {expected} bands, got {found}"
        )));
    }
    Ok(())
}

fn check_depth(depth: f64) -> Result<()> {
    if depth.is_nan() || depth < 0.0 {
        return Err(SaberError::InvalidArgument(format!(
            "bottom depth must be non-negative, got {depth}"
        )));
    }
    Ok(())
}

/// Subsurface remote-sensing reflectance [sr^-1] for every band.
///
/// With `bottom = None` the water is treated as optically deep. Bands with
/// zero attenuation give zero reflectance.
pub fn forward_am03(
    a: &[f64],
    bb: &[f64],
    water_type: WaterType,
    geometry: Geometry,
    bottom: Option<ShallowBottom<'_>>,
) -> Result<Vec<f64>> {
    check_lengths(a.len(), bb.len(), "backscattering")?;
    if let Some(bottom) = &bottom {
        check_lengths(a.len(), bottom.r_b.len(), "bottom reflectance")?;
        check_depth(bottom.depth)?;
    }

    let angles = Angles::new(geometry);
    let depth = bottom.map_or(0.0, |b| b.depth);

    let rrs = a
        .iter()
        .zip(bb)
        .enumerate()
        .map(|(i, (&a, &bb))| {
            let Some(band) = band(a, bb, water_type, &angles, depth) else {
                return 0.0;
            };
            match &bottom {
                Some(bottom) => {
                    band.rrs_deep * (1.0 - A_RS1 * band.column)
                        + A_RS2 * bottom.r_b[i] * band.bottom
                }
                None => band.rrs_deep,
            }
        })
        .collect();

    Ok(rrs)
}

/// Bottom reflectance that reproduces `r_rs_obs` at `depth`.
///
/// Solves the shallow-water equation of [`forward_am03`] for the bottom term.
/// Bands with zero attenuation give zero.
pub fn retrieve_r_rs_b_am03(
    a: &[f64],
    bb: &[f64],
    r_rs_obs: &[f64],
    water_type: WaterType,
    geometry: Geometry,
    depth: f64,
) -> Result<Vec<f64>> {
    check_lengths(a.len(), bb.len(), "backscattering")?;
    check_lengths(a.len(), r_rs_obs.len(), "observed reflectance")?;
    check_depth(depth)?;

    let angles = Angles::new(geometry);

    let r_b = a
        .iter()
        .zip(bb)
        .zip(r_rs_obs)
        .map(|((&a, &bb), &obs)| match band(a, bb, water_type, &angles, depth) {
            Some(band) => {
                (obs - band.rrs_deep * (1.0 - A_RS1 * band.column)) / (A_RS2 * band.bottom)
            }
            None => 0.0,
        })
        .collect();

    Ok(r_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const A: [f64; 3] = [0.05, 0.06, 0.08];
    const BB: [f64; 3] = [0.005, 0.004, 0.003];
    const NADIR: Geometry = Geometry {
        theta_sun: 0.0,
        theta_view: 0.0,
    };

    #[test]
    fn test_water_type_from_integer() {
        assert_eq!(WaterType::try_from(1_u8), Ok(WaterType::Type1));
        assert_eq!(WaterType::try_from(2_u8), Ok(WaterType::Type2));
        assert!(WaterType::try_from(3_u8).is_err());
        assert_eq!(
            serde_json::from_str::<WaterType>("2").unwrap(),
            WaterType::Type2
        );
    }

    #[test]
    fn test_deep_type1_is_constant_times_albedo() {
        let rrs = forward_am03(&A, &BB, WaterType::Type1, NADIR, None).unwrap();
        for i in 0..3 {
            assert_relative_eq!(rrs[i], 0.095 * BB[i] / (A[i] + BB[i]), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_zero_attenuation_gives_zero() {
        let rrs = forward_am03(&[0.0, 0.05], &[0.0, 0.005], WaterType::Type2, NADIR, None).unwrap();
        assert_eq!(rrs[0], 0.0);
        assert!(rrs[1] > 0.0);
    }

    #[test]
    fn test_very_deep_bottom_converges_to_deep_water() {
        let r_b = [0.1, 0.1, 0.1];
        let deep = forward_am03(&A, &BB, WaterType::Type2, NADIR, None).unwrap();
        let shallow = forward_am03(
            &A,
            &BB,
            WaterType::Type2,
            NADIR,
            Some(ShallowBottom {
                depth: 1000.0,
                r_b: &r_b,
            }),
        )
        .unwrap();
        for (d, s) in deep.iter().zip(&shallow) {
            assert_relative_eq!(d, s, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_bright_bottom_raises_reflectance() {
        let geometry = Geometry {
            theta_sun: 20.0,
            theta_view: 0.0,
        };
        let dark = forward_am03(
            &A,
            &BB,
            WaterType::Type2,
            geometry,
            Some(ShallowBottom {
                depth: 2.0,
                r_b: &[0.0; 3],
            }),
        )
        .unwrap();
        let bright = forward_am03(
            &A,
            &BB,
            WaterType::Type2,
            geometry,
            Some(ShallowBottom {
                depth: 2.0,
                r_b: &[0.3; 3],
            }),
        )
        .unwrap();
        for (d, b) in dark.iter().zip(&bright) {
            assert!(b > d);
        }
    }

    #[test]
    fn test_inverse_recovers_bottom() {
        let geometry = Geometry {
            theta_sun: 30.0,
            theta_view: 10.0,
        };
        let r_b = [0.02, 0.05, 0.11];
        let rrs = forward_am03(
            &A,
            &BB,
            WaterType::Type2,
            geometry,
            Some(ShallowBottom {
                depth: 3.0,
                r_b: &r_b,
            }),
        )
        .unwrap();

        let retrieved =
            retrieve_r_rs_b_am03(&A, &BB, &rrs, WaterType::Type2, geometry, 3.0).unwrap();
        for (expected, got) in r_b.iter().zip(&retrieved) {
            assert_relative_eq!(expected, got, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_argument_errors() {
        assert!(forward_am03(&A, &BB[..2], WaterType::Type1, NADIR, None).is_err());
        assert!(
            forward_am03(
                &A,
                &BB,
                WaterType::Type1,
                NADIR,
                Some(ShallowBottom {
                    depth: -1.0,
                    r_b: &[0.1; 3],
                }),
            )
            .is_err()
        );
        assert!(
            forward_am03(
                &A,
                &BB,
                WaterType::Type1,
                NADIR,
                Some(ShallowBottom {
                    depth: 1.0,
                    r_b: &[0.1; 2],
                }),
            )
            .is_err()
        );
        assert!(retrieve_r_rs_b_am03(&A, &BB, &[0.0; 3], WaterType::Type1, NADIR, -0.5).is_err());
    }
}
