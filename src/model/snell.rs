/// Refractive index of air
pub const N_AIR: f64 = 1.0;

/// Refractive index of water
pub const N_WATER: f64 = 1.33;

/// Refract the view and sun zenith angles (degrees, in air) into water.
///
/// Returns `(view_w, sun_w)` in radians.
pub fn snell_law(theta_view_deg: f64, theta_sun_deg: f64) -> (f64, f64) {
    (refract(theta_view_deg), refract(theta_sun_deg))
}

fn refract(theta_deg: f64) -> f64 {
    ((N_AIR / N_WATER) * theta_deg.to_radians().sin()).asin()
}
