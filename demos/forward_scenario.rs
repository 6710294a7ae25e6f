use saber::bottom::r_rs_b_lmm;
use saber::cache::SpectralCache;
use saber::iop::{Oac, iop_from_oac};
use saber::model::{Geometry, ShallowBottom, WaterType, forward_am03};

fn print_vector(label: &str, values: &[f64]) {
    let formatted: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    println!("{label} = [{}]", formatted.join(", "));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let wl = [443.0, 490.0, 555.0];

    let mut cache = SpectralCache::new();
    cache.load_water_absorption(&wl, &[0.01, 0.02, 0.03])?;
    cache.load_slope_coefficients(&wl, &[0.06, 0.05, 0.04], &[0.01, 0.01, 0.01])?;

    // One block of wavelengths per class
    let r_b_matrix = [
        0.01, 0.02, 0.03, // sand
        0.03, 0.04, 0.05, // algae
    ];
    cache.load_bottom_reflectance(&wl, &["sand", "algae"], &r_b_matrix)?;
    cache.ensure_cache(&wl)?;

    let oac = Oac::from_pairs([("chl", 1.0), ("a_g_440", 0.1), ("bb_p_550", 0.01)]);
    let iops = iop_from_oac(&mut cache, &wl, &oac)?;
    print_vector("a", &iops.a);
    print_vector("bb", &iops.bb);

    let r_b = r_rs_b_lmm(&cache, &[("sand", 0.7), ("algae", 0.3)])?;
    print_vector("r_rs_b", &r_b);

    let geometry = Geometry {
        theta_sun: 20.0,
        theta_view: 0.0,
    };
    let rrs = forward_am03(
        &iops.a,
        &iops.bb,
        WaterType::Type2,
        geometry,
        Some(ShallowBottom {
            depth: 5.0,
            r_b: &r_b,
        }),
    )?;
    print_vector("Rrs", &rrs);

    Ok(())
}
