/// 64-bit FNV-1a over the raw bytes of a wavelength grid.
///
/// Two grids with the same fingerprint are treated as the same grid.
pub fn grid_fingerprint(wavelengths: &[f64]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for wl in wavelengths {
        for byte in wl.to_ne_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}
