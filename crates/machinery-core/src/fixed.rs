use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Simulation scalars (wire resistance, component ratings) are stored in
/// fixed point so that two hosts loading the same catalog agree bit-for-bit.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for initialization and data loading.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
