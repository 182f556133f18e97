//! Millimetre and pixel coordinates.

const MM_PER_INCH: f64 = 25.4;

/// Millimetres to pixels at `dpi`
pub fn mm_to_px(value: f64, dpi: f64) -> f64 {
    value / MM_PER_INCH * dpi
}

/// Pixels to millimetres at `dpi`
pub fn px_to_mm(value: f64, dpi: f64) -> f64 {
    value / dpi * MM_PER_INCH
}

/// Pixels per centimetre to dots per inch
pub fn ppcm_to_dpi(value: f64) -> f64 {
    value / 10.0 * MM_PER_INCH
}
