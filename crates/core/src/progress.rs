//! Progress percentage handling.

/// Lowest accepted progress value.
pub const PROGRESS_MIN: u8 = 0;

/// Highest accepted progress value; also the value recorded on success.
pub const PROGRESS_MAX: u8 = 100;

/// Clamp a raw percentage reported by the worker into `0..=100`, rounding
/// fractional values.
///
/// Out-of-range input is never rejected. NaN maps to 0.
pub fn clamp_percent(raw: f64) -> u8 {
    if raw.is_nan() {
        return PROGRESS_MIN;
    }
    raw.round()
        .clamp(f64::from(PROGRESS_MIN), f64::from(PROGRESS_MAX)) as u8
}
