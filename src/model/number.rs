//! Decimal formatting for figures shown to users.

/// Format `value` with `digits` decimals, rounding exact ties away from zero.
///
/// `format!("{:.N}")` rounds ties to even, so `0.25` would print as `0.2`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    format!("{:.*}", digits, rounded)
}
