//! Numeric formatting for metric values

/// Format a float with the shortest digits that round-trip.
///
/// Plain decimal notation is used for decimal exponents in `-4..6`, otherwise
/// exponent notation with an explicit sign and at least two exponent digits
/// (`1e+06`, `2.5e-07`). Infinities render as `+Inf` / `-Inf`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return value.to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.234567e6"
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if (-4..6).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}
