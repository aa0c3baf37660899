//! Display formatting for metric values.
//!
//! Both formatters accept `Option<f64>` so absent payload fields and non-finite values
//! collapse to the same placeholder.

/// Shown wherever a value is missing or not a finite number.
pub const PLACEHOLDER: &str = "—";

/// Formats `value` as en-US dollars, e.g. `$1,234.50` or `-$12.00`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    format_usd(v)
}

/// Rounds to at most three decimals, half away from zero, without trailing zeros.
pub fn format_number(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let scaled = ((v + f64::EPSILON) * 1000.0).round() / 1000.0;
    // Values this large carry no fractional digits.
    let rounded = if scaled.is_finite() { scaled } else { v };
    if rounded == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    rounded.to_string()
}

fn format_usd(v: f64) -> String {
    let abs = v.abs();
    // `{:.2}` works on the exact decimal expansion but breaks ties to even. A tie at the
    // cent is only possible for fractions that are odd multiples of 1/8.
    let eighths = abs.fract() * 8.0;
    let fixed = if eighths.fract() == 0.0 && eighths as u8 % 2 == 1 {
        let exact = format!("{abs:.3}");
        increment_last_digit(&exact[..exact.len() - 1])
    } else {
        format!("{abs:.2}")
    };

    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if v < 0.0 && !is_zero { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Adds one unit in the last place of a plain decimal string, carrying as needed.
fn increment_last_digit(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
