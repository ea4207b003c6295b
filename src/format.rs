//! Display formatting shared by every panel.
//!
//! Fixed-point output rounds exact ties away from zero, so `7.25` at one
//! decimal is `7.3` where `format!("{:.1}")` would give `7.2`.

use serde_json::Value;

pub const MISSING: &str = "N/A";

const EXACT_DIGITS: usize = 25;

/// Formats `value` with exactly `decimals` fraction digits.
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let expanded = format!("{:.*}", decimals + EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .map(|b| b - b'0')
        .collect();
    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .is_some_and(|next| *next >= b'5');

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() && digits.iter().any(|d| *d != 0) {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| char::from(b'0' + d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    }
    out
}

fn group_thousands(int_digits: &str) -> String {
    let mut out = String::with_capacity(int_digits.len() + int_digits.len() / 3);
    for (idx, ch) in int_digits.chars().enumerate() {
        if idx > 0 && (int_digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Locale-style number: thousands separators, at most three fraction
/// digits, trailing zeros dropped.
pub fn number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = fixed(value, 3);
    let (sign, unsigned) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = format!("{sign}{}", group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Share of `part` in `total` with one decimal; an empty total is `0.0%`.
pub fn percent_of(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{}%", fixed(part as f64 / total as f64 * 100.0, 1))
}

pub fn percent(value: f64) -> String {
    format!("{}%", fixed(value, 1))
}

/// Renders one sample-data cell.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => number(v),
            None => n.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_rounds_ties_up() {
        assert_eq!(fixed(7.25, 1), "7.3");
        assert_eq!(fixed(3.456, 2), "3.46");
        assert_eq!(fixed(12.0, 1), "12.0");
        assert_eq!(fixed(3.1, 2), "3.10");
        assert_eq!(fixed(9.96, 1), "10.0");
        assert_eq!(fixed(0.0, 2), "0.00");
        assert_eq!(fixed(2.5, 0), "3");
    }

    #[test]
    fn fixed_keeps_binary_truth() {
        // 1.005 is stored just below the tie.
        assert_eq!(fixed(1.005, 2), "1.00");
    }

    #[test]
    fn fixed_handles_negatives() {
        assert_eq!(fixed(-1.25, 1), "-1.3");
        assert_eq!(fixed(-0.001, 1), "0.0");
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(count(0), "0");
        assert_eq!(count(999), "999");
        assert_eq!(count(2392), "2,392");
        assert_eq!(count(1234567), "1,234,567");
    }

    #[test]
    fn numbers_look_like_locale_output() {
        assert_eq!(number(2392.0), "2,392");
        assert_eq!(number(3.1415), "3.142");
        assert_eq!(number(1234.5), "1,234.5");
        assert_eq!(number(-9876.25), "-9,876.25");
        assert_eq!(number(0.0), "0");
    }

    #[test]
    fn percentages() {
        assert_eq!(percent_of(20, 30), "66.7%");
        assert_eq!(percent_of(0, 0), "0.0%");
        assert_eq!(percent_of(5, 0), "0.0%");
        assert_eq!(percent(42.3), "42.3%");
    }

    #[test]
    fn cells_fall_back_to_na() {
        let row = json!({"Age": 17, "GPA": 2.929196, "Name": "Ada", "Tutoring": null, "Flag": true});
        assert_eq!(cell(row.get("Age")), "17");
        assert_eq!(cell(row.get("GPA")), "2.929");
        assert_eq!(cell(row.get("Name")), "Ada");
        assert_eq!(cell(row.get("Tutoring")), "N/A");
        assert_eq!(cell(row.get("Missing")), "N/A");
        assert_eq!(cell(row.get("Flag")), "true");
    }
}
