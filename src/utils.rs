// Unit normalization for on-chain integer values

use ethers::types::U256;

use crate::error::{AppError, Result};

// Internal helper that validates a non-negative decimal integer and strips leading zeros.
fn canonical_digits(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Conversion("empty integer value".to_string()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Conversion(format!(
            "'{}' is not a non-negative integer",
            trimmed
        )));
    }
    let stripped = trimmed.trim_start_matches('0');
    Ok(if stripped.is_empty() { "0" } else { stripped })
}

/// Converts a smallest-denomination integer into a decimal display string.
///
/// Works on the digit string directly so values of any width, including
/// those beyond `2^256`, are scaled exactly. Trailing fractional zeros are
/// dropped (`2000000000000000000` with 18 decimals becomes `"2"`).
pub fn normalize(raw: &str, decimals: u32) -> Result<String> {
    let digits = canonical_digits(raw)?;
    let decimals = decimals as usize;
    if decimals == 0 || digits == "0" {
        return Ok(digits.to_string());
    }

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let padding = "0".repeat(decimals - digits.len());
        ("0".to_string(), format!("{}{}", padding, digits))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        Ok(int_part)
    } else {
        Ok(format!("{}.{}", int_part, frac_part))
    }
}

/// Same as [`normalize`] for a value decoded straight from a contract call.
pub fn normalize_u256(value: U256, decimals: u32) -> Result<String> {
    normalize(&u256_to_string(value), decimals)
}

/// Inverse of [`normalize`]: scales a decimal display string back to the
/// smallest denomination.
#[cfg(test)]
pub fn to_smallest_unit(display: &str, decimals: u32) -> Result<String> {
    let trimmed = display.trim();
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };
    if int_part.is_empty() {
        return Err(AppError::Conversion(format!(
            "'{}' has no integer part",
            trimmed
        )));
    }
    if frac_part.len() > decimals as usize {
        return Err(AppError::Conversion(format!(
            "'{}' has more than {} fractional digits",
            trimmed, decimals
        )));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Conversion(format!(
            "'{}' is not a non-negative decimal",
            trimmed
        )));
    }

    let padding = "0".repeat(decimals as usize - frac_part.len());
    let joined = format!("{}{}{}", int_part, frac_part, padding);
    canonical_digits(&joined).map(str::to_string)
}

/// Decimal string form of a raw contract integer, never routed through `f64`.
pub fn u256_to_string(value: U256) -> String {
    value.to_string()
}
