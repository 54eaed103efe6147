//! Amount normalization.
//!
//! Backend payloads carry money as JSON numbers or as text with spaces
//! for thousands and a comma for decimals. Everything funnels through
//! [`parse_amount`] so there is exactly one place that knows the rules.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};

use crate::types::RawAmount;

/// Strips whitespace (including the no-break spaces produced by ru-RU
/// formatting), turns a decimal comma into a dot and parses the rest.
pub fn parse_amount(value: &str) -> Option<BigDecimal> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    BigDecimal::from_str(&cleaned).ok()
}

/// Sign-preserving variant used for ledger entries, where a positive value
/// is income. Unparsable and missing input resolves to zero.
pub fn normalize_signed_amount(raw: Option<&RawAmount>) -> BigDecimal {
    let parsed = match raw {
        Some(RawAmount::Number(n)) => parse_amount(&n.to_string()),
        Some(RawAmount::Text(s)) => parse_amount(s),
        None => None,
    };

    parsed.unwrap_or_else(BigDecimal::zero)
}

/// Non-negative amount. Negative input clamps to zero.
pub fn normalize_amount(raw: Option<&RawAmount>) -> BigDecimal {
    clamp_non_negative(normalize_signed_amount(raw))
}

pub fn clamp_non_negative(value: BigDecimal) -> BigDecimal {
    if value < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        value
    }
}

/// First candidate that is present. Field precedence for each payload is
/// declared by the order of the candidates at the decode site.
pub fn first_present<'a>(
    candidates: &[Option<&'a RawAmount>],
) -> Option<&'a RawAmount> {
    candidates.iter().flatten().next().copied()
}

/// Wire representation: at most two decimals, no trailing zeros.
pub fn to_plain_string(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(2, RoundingMode::HalfUp).to_string();
    match rounded.find('.') {
        Some(_) => rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_owned(),
        None => rounded,
    }
}

pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
