use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use chrono::{DateTime, NaiveDate, Utc};

pub const CURRENCY_SIGN: &str = "₽";
pub const EMPTY_DATE: &str = "—";

/// Groups digits by three with a plain space, ru-RU style.
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    grouped
}

/// Whole roubles, e.g. `150 000 ₽`. Fractions are rounded half away
/// from zero.
pub fn format_currency(amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(0, RoundingMode::HalfUp);
    let negative = rounded < BigDecimal::zero();
    let whole = rounded.abs().to_u64().unwrap_or(0);
    let sign = if negative { "-" } else { "" };

    format!("{}{} {}", sign, group_digits(whole), CURRENCY_SIGN)
}

/// Ledger rendering: explicit `+` for income, `-` for spending.
pub fn format_signed_currency(amount: &BigDecimal) -> String {
    if *amount > BigDecimal::zero() {
        format!("+{}", format_currency(amount))
    } else {
        format_currency(amount)
    }
}

pub fn format_date(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(date) => date.format("%d.%m.%Y").to_string(),
        None => String::from(EMPTY_DATE),
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
