//! Locale normalization for Brazilian statement tokens.
//!
//! Dates arrive as `DD/MM/YYYY`, `DD/MM` or `DD MMM` with Portuguese month
//! abbreviations; amounts as `1.234,56` with comma decimals, sometimes
//! parenthesized or written `- 45,00` for credits. Everything funnels into
//! `NaiveDate` and integer cents here so the rest of the pipeline never
//! touches locale quirks.

use chrono::NaiveDate;

use crate::error::RowError;

/// Portuguese month abbreviations as printed on faturas.
const PT_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Reference month/year of the statement being parsed. Passed explicitly so
/// parallel/batch use never shares mutable state across files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementPeriod {
    pub year: i32,
    pub month: u32,
}

impl StatementPeriod {
    pub fn new(year: i32, month: u32) -> StatementPeriod {
        StatementPeriod { year, month }
    }
}

/// Parses a statement date token.
///
/// Accepted forms: ISO `YYYY-MM-DD` (already canonical), `DD/MM/YYYY`,
/// `DD/MM/YY`, `DD-MM-YYYY`, `DD.MM.YYYY`, `DD/MM` and `DD MMM` (Portuguese
/// month abbreviation). Year-less forms take the year from `period`; a
/// transaction month later than the statement month is assumed to belong to
/// the previous year. Without a period they fail with `AmbiguousDate`.
pub fn parse_date(raw: &str, period: Option<StatementPeriod>) -> Result<NaiveDate, RowError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(RowError::InvalidDate(raw.to_string()));
    }

    // Two-digit years first: "%Y" would otherwise read "05/03/24" as year 24.
    let bytes = s.as_bytes();
    if s.len() == 8 && bytes[2] == b'/' && bytes[5] == b'/' {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%d/%m/%y") {
            return Ok(date);
        }
    }

    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // DD/MM with the year inferred from the statement period
    if let Some((day_s, month_s)) = s.split_once('/') {
        if let (Ok(day), Ok(month)) = (day_s.trim().parse::<u32>(), month_s.trim().parse::<u32>()) {
            return date_in_period(raw, day, month, period);
        }
    }

    // DD MMM with a Portuguese month abbreviation ("12 mar", "04 dez.")
    let mut tokens = s.split_whitespace();
    if let (Some(day_s), Some(month_s), None) = (tokens.next(), tokens.next(), tokens.next()) {
        if let Ok(day) = day_s.parse::<u32>() {
            let name = month_s.trim_end_matches('.').to_lowercase();
            if let Some(idx) = PT_MONTHS.iter().position(|m| name.starts_with(m)) {
                return date_in_period(raw, day, idx as u32 + 1, period);
            }
        }
    }

    Err(RowError::InvalidDate(raw.to_string()))
}

fn date_in_period(
    raw: &str,
    day: u32,
    month: u32,
    period: Option<StatementPeriod>,
) -> Result<NaiveDate, RowError> {
    let Some(period) = period else {
        return Err(RowError::AmbiguousDate(raw.to_string()));
    };
    // Purchases cannot postdate the statement month.
    let year = if month > period.month {
        period.year - 1
    } else {
        period.year
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| RowError::InvalidDate(raw.to_string()))
}

/// Parses a currency token into integer cents.
///
/// Handles Brazilian notation (`1.234,56`, thousands-only `1.234`), plain
/// decimals (`1234.56`), stripped currency symbols, and both negative
/// conventions: leading minus (including the `- 45,00` credit form) and
/// parentheses (`(45,00)`). Cents are built digit-by-digit; no floats.
pub fn parse_amount(raw: &str) -> Result<i64, RowError> {
    let err = || RowError::UnparsableAmount(raw.to_string());
    let mut s = raw.trim();
    if s.is_empty() {
        return Err(err());
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        negative = true;
        s = &s[1..s.len() - 1];
    }

    let mut cleaned = s.to_string();
    for symbol in ["R$", "r$", "BRL", "US$", "U$", "€", "$"] {
        cleaned = cleaned.replace(symbol, "");
    }
    cleaned.retain(|c| !c.is_whitespace());

    if let Some(rest) = cleaned.strip_prefix('-') {
        negative = true;
        cleaned = rest.to_string();
    } else if let Some(rest) = cleaned.strip_prefix('+') {
        cleaned = rest.to_string();
    }

    if cleaned.is_empty() {
        return Err(err());
    }

    // Comma present: Brazilian decimal comma, dots are thousands separators.
    // No comma: dot is the decimal separator, unless the token is pure
    // thousand-grouping like "1.234".
    let canonical = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_thousand_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    let (int_part, frac_part) = match canonical.split_once('.') {
        Some((i, f)) => (i, f),
        None => (canonical.as_str(), ""),
    };

    if int_part.is_empty()
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
        || frac_part.len() > 2
    {
        return Err(err());
    }

    let units: i64 = int_part.parse().map_err(|_| err())?;
    let cents_frac: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().map_err(|_| err())? * 10,
        _ => frac_part.parse().map_err(|_| err())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents_frac))
        .ok_or_else(err)?;

    Ok(if negative { -cents } else { cents })
}

/// "1.234" / "12.345.678" - dots grouping digits in threes, no decimal part.
fn is_thousand_grouped(s: &str) -> bool {
    let mut parts = s.split('.');
    let Some(first) = parts.next() else {
        return false;
    };
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let mut any = false;
    for part in parts {
        if part.len() != 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        any = true;
    }
    any
}

/// Canonical decimal rendering: `-45.00`, `1234.56`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Brazilian display rendering: `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}R$ {grouped},{:02}", abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> Option<StatementPeriod> {
        Some(StatementPeriod::new(2025, 3))
    }

    #[test]
    fn test_parse_full_date_is_day_month_year() {
        // Day/month/year order, not month/day.
        let date = parse_date("05/03/2024", None).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_iso_date_is_idempotent() {
        let date = parse_date("2024-03-05", None).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_two_digit_year() {
        let date = parse_date("05/03/24", None).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_day_month_uses_statement_period() {
        let date = parse_date("05/03", period()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_day_month_rolls_back_across_year_end() {
        // A December charge on a March statement belongs to the previous year.
        let date = parse_date("28/12", period()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 28).unwrap());
    }

    #[test]
    fn test_parse_day_month_without_period_is_ambiguous() {
        assert_eq!(
            parse_date("05/03", None),
            Err(RowError::AmbiguousDate("05/03".into()))
        );
    }

    #[test]
    fn test_parse_portuguese_month_abbreviation() {
        let date = parse_date("12 fev", period()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 2, 12).unwrap());

        let date = parse_date("04 dez.", period()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 4).unwrap());
    }

    #[test]
    fn test_parse_invalid_calendar_date() {
        assert!(matches!(
            parse_date("32/13/2024", period()),
            Err(RowError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date("whenever", period()),
            Err(RowError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_amount_brazilian_notation() {
        assert_eq!(parse_amount("1.234,56").unwrap(), 123456);
        assert_eq!(parse_amount("R$ 1.234,56").unwrap(), 123456);
        assert_eq!(parse_amount("38,50").unwrap(), 3850);
    }

    #[test]
    fn test_parse_amount_plain_decimal() {
        assert_eq!(parse_amount("1234.56").unwrap(), 123456);
        assert_eq!(parse_amount("45.5").unwrap(), 4550);
        assert_eq!(parse_amount("45").unwrap(), 4500);
    }

    #[test]
    fn test_parse_amount_thousands_only() {
        // "1.234" on a Brazilian statement is one thousand, not one point two.
        assert_eq!(parse_amount("1.234").unwrap(), 123400);
        assert_eq!(parse_amount("12.345.678").unwrap(), 1234567800);
    }

    #[test]
    fn test_parse_amount_negative_conventions_agree() {
        assert_eq!(parse_amount("-45,00").unwrap(), -4500);
        assert_eq!(parse_amount("(45,00)").unwrap(), -4500);
        // Itaú prints credits with a space after the minus.
        assert_eq!(parse_amount("- 1.500,00").unwrap(), -150000);
    }

    #[test]
    fn test_parse_amount_rejects_non_numerals() {
        assert_eq!(
            parse_amount("abc"),
            Err(RowError::UnparsableAmount("abc".into()))
        );
        assert_eq!(parse_amount("-"), Err(RowError::UnparsableAmount("-".into())));
        assert_eq!(parse_amount(""), Err(RowError::UnparsableAmount("".into())));
    }

    #[test]
    fn test_amount_normalization_is_idempotent() {
        let cents = parse_amount("1.234,56").unwrap();
        let rendered = format_amount(cents);
        assert_eq!(rendered, "1234.56");
        assert_eq!(parse_amount(&rendered).unwrap(), cents);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(-4500), "-45.00");
        assert_eq!(format_amount(7), "0.07");
        assert_eq!(format_amount(123456), "1234.56");
    }

    #[test]
    fn test_format_brl_grouping() {
        assert_eq!(format_brl(123456), "R$ 1.234,56");
        assert_eq!(format_brl(812345678), "R$ 8.123.456,78");
        assert_eq!(format_brl(-4500), "-R$ 45,00");
    }
}
