//! Free-text year parsing for the year form.

use thiserror::Error;

/// Earliest accepted year (3000 BC).
pub const MIN_YEAR: i32 = -3000;
/// Latest accepted year.
pub const MAX_YEAR: i32 = 2026;
/// Year loaded when the shell starts.
pub const INITIAL_YEAR: i32 = 2024;

/// Rejected year input. Both cases show the same message in the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YearInputError {
    #[error("Valid range: 3000 BC to 2026 CE")]
    Unparseable(String),

    #[error("Valid range: 3000 BC to 2026 CE")]
    OutOfRange(i64),
}

/// Parses "711", "300 BC", "1492 ce", "-218" into a signed year.
///
/// A trailing `BC` negates the number, a trailing `CE` keeps it. The number
/// itself is read as the longest integer prefix, so "711 AD" is 711.
pub fn parse_year(text: &str) -> Result<i32, YearInputError> {
    let value = text.trim().to_uppercase();

    let parsed = if let Some(rest) = value.strip_suffix("BC") {
        parse_int_prefix(rest).map(|n| -n)
    } else if let Some(rest) = value.strip_suffix("CE") {
        parse_int_prefix(rest)
    } else {
        parse_int_prefix(&value)
    };

    let year = parsed.ok_or_else(|| YearInputError::Unparseable(text.to_string()))?;

    if !(i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&year) {
        return Err(YearInputError::OutOfRange(year));
    }

    // range checked above
    Ok(year as i32)
}

/// Leading whitespace, optional sign, then as many digits as present.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(d));
    }

    seen.then_some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(parse_year("711"), Ok(711));
        assert_eq!(parse_year("  1492  "), Ok(1492));
        assert_eq!(parse_year("-218"), Ok(-218));
        assert_eq!(parse_year("0"), Ok(0));
    }

    #[test]
    fn test_era_suffixes() {
        assert_eq!(parse_year("300 BC"), Ok(-300));
        assert_eq!(parse_year("300bc"), Ok(-300));
        assert_eq!(parse_year("1492 CE"), Ok(1492));
        assert_eq!(parse_year("1492 ce"), Ok(1492));
    }

    #[test]
    fn test_boundaries_accepted() {
        assert_eq!(parse_year("-3000"), Ok(-3000));
        assert_eq!(parse_year("2026"), Ok(2026));
        assert_eq!(parse_year("3000 BC"), Ok(-3000));
        assert_eq!(parse_year("2026 CE"), Ok(2026));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(parse_year("-3001"), Err(YearInputError::OutOfRange(-3001)));
        assert_eq!(parse_year("2027"), Err(YearInputError::OutOfRange(2027)));
        assert_eq!(parse_year("3001 BC"), Err(YearInputError::OutOfRange(-3001)));
        assert!(parse_year("99999999999999999999999").is_err());
    }

    #[test]
    fn test_unparseable_rejected() {
        assert!(matches!(parse_year("abc"), Err(YearInputError::Unparseable(_))));
        assert!(matches!(parse_year(""), Err(YearInputError::Unparseable(_))));
        assert!(matches!(parse_year("BC"), Err(YearInputError::Unparseable(_))));
        assert!(matches!(parse_year("-"), Err(YearInputError::Unparseable(_))));
    }

    #[test]
    fn test_lenient_integer_prefix() {
        assert_eq!(parse_year("711 AD"), Ok(711));
        assert_eq!(parse_year("12.7"), Ok(12));
        assert_eq!(parse_year("+5"), Ok(5));
    }

    #[test]
    fn test_error_message() {
        let err = parse_year("abc").unwrap_err();
        assert_eq!(err.to_string(), "Valid range: 3000 BC to 2026 CE");
    }
}
