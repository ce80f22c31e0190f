//! Literal classification for candidate column types.
//!
//! Every predicate here is pure and works on an already trimmed value. The
//! date and time recognisers parse components explicitly instead of relying
//! on back-referencing patterns: a date such as `2012-09-05` must repeat the
//! same separator between year/month and month/day.

use num_bigint::BigInt;

const FLOAT_MIN_POSITIVE: f64 = 1.175494351E-38;
const FLOAT_MAX_POSITIVE: f64 = 3.402823466E+38;
const DOUBLE_MIN_POSITIVE: f64 = 2.2250738585072014E-308;
const DOUBLE_MAX_POSITIVE: f64 = 1.7976931348623157E+308;

const DATE_SEPARATORS: &[char] = &['-', '/', '^'];
const TIME_SEPARATORS: &[char] = &[':', '.', '-'];

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
// February allows 29; leap years are not checked.
const MONTH_LENGTHS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatClass {
    NotFloat,
    Single,
    Double,
}

/// Parses `[+-]?digits` into an arbitrary-precision integer.
///
/// With `reject_leading_zero`, values such as `007` are refused so that
/// zero-padded codes stay textual; `0` itself is still an integer.
pub fn parse_integer(value: &str, reject_leading_zero: bool) -> Option<BigInt> {
    let (negative, digits) = split_sign(value);
    if !is_digit_run(digits) {
        return None;
    }
    if reject_leading_zero && digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)?;
    Some(if negative { -magnitude } else { magnitude })
}

pub fn float_class(value: &str) -> FloatClass {
    if !is_float_literal(value) {
        return FloatClass::NotFloat;
    }
    let Ok(parsed) = value.parse::<f64>() else {
        return FloatClass::NotFloat;
    };
    let magnitude = parsed.abs();
    if magnitude == 0.0 || (FLOAT_MIN_POSITIVE..=FLOAT_MAX_POSITIVE).contains(&magnitude) {
        FloatClass::Single
    } else if (DOUBLE_MIN_POSITIVE..=DOUBLE_MAX_POSITIVE).contains(&magnitude) {
        FloatClass::Double
    } else {
        FloatClass::NotFloat
    }
}

/// `[+-]?(digits.digits*|digits*.digits)([eE][+-]?digits)?`
fn is_float_literal(value: &str) -> bool {
    let (_, body) = split_sign(value);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let Some((whole, fraction)) = mantissa.split_once('.') else {
        return false;
    };
    let whole_ok = whole.is_empty() || is_digit_run(whole);
    let fraction_ok = fraction.is_empty() || is_digit_run(fraction);
    if !whole_ok || !fraction_ok || (whole.is_empty() && fraction.is_empty()) {
        return false;
    }
    match exponent {
        Some(exp) => is_digit_run(split_sign(exp).1),
        None => true,
    }
}

pub fn is_date(value: &str) -> bool {
    matches!(parse_date_prefix(value), Some(rest) if rest.is_empty())
}

pub fn is_time(value: &str) -> bool {
    matches!(parse_clock(value, TIME_SEPARATORS), Some(rest) if rest.is_empty() || is_fraction(rest))
}

pub fn is_datetime(value: &str) -> bool {
    let Some(rest) = parse_date_prefix(value) else {
        return false;
    };
    let Some(time) = rest.strip_prefix([' ', 'T', 't']) else {
        return false;
    };
    is_time(time)
}

/// Oracle export style dates such as `09-sep-2012`.
pub fn is_oracle_date(value: &str) -> bool {
    matches!(parse_oracle_date_prefix(value), Some(rest) if rest.is_empty())
}

/// Oracle export style timestamps such as `09-sep-2012 15:00:00 US/Eastern`.
///
/// The trailing timezone token is accepted and otherwise ignored.
pub fn is_oracle_datetime(value: &str) -> bool {
    let Some(rest) = parse_oracle_date_prefix(value) else {
        return false;
    };
    let Some(time) = rest.strip_prefix(' ') else {
        return false;
    };
    let Some(zone) = parse_clock(time, &[':']) else {
        return false;
    };
    if zone.is_empty() {
        return true;
    }
    zone.strip_prefix(' ').is_some_and(|token| {
        !token.is_empty()
            && token
                .chars()
                .all(|ch| ch.is_ascii_alphabetic() || ch == '/')
    })
}

/// Parses `YY|YYYY <sep> M[M] <sep> D[D]` and returns whatever follows.
fn parse_date_prefix(value: &str) -> Option<&str> {
    let (year, rest) = take_digits(value);
    if year.len() != 2 && year.len() != 4 {
        return None;
    }
    let separator = rest.chars().next().filter(|ch| DATE_SEPARATORS.contains(ch))?;
    let (month, rest) = take_digits(&rest[separator.len_utf8()..]);
    if !(1..=2).contains(&month.len()) {
        return None;
    }
    let rest = rest.strip_prefix(separator)?;
    let (day, rest) = take_digits(rest);
    if !(1..=2).contains(&day.len()) {
        return None;
    }

    let year: u32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let year_ok = year <= 99 || year >= 1900;
    (year_ok && month <= 12 && day <= 31).then_some(rest)
}

/// Parses `D[D]-mon-YYYY`, validating the day against the month length.
fn parse_oracle_date_prefix(value: &str) -> Option<&str> {
    let (day, rest) = take_digits(value);
    if !(1..=2).contains(&day.len()) {
        return None;
    }
    let rest = rest.strip_prefix('-')?;
    let month = rest.get(..3)?;
    let month_index = MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(month))?;
    let rest = rest[3..].strip_prefix('-')?;
    let (year, rest) = take_digits(rest);
    if year.len() != 4 {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    (day <= MONTH_LENGTHS[month_index]).then_some(rest)
}

/// Parses `HH<s>MM<s>SS` where `<s>` is one of `separators`, used twice.
fn parse_clock<'a>(value: &'a str, separators: &[char]) -> Option<&'a str> {
    let bytes = value.as_bytes();
    if bytes.len() < 8 {
        return None;
    }
    let hour = two_digits(&bytes[0..2])?;
    let separator = bytes[2] as char;
    if !separators.contains(&separator) || bytes[5] as char != separator {
        return None;
    }
    let minute = two_digits(&bytes[3..5])?;
    let second = two_digits(&bytes[6..8])?;
    (hour <= 23 && minute <= 59 && second <= 59).then(|| &value[8..])
}

fn is_fraction(value: &str) -> bool {
    value.strip_prefix('.').is_some_and(is_digit_run)
}

fn two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [tens, ones] if tens.is_ascii_digit() && ones.is_ascii_digit() => {
            Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
        }
        _ => None,
    }
}

fn split_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else {
        (false, value.strip_prefix('+').unwrap_or(value))
    }
}

fn take_digits(value: &str) -> (&str, &str) {
    let end = value
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    value.split_at(end)
}

fn is_digit_run(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_accept_signs_and_big_values() {
        assert_eq!(parse_integer("42", false), Some(BigInt::from(42)));
        assert_eq!(parse_integer("+7", false), Some(BigInt::from(7)));
        assert_eq!(parse_integer("-0", false), Some(BigInt::from(0)));
        let big = parse_integer("-99999999999999999999999", false).expect("big integer");
        assert_eq!(big.to_string(), "-99999999999999999999999");
        assert_eq!(parse_integer("1.0", false), None);
        assert_eq!(parse_integer("", false), None);
        assert_eq!(parse_integer("-", false), None);
        assert_eq!(parse_integer("1_000", false), None);
    }

    #[test]
    fn leading_zero_rejection_keeps_plain_zero() {
        assert_eq!(parse_integer("007", true), None);
        assert_eq!(parse_integer("-01", true), None);
        assert_eq!(parse_integer("0", true), Some(BigInt::from(0)));
        assert_eq!(parse_integer("007", false), Some(BigInt::from(7)));
    }

    #[test]
    fn float_literals_require_a_decimal_point() {
        assert_eq!(float_class("1.5"), FloatClass::Single);
        assert_eq!(float_class(".5"), FloatClass::Single);
        assert_eq!(float_class("5."), FloatClass::Single);
        assert_eq!(float_class("-2.5e10"), FloatClass::Single);
        assert_eq!(float_class("0.0"), FloatClass::Single);
        assert_eq!(float_class("1e5"), FloatClass::NotFloat);
        assert_eq!(float_class("."), FloatClass::NotFloat);
        assert_eq!(float_class("1.2.3"), FloatClass::NotFloat);
        assert_eq!(float_class("abc"), FloatClass::NotFloat);
    }

    #[test]
    fn float_ranges_split_single_and_double() {
        assert_eq!(float_class("1.0E39"), FloatClass::Double);
        assert_eq!(float_class("-1.0e-39"), FloatClass::Double);
        assert_eq!(float_class("1.0E309"), FloatClass::NotFloat);
        assert_eq!(float_class("1.0e-320"), FloatClass::NotFloat);
    }

    #[test]
    fn dates_require_matching_separators() {
        assert!(is_date("2012-09-05"));
        assert!(is_date("12/9/5"));
        assert!(is_date("2012^09^05"));
        assert!(is_date("2012-02-31"));
        assert!(!is_date("2012-09/05"));
        assert!(!is_date("1812-09-05"));
        assert!(!is_date("2012-13-05"));
        assert!(!is_date("2012-12-32"));
        assert!(!is_date("201-09-05"));
        assert!(!is_date("2012-009-05"));
    }

    #[test]
    fn times_accept_separators_and_fractions() {
        assert!(is_time("23:59:59"));
        assert!(is_time("08.15.00"));
        assert!(is_time("08-15-00.125"));
        assert!(!is_time("24:00:00"));
        assert!(!is_time("8:15:00"));
        assert!(!is_time("08:15.00"));
        assert!(!is_time("08:60:00"));
        assert!(!is_time("08:15:00."));
    }

    #[test]
    fn datetimes_join_date_and_time() {
        assert!(is_datetime("2012-09-05 15:00:00"));
        assert!(is_datetime("2012-09-05T15:00:00.5"));
        assert!(!is_datetime("2012-09-05"));
        assert!(!is_datetime("2012-09-05  15:00:00"));
    }

    #[test]
    fn oracle_dates_check_month_lengths() {
        assert!(is_oracle_date("09-sep-2012"));
        assert!(is_oracle_date("29-FEB-2013"));
        assert!(is_oracle_date("31-Dec-1999"));
        assert!(!is_oracle_date("31-sep-2012"));
        assert!(!is_oracle_date("09-sept-2012"));
        assert!(!is_oracle_date("09-sep-12"));
    }

    #[test]
    fn oracle_datetimes_ignore_timezone_token() {
        assert!(is_oracle_datetime("09-sep-2012 15:00:00 US/Eastern"));
        assert!(is_oracle_datetime("09-sep-2012 15:00:00"));
        assert!(!is_oracle_datetime("09-sep-2012 15.00.00"));
        assert!(!is_oracle_datetime("09-sep-2012 15:00:00 UTC+1"));
        assert!(!is_oracle_datetime("09-sep-2012 15:00:00 "));
        assert!(!is_oracle_datetime("09-sep-2012"));
    }
}
