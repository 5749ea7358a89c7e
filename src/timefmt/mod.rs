//! Duration and size formatting shared by the catalog, lyrics and player.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {0:?}, expected MM:SS")]
pub struct DurationParseError(pub String);

/// Parse a "MM:SS" label (minutes may be any width) to milliseconds.
pub fn parse_duration_ms(label: &str) -> Result<u64, DurationParseError> {
    let err = || DurationParseError(label.to_string());
    let (min, sec) = label.split_once(':').ok_or_else(err)?;
    if !all_digits(min) || !all_digits(sec) {
        return Err(err());
    }
    let min: u64 = min.parse().map_err(|_| err())?;
    let sec: u64 = sec.parse().map_err(|_| err())?;
    min_sec_to_ms(min, sec).ok_or_else(err)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn min_sec_to_ms(min: u64, sec: u64) -> Option<u64> {
    min.checked_mul(60)?.checked_add(sec)?.checked_mul(1000)
}

/// Format milliseconds as zero-padded "MM:SS".
///
/// Seconds are floored so a value just under a minute never renders as
/// `xx:60`. Non-finite input (unknown duration) renders as an ellipsis.
pub fn pretty_duration_from_ms(ms: f64) -> String {
    const ONE_MINUTE: f64 = 60.0 * 1000.0;
    if !ms.is_finite() {
        return '\u{2026}'.to_string();
    }
    let ms = ms.max(0.0);
    let minutes = (ms / ONE_MINUTE).floor();
    let seconds = ((ms - minutes * ONE_MINUTE) / 1000.0).floor();
    format!("{:02}:{:02}", minutes as u64, seconds as u64)
}

pub fn pretty_duration_from_secs(secs: f64) -> String {
    pretty_duration_from_ms(secs * 1000.0)
}

/// Human readable size: two decimals below 10KB and 10MB, rounded otherwise.
pub fn pretty_filesize(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB * 10.0 {
        format!("{:.2}KB", b / KB)
    } else if b < MB {
        format!("{}KB", (b / KB).round())
    } else if b < MB * 10.0 {
        format!("{:.2}MB", b / MB)
    } else {
        format!("{}MB", (b / MB).round())
    }
}

/// Parse a `time` position parameter: bare seconds (`SS`) or `M+:SS`.
///
/// Values too large to hold in milliseconds are rejected.
pub fn parse_seek_param(raw: &str) -> Option<u64> {
    if all_digits(raw) {
        return raw.parse::<u64>().ok()?.checked_mul(1000);
    }
    let (min, sec) = raw.split_once(':')?;
    if !all_digits(min) || sec.len() != 2 || !all_digits(sec) {
        return None;
    }
    min_sec_to_ms(min.parse().ok()?, sec.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration_ms("03:12"), Ok(192_000));
        assert_eq!(parse_duration_ms("1:05"), Ok(65_000));
        assert_eq!(parse_duration_ms("125:00"), Ok(7_500_000));
        assert!(parse_duration_ms("3m12s").is_err());
        assert!(parse_duration_ms("").is_err());
        assert!(parse_duration_ms("+5:00").is_err());
        assert!(parse_duration_ms("5:-1").is_err());
        assert!(parse_duration_ms(" 5:00").is_err());
    }

    #[test]
    fn test_huge_values_are_rejected_not_wrapped() {
        assert!(parse_duration_ms("307445734561825861:00").is_err());
        assert_eq!(parse_seek_param("18446744073709552"), None);
        assert_eq!(parse_seek_param("307445734561825861:00"), None);
        assert_eq!(parse_seek_param("99999999999999999999"), None);
        assert_eq!(parse_seek_param("18446744073709551"), Some(18_446_744_073_709_551_000));
    }

    #[test]
    fn test_pretty_duration() {
        assert_eq!(pretty_duration_from_ms(0.0), "00:00");
        assert_eq!(pretty_duration_from_ms(59_999.0), "00:59");
        assert_eq!(pretty_duration_from_ms(192_000.0), "03:12");
        assert_eq!(pretty_duration_from_secs(3725.5), "62:05");
        assert_eq!(pretty_duration_from_secs(f64::NAN), "\u{2026}");
    }

    #[test]
    fn test_pretty_filesize() {
        assert_eq!(pretty_filesize(2048), "2.00KB");
        assert_eq!(pretty_filesize(500 * 1024), "500KB");
        assert_eq!(pretty_filesize(3 * 1024 * 1024), "3.00MB");
        assert_eq!(pretty_filesize(42 * 1024 * 1024), "42MB");
    }

    #[test]
    fn test_parse_seek_param() {
        assert_eq!(parse_seek_param("90"), Some(90_000));
        assert_eq!(parse_seek_param("1:30"), Some(90_000));
        assert_eq!(parse_seek_param("12:05"), Some(725_000));
        assert_eq!(parse_seek_param("1:5"), None);
        assert_eq!(parse_seek_param("abc"), None);
        assert_eq!(parse_seek_param(""), None);
        assert_eq!(parse_seek_param(" 90"), None);
        assert_eq!(parse_seek_param("+90"), None);
    }
}
