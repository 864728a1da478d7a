//! Cell value normalizers
//!
//! Every function here is total: malformed input maps to a neutral value
//! (`None`, `0`) instead of an error.

use crate::grid::Cell;
use crate::types::{Status, Timestamp};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta};

/// Day zero of spreadsheet serial dates
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert a spreadsheet serial number to midnight of that day (fraction truncated toward zero)
pub fn serial_to_timestamp(serial: f64) -> Option<Timestamp> {
    if !serial.is_finite() {
        return None;
    }
    let days = TimeDelta::try_days(serial.trunc() as i64)?;
    serial_epoch()?
        .checked_add_signed(days)?
        .and_hms_opt(0, 0, 0)
}

const ISO_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

fn parse_iso(text: &str) -> Option<Timestamp> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Some(datetime) = ISO_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(datetime);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|datetime| datetime.naive_utc())
}

/// `DD/MM/YYYY` or `DD/MM/YY`; two-digit years land in 2000..=2099
fn parse_day_month_year(text: &str) -> Option<Timestamp> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day = parse_leading_int(parts[0])?;
    let month = parse_leading_int(parts[1])?;
    let mut year = parse_leading_int(parts[2])?;
    if year < 100 {
        year += 2000;
    }
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    date.and_hms_opt(0, 0, 0)
}

/// Parse a date cell: serial number, ISO string, or `DD/MM/YYYY` string
pub fn parse_date(cell: &Cell) -> Option<Timestamp> {
    match cell {
        Cell::Date(timestamp) => Some(*timestamp),
        Cell::Number(serial) => serial_to_timestamp(*serial),
        Cell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            parse_iso(text).or_else(|| parse_day_month_year(text))
        }
        Cell::Empty => None,
    }
}

/// Parse a currency amount. `R$ 1.234,56` and `1,234.56` both give 1234.56.
pub fn parse_currency(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(text) => parse_currency_text(text),
        _ => 0.0,
    }
}

fn parse_currency_text(text: &str) -> f64 {
    let clean: String = text
        .replace("R$", "")
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();

    let brazilian = match (clean.find(','), clean.rfind('.')) {
        (Some(comma), Some(dot)) => comma > dot,
        _ => false,
    };
    let normalized = if brazilian {
        clean.replace('.', "").replacen(',', ".", 1)
    } else {
        clean.replace(',', "")
    };

    parse_leading_float(&normalized).unwrap_or(0.0)
}

/// Parse a progress value into percent: fractions (≤ 1) are scaled by 100
pub fn parse_progress(cell: &Cell) -> f64 {
    let percent = match cell {
        Cell::Number(n) if n.is_nan() => 0.0,
        Cell::Number(n) if *n <= 1.0 => n * 100.0,
        Cell::Number(n) => *n,
        Cell::Text(text) => parse_leading_float(&text.replace('%', "")).unwrap_or(0.0),
        _ => 0.0,
    };
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Parse a duration in whole days; anything unusable is 0
pub fn parse_duration(cell: &Cell) -> u32 {
    match cell {
        Cell::Number(n) if n.is_finite() && *n > 0.0 => n.trunc() as u32,
        Cell::Text(text) => parse_leading_int(text)
            .and_then(|days| u32::try_from(days).ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Classify a status from its label, progress and deadline.
///
/// Label keywords always win; progress and the deadline only decide when the
/// label says nothing recognizable.
pub fn classify_status(label: &str, progress_percent: f64, is_past_deadline: bool) -> Status {
    let label = label.trim().to_lowercase();

    if label.contains("conclu") || label.contains("entregue") {
        return Status::Concluido;
    }
    if label.contains("cancel") {
        return Status::Cancelado;
    }
    if label.contains("atrasado") || label.contains("bloqueado") {
        return Status::Atrasado;
    }

    if progress_percent >= 99.0 {
        Status::Concluido
    } else if is_past_deadline {
        Status::Atrasado
    } else if progress_percent > 0.0 {
        Status::EmAndamento
    } else {
        Status::NaoIniciado
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Numeric prefix of a string, the way lenient spreadsheet parsers read "42 %" or "12abc"
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    // =========================================================================
    // parse_date
    // =========================================================================

    #[test]
    fn test_parse_date_serial_counts_days_from_epoch() {
        assert_eq!(parse_date(&Cell::Number(0.0)), Some(day(1899, 12, 30)));
        assert_eq!(parse_date(&Cell::Number(1.0)), Some(day(1899, 12, 31)));
        assert_eq!(parse_date(&Cell::Number(45382.0)), Some(day(2024, 3, 31)));
        for n in [2u32, 61, 366, 40000, 45000, 60000] {
            let expected = day(1899, 12, 30) + TimeDelta::days(n as i64);
            assert_eq!(parse_date(&Cell::Number(n as f64)), Some(expected));
        }
    }

    #[test]
    fn test_parse_date_serial_truncates_time_of_day() {
        assert_eq!(parse_date(&Cell::Number(45382.75)), Some(day(2024, 3, 31)));
    }

    #[test]
    fn test_parse_date_strings() {
        assert_eq!(parse_date(&text("2024-03-01")), Some(day(2024, 3, 1)));
        assert_eq!(parse_date(&text("01/03/2024")), Some(day(2024, 3, 1)));
        assert_eq!(parse_date(&text("31/03/24")), Some(day(2024, 3, 31)));
        assert_eq!(
            parse_date(&text("2024-03-01T10:30:00")),
            Some(day(2024, 3, 1) + TimeDelta::minutes(630))
        );
        assert_eq!(
            parse_date(&text("2024-03-01T00:00:00Z")),
            Some(day(2024, 3, 1))
        );
    }

    #[test]
    fn test_parse_date_garbage_is_none() {
        assert_eq!(parse_date(&text("amanhã")), None);
        assert_eq!(parse_date(&text("32/13/2024")), None);
        assert_eq!(parse_date(&text("")), None);
        assert_eq!(parse_date(&Cell::Empty), None);
        assert_eq!(parse_date(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_date(&Cell::Number(1e300)), None);
    }

    // =========================================================================
    // parse_currency
    // =========================================================================

    #[test]
    fn test_parse_currency_brazilian_and_us_formats() {
        assert_eq!(parse_currency(&text("R$ 1.234,56")), 1234.56);
        assert_eq!(parse_currency(&text("1,234.56")), 1234.56);
        assert_eq!(parse_currency(&text("R$100.000,00")), 100000.0);
        assert_eq!(parse_currency(&text("$ 2,500")), 2500.0);
    }

    #[test]
    fn test_parse_currency_passthrough_and_garbage() {
        assert_eq!(parse_currency(&Cell::Number(42.5)), 42.5);
        assert_eq!(parse_currency(&text("garbage")), 0.0);
        assert_eq!(parse_currency(&Cell::Empty), 0.0);
    }

    // =========================================================================
    // parse_progress / parse_duration
    // =========================================================================

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress(&Cell::Number(0.5)), 50.0);
        assert_eq!(parse_progress(&Cell::Number(1.0)), 100.0);
        assert_eq!(parse_progress(&Cell::Number(75.0)), 75.0);
        assert_eq!(parse_progress(&text("42%")), 42.0);
        assert_eq!(parse_progress(&text(" 12.5 % ")), 12.5);
        assert_eq!(parse_progress(&text("n/a")), 0.0);
        assert_eq!(parse_progress(&Cell::Number(f64::NAN)), 0.0);
        assert_eq!(parse_progress(&Cell::Empty), 0.0);
    }

    #[test]
    fn test_parse_progress_clamps_to_percent_range() {
        assert_eq!(parse_progress(&Cell::Number(150.0)), 100.0);
        assert_eq!(parse_progress(&Cell::Number(-0.2)), 0.0);
        assert_eq!(parse_progress(&text("-5%")), 0.0);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(&Cell::Number(30.0)), 30);
        assert_eq!(parse_duration(&Cell::Number(2.9)), 2);
        assert_eq!(parse_duration(&Cell::Number(-3.0)), 0);
        assert_eq!(parse_duration(&text("12 dias")), 12);
        assert_eq!(parse_duration(&text("-4")), 0);
        assert_eq!(parse_duration(&text("?")), 0);
    }

    // =========================================================================
    // classify_status
    // =========================================================================

    #[test]
    fn test_classify_status_label_beats_progress() {
        assert_eq!(classify_status("Bloqueado", 100.0, false), Status::Atrasado);
        assert_eq!(classify_status("Cancelado", 100.0, false), Status::Cancelado);
        assert_eq!(classify_status("ENTREGUE", 0.0, true), Status::Concluido);
        assert_eq!(classify_status("Concluída", 10.0, false), Status::Concluido);
    }

    #[test]
    fn test_classify_status_without_label() {
        assert_eq!(classify_status("", 99.0, true), Status::Concluido);
        assert_eq!(classify_status("", 50.0, true), Status::Atrasado);
        assert_eq!(classify_status("", 50.0, false), Status::EmAndamento);
        assert_eq!(classify_status("", 0.0, false), Status::NaoIniciado);
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("12abc"), Some(12.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e3x"), Some(1000.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_float("."), None);
    }
}
