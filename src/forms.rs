//! Helpers for form-encoded bodies, where every field arrives as optional text.

use serde::Serializer;
use time::{macros::format_description, Date, Time};

use crate::error::AppError;

/// Trimmed value, `None` when absent or blank.
pub fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn required(field: &str, v: Option<String>) -> Result<String, AppError> {
    non_blank(v).ok_or_else(|| AppError::validation(format!("{field} is required")))
}

/// HTML checkbox semantics: present means checked.
pub fn checked(v: &Option<String>) -> bool {
    matches!(v.as_deref(), Some(s) if !matches!(s.trim(), "" | "0" | "false" | "off"))
}

pub fn parse_num<T: std::str::FromStr>(field: &str, v: Option<String>) -> Result<Option<T>, AppError> {
    match non_blank(v) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation(format!("{field} must be a number"))),
    }
}

/// `YYYY-MM-DD`, as sent by `<input type="date">`.
pub fn parse_date(field: &str, v: Option<String>) -> Result<Option<Date>, AppError> {
    match non_blank(v) {
        None => Ok(None),
        Some(s) => Date::parse(&s, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| AppError::validation(format!("{field} must be a date (YYYY-MM-DD)"))),
    }
}

/// Serializes a [`Date`] as `YYYY-MM-DD`.
pub fn serialize_date<S: Serializer>(d: &Date, s: S) -> Result<S::Ok, S::Error> {
    let text = d
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

/// `HH:MM`, with optional seconds.
pub fn parse_time(field: &str, v: Option<String>) -> Result<Option<Time>, AppError> {
    let Some(s) = non_blank(v) else {
        return Ok(None);
    };
    Time::parse(&s, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(&s, format_description!("[hour]:[minute]")))
        .map(Some)
        .map_err(|_| AppError::validation(format!("{field} must be a time (HH:MM)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_counts_as_missing() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert!(required("phone", Some("\t".into())).is_err());
        assert_eq!(required("phone", Some(" 0812 ".into())).unwrap(), "0812");
    }

    #[test]
    fn checkbox_values() {
        assert!(checked(&Some("on".into())));
        assert!(!checked(&Some("0".into())));
        assert!(!checked(&None));
    }

    #[test]
    fn numbers_parse_or_fail_validation() {
        assert_eq!(parse_num::<i64>("qty", Some(" 3 ".into())).unwrap(), Some(3));
        assert_eq!(parse_num::<i64>("qty", None).unwrap(), None);
        assert!(matches!(parse_num::<i64>("qty", Some("x".into())), Err(AppError::Validation(_))));
    }

    #[test]
    fn dates_and_times() {
        use time::macros::{date, time};
        assert_eq!(parse_date("date", Some("2026-10-16".into())).unwrap(), Some(date!(2026 - 10 - 16)));
        assert!(parse_date("date", Some("16/10/2026".into())).is_err());
        assert_eq!(parse_time("time", Some("19:30".into())).unwrap(), Some(time!(19:30)));
        assert_eq!(parse_time("time", Some("19:30:15".into())).unwrap(), Some(time!(19:30:15)));
        assert!(parse_time("time", Some("7pm".into())).is_err());
    }
}
