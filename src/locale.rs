//! Document locale and date handling.

use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Language of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    En,
    /// German
    De,
}

impl Locale {
    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(Error::InvalidLocale(s.to_string())),
        }
    }
}

/// Accepted input date formats, tried in order.
pub const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y", "%B %d, %Y", "%d %B %Y"];

/// Parse a date, falling back to today's local date.
pub fn parse_date(input: Option<&str>) -> NaiveDate {
    parse_date_or(input, Local::now().date_naive())
}

/// Parse a date with an explicit fallback for absent or unparseable input.
pub fn parse_date_or(input: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .unwrap_or_else(|| {
            log::debug!("Unrecognized date {:?}, using {}", input, fallback);
            fallback
        })
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

/// Format a date for a footer: `19th March 2024` (en) or `15.02.2025` (de).
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "{}{} {}",
            date.day(),
            ordinal_suffix(date.day()),
            date.format("%B %Y")
        ),
        Locale::De => date.format("%d.%m.%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("DE".parse::<Locale>().unwrap(), Locale::De);
        assert!(matches!(
            "fr".parse::<Locale>(),
            Err(Error::InvalidLocale(code)) if code == "fr"
        ));
        assert_eq!(Locale::default(), Locale::En);
        assert_eq!(Locale::De.to_string(), "de");
    }

    #[test]
    fn test_parse_date_formats() {
        let fallback = date(2000, 1, 1);
        let expected = date(2024, 3, 19);
        for input in [
            "19.03.2024",
            "2024-03-19",
            "19/03/2024",
            "March 19, 2024",
            "19 March 2024",
        ] {
            assert_eq!(parse_date_or(Some(input), fallback), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_date_fallback() {
        let fallback = date(2000, 1, 1);
        assert_eq!(parse_date_or(None, fallback), fallback);
        assert_eq!(parse_date_or(Some(""), fallback), fallback);
        assert_eq!(parse_date_or(Some("not a date"), fallback), fallback);
        assert_eq!(parse_date_or(Some("31.02.2024"), fallback), fallback);
    }

    #[test]
    fn test_parse_date_defaults_to_today() {
        let today = Local::now().date_naive();
        let parsed = parse_date(Some("garbage"));
        // Allow for midnight rollover between the two calls
        assert!(parsed == today || parsed == today.succ_opt().unwrap());
    }

    #[test]
    fn test_ordinal_suffixes() {
        let expected = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in expected {
            assert_eq!(ordinal_suffix(day), suffix, "day {}", day);
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2024, 3, 19), Locale::En), "19th March 2024");
        assert_eq!(format_date(date(2024, 3, 1), Locale::En), "1st March 2024");
        assert_eq!(format_date(date(2025, 2, 22), Locale::En), "22nd February 2025");
        assert_eq!(format_date(date(2025, 2, 15), Locale::De), "15.02.2025");
        assert_eq!(format_date(date(2025, 12, 3), Locale::De), "03.12.2025");
    }
}
