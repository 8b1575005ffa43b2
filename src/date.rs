//! Best-effort date inference from file names.
//!
//! Names like `invoice_2023.05.10.pdf` or `scan 05-10-2023.jpg` use whatever
//! separator their author liked. The first digit-delimiter-digit-delimiter-digit
//! run is normalised to `a.b.c` and handed to `parse_first_date`, which also
//! understands month names and compact `YYYYMMDD` stamps.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Returned when nothing date-like is found.
pub const DEFAULT_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(date) => date,
    None => panic!("2000-01-01 is a valid date"),
};

static ROUGH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,4}[./\-\s]\d{1,2}[./\-\s]\d{1,4}").unwrap());

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,4})[./\-\s](\d{1,2})[./\-\s](\d{1,4})").unwrap()
});

static NAMED_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z])(?:(\d{1,2})(?:st|nd|rd|th)?[\s_\-.,]*)?(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s_\-.,]*(?:(\d{1,2})(?:st|nd|rd|th)?[\s_\-.,]+)?(\d{4})",
    )
    .unwrap()
});

static COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{4})(\d{2})(\d{2})(?:\D|$)").unwrap());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn is_delimiter(c: char) -> bool {
    matches!(c, '.' | '/' | '-') || c.is_whitespace()
}

/// Every rough date match in `text`, rebuilt from its first three components
/// joined with `.`.
#[must_use]
pub fn extract_date_strings(text: &str) -> Vec<String> {
    ROUGH_DATE
        .find_iter(text)
        .filter_map(|m| {
            let parts: Vec<&str> = m.as_str().split(is_delimiter).collect();
            if parts.len() >= 3 {
                Some(format!("{}.{}.{}", parts[0], parts[1], parts[2]))
            } else {
                None
            }
        })
        .collect()
}

/// Infer a date from a file name, falling back to `DEFAULT_DATE`.
#[must_use]
pub fn infer_date(file_name: &str) -> NaiveDate {
    let candidates = extract_date_strings(file_name);
    let text = candidates.first().map_or(file_name, String::as_str);
    parse_first_date(text).unwrap_or(DEFAULT_DATE)
}

/// First date found in `text`, trying numeric triples, then month names, then
/// compact `YYYYMMDD` runs.
#[must_use]
pub fn parse_first_date(text: &str) -> Option<NaiveDate> {
    let numeric = NUMERIC_DATE
        .captures_iter(text)
        .find_map(|caps| interpret_numeric(&caps[1], &caps[2], &caps[3]));
    if numeric.is_some() {
        return numeric;
    }

    let named = NAMED_MONTH_DATE.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[2])?;
        let year: i32 = caps[4].parse().ok()?;
        let day = caps
            .get(1)
            .or_else(|| caps.get(3))
            .map_or(Some(1), |d| d.as_str().parse().ok())?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if named.is_some() {
        return named;
    }

    COMPACT_DATE.captures_iter(text).find_map(|caps| {
        let year: i32 = caps[1].parse().ok()?;
        if !(1900..=2099).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, caps[2].parse().ok()?, caps[3].parse().ok()?)
    })
}

fn interpret_numeric(a: &str, b: &str, c: &str) -> Option<NaiveDate> {
    let x: u32 = a.parse().ok()?;
    let y: u32 = b.parse().ok()?;
    let z: u32 = c.parse().ok()?;

    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(x as i32, y, z);
    }

    // Month before day, day before month only when the month reading is impossible
    let year = match c.len() {
        4 => z as i32,
        1 | 2 => expand_two_digit_year(z),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, x, y).or_else(|| NaiveDate::from_ymd_opt(year, y, x))
}

fn expand_two_digit_year(year: u32) -> i32 {
    if year < 69 {
        2000 + year as i32
    } else {
        1900 + year as i32
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}
