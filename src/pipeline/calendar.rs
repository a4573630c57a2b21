//! Calendar helpers: the fixed month ordering table and bucketing policy

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Month labels in calendar order. Index + 1 is the month number.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

/// Position of a label in the ordering table. Labels carrying a year suffix
/// (`"March 2018"`) are matched on their month part.
pub fn month_rank(label: &str) -> Option<usize> {
    let month = label.split_whitespace().next()?;
    MONTH_NAMES.iter().position(|name| *name == month)
}

/// How approval timestamps are grouped into monthly buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthBucketing {
    /// One bucket per month of the year; different years are merged.
    #[default]
    MonthOfYear,
    /// One bucket per (year, month), labelled e.g. `"March 2018"`.
    YearMonth,
    /// One bucket per (year, month) labelled by month name only. When the
    /// same month appears in several years, the largest bucket wins.
    PeakMonth,
}

impl MonthBucketing {
    /// Whether buckets are keyed on the year as well as the month.
    pub fn keeps_year(self) -> bool {
        !matches!(self, MonthBucketing::MonthOfYear)
    }

    /// Display label for a bucket.
    pub fn label(self, year: i32, month: u32) -> String {
        let name = month_name(month).unwrap_or("Unknown");
        match self {
            MonthBucketing::YearMonth => format!("{} {}", name, year),
            MonthBucketing::MonthOfYear | MonthBucketing::PeakMonth => name.to_string(),
        }
    }
}

impl fmt::Display for MonthBucketing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonthBucketing::MonthOfYear => "month-of-year",
            MonthBucketing::YearMonth => "year-month",
            MonthBucketing::PeakMonth => "peak-month",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MonthBucketing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month-of-year" | "month" => Ok(MonthBucketing::MonthOfYear),
            "year-month" => Ok(MonthBucketing::YearMonth),
            "peak-month" | "peak" => Ok(MonthBucketing::PeakMonth),
            other => Err(format!(
                "Unknown bucketing '{}'. Options: month-of-year, year-month, peak-month",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_month_rank_ignores_year_suffix() {
        assert_eq!(month_rank("March"), Some(2));
        assert_eq!(month_rank("March 2018"), Some(2));
        assert_eq!(month_rank("Smarch"), None);
    }

    #[test]
    fn test_bucketing_parse_and_display() {
        for mode in [
            MonthBucketing::MonthOfYear,
            MonthBucketing::YearMonth,
            MonthBucketing::PeakMonth,
        ] {
            assert_eq!(mode.to_string().parse::<MonthBucketing>(), Ok(mode));
        }
        assert!("weekly".parse::<MonthBucketing>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MonthBucketing::MonthOfYear.label(2018, 3), "March");
        assert_eq!(MonthBucketing::PeakMonth.label(2017, 3), "March");
        assert_eq!(MonthBucketing::YearMonth.label(2018, 3), "March 2018");
    }
}
