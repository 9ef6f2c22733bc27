//! Time grid business logic.
//!
//! Produces the month axis of the allocation grid and converts a month into
//! billable hours. Months are first-class values rather than dates; the clock
//! is injected so the grid is deterministic under test.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Billable hours per weekday used when no configuration overrides it.
pub const DEFAULT_HOURS_PER_DAY: u32 = 8;

/// A calendar month, formatted as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, rejecting negative years and month numbers outside
    /// `1..=12`. A negative year would format as a label that cannot be parsed.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if year < 0
            || !(1..=12).contains(&month)
            || NaiveDate::from_ymd_opt(year, month, 1).is_none()
        {
            return Err(Error::InvalidMonth {
                input: format!("{year}-{month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1 through 12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The following month, rolling December over into January.
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month, if representable.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Short human label such as `Nov 2024`.
    #[must_use]
    pub fn display_label(self) -> String {
        self.first_day()
            .map_or_else(|| self.to_string(), |d| d.format("%b %Y").to_string())
    }

    /// Parses a label produced by [`Month::display_label`].
    pub fn parse_label(label: &str) -> Result<Self> {
        NaiveDate::parse_from_str(&format!("01 {}", label.trim()), "%d %b %Y")
            .map(Self::from_date)
            .map_err(|_| Error::InvalidMonth {
                input: label.to_string(),
            })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonth {
            input: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Month {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

/// Source of "today" for the grid.
pub trait Clock {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Returns `count` consecutive months starting with the clock's current month.
pub fn next_months(clock: &impl Clock, count: usize) -> Vec<Month> {
    std::iter::successors(Some(Month::from_date(clock.today())), |m| Some(m.succ()))
        .take(count)
        .collect()
}

/// Number of Monday-to-Friday days in `month`. No holiday calendar applies.
#[must_use]
pub fn weekdays_in_month(month: Month) -> u32 {
    let Some(first) = month.first_day() else {
        return 0;
    };
    let count = first
        .iter_days()
        .take_while(|d| d.month() == month.month())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count();
    // At most 23 weekdays in any month
    u32::try_from(count).unwrap_or(0)
}

/// Billable hours in `month` at `hours_per_day` per weekday.
#[must_use]
pub fn business_hours_in_month(month: Month, hours_per_day: u32) -> u32 {
    weekdays_in_month(month) * hours_per_day
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[test]
    fn test_next_months_rolls_over_year() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 11, 15).unwrap());
        let months: Vec<String> = next_months(&clock, 3)
            .into_iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01"]);
    }

    #[test]
    fn test_next_months_zero_count() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(next_months(&clock, 0).is_empty());
    }

    #[test]
    fn test_business_hours_april_2024() {
        assert_eq!(weekdays_in_month(month("2024-04")), 22);
        assert_eq!(business_hours_in_month(month("2024-04"), 8), 176);
    }

    #[test]
    fn test_business_hours_leap_february() {
        // 2024-02 has 29 days starting on a Thursday
        assert_eq!(weekdays_in_month(month("2024-02")), 21);
        assert_eq!(business_hours_in_month(month("2024-02"), 8), 168);
    }

    #[test]
    fn test_business_hours_non_leap_february() {
        // 2023-02 starts on a Wednesday, four full weeks
        assert_eq!(weekdays_in_month(month("2023-02")), 20);
        assert_eq!(business_hours_in_month(month("2023-02"), 8), 160);
    }

    #[test]
    fn test_business_hours_respects_hours_per_day() {
        assert_eq!(business_hours_in_month(month("2024-04"), 6), 132);
    }

    #[test]
    fn test_month_parse_and_display() {
        let m = month("2025-01");
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 1);
        assert_eq!(m.to_string(), "2025-01");
        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025-00".parse::<Month>().is_err());
        assert!("garbage".parse::<Month>().is_err());
    }

    #[test]
    fn test_display_label_round_trips() -> Result<()> {
        for s in ["2024-01", "2024-11", "2025-06", "1999-12"] {
            let m = month(s);
            assert_eq!(Month::parse_label(&m.display_label())?, m);
        }
        assert_eq!(month("2024-11").display_label(), "Nov 2024");
        Ok(())
    }

    #[test]
    fn test_negative_year_rejected() -> Result<()> {
        assert!(matches!(Month::new(-5, 3), Err(Error::InvalidMonth { .. })));
        assert!("-005-03".parse::<Month>().is_err());

        let earliest = Month::new(0, 1)?;
        assert_eq!(earliest.to_string(), "0000-01");
        assert_eq!(earliest.to_string().parse::<Month>()?, earliest);
        Ok(())
    }

    #[test]
    fn test_month_ordering() {
        assert!(month("2024-12") < month("2025-01"));
        assert_eq!(month("2024-12").succ(), month("2025-01"));
    }

    #[test]
    fn test_month_serde_as_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            month: Month,
        }
        let w: Wrapper = toml::from_str(r#"month = "2024-04""#).unwrap();
        assert_eq!(w.month, month("2024-04"));
        assert!(toml::from_str::<Wrapper>(r#"month = "2024-4x""#).is_err());
    }
}
