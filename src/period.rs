//! Epidemiological Period Model
//!
//! Inclusive spans of epidemiological weeks (SE) and the week arithmetic
//! used to derive comparison windows.

use crate::error::{EpiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weeks per reporting year. The surveillance service numbers weeks 1..=52
/// uniformly; ISO 53-week years are not corrected.
pub const WEEKS_PER_YEAR: u32 = 52;

/// An inclusive span of epidemiological weeks, possibly crossing year
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpiPeriod {
    pub year_from: i32,
    pub week_from: u32,
    pub year_to: i32,
    pub week_to: u32,
}

impl EpiPeriod {
    pub fn new(year_from: i32, week_from: u32, year_to: i32, week_to: u32) -> Result<Self> {
        if !(1..=WEEKS_PER_YEAR).contains(&week_from) || !(1..=WEEKS_PER_YEAR).contains(&week_to) {
            return Err(EpiError::Period(format!(
                "week out of range 1..={}: SE{}..SE{}",
                WEEKS_PER_YEAR, week_from, week_to
            )));
        }
        if year_to < year_from {
            return Err(EpiError::Period(format!(
                "period ends before it starts: {}..{}",
                year_from, year_to
            )));
        }
        if year_from == year_to && week_to < week_from {
            return Err(EpiError::Period(format!(
                "period ends before it starts: SE{}..SE{}/{}",
                week_from, week_to, year_from
            )));
        }
        Ok(Self {
            year_from,
            week_from,
            year_to,
            week_to,
        })
    }

    pub fn single_week(year: i32, week: u32) -> Result<Self> {
        Self::new(year, week, year, week)
    }

    /// Number of weeks covered, inclusive on both ends.
    pub fn span_weeks(&self) -> u32 {
        if self.year_from == self.year_to {
            self.week_to - self.week_from + 1
        } else {
            let full_years = (self.year_to - self.year_from - 1) as u32;
            (WEEKS_PER_YEAR - self.week_from + 1) + WEEKS_PER_YEAR * full_years + self.week_to
        }
    }
}

impl fmt::Display for EpiPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year_from == self.year_to {
            write!(
                f,
                "SE{}-SE{}/{}",
                self.week_from, self.week_to, self.year_from
            )
        } else {
            write!(
                f,
                "SE{}/{}-SE{}/{}",
                self.week_from, self.year_from, self.week_to, self.year_to
            )
        }
    }
}

/// Step a (year, week) position back by `by_weeks`, rolling across year
/// boundaries at week 1.
pub fn shift_backward(year: i32, week: u32, by_weeks: u32) -> (i32, u32) {
    let mut year = year;
    let mut week = week as i64 - by_weeks as i64;
    while week < 1 {
        week += WEEKS_PER_YEAR as i64;
        year -= 1;
    }
    (year, week as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_within_one_year() {
        let period = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        assert_eq!(period.span_weeks(), 10);

        let single = EpiPeriod::single_week(2025, 7).unwrap();
        assert_eq!(single.span_weeks(), 1);
    }

    #[test]
    fn test_span_across_year_boundary() {
        let period = EpiPeriod::new(2024, 50, 2025, 2).unwrap();
        assert_eq!(period.span_weeks(), 5);

        let two_full_years = EpiPeriod::new(2022, 10, 2024, 3).unwrap();
        assert_eq!(two_full_years.span_weeks(), (52 - 10 + 1) + 52 + 3);
    }

    #[test]
    fn test_shift_backward_rolls_over_years() {
        assert_eq!(shift_backward(2025, 3, 5), (2024, 50));
        assert_eq!(shift_backward(2025, 10, 0), (2025, 10));
        assert_eq!(shift_backward(2025, 1, 1), (2024, 52));
        assert_eq!(shift_backward(2025, 1, 104), (2023, 1));
    }

    #[test]
    fn test_rejects_invalid_periods() {
        assert!(EpiPeriod::new(2025, 10, 2025, 3).is_err());
        assert!(EpiPeriod::new(2025, 0, 2025, 3).is_err());
        assert!(EpiPeriod::new(2025, 1, 2025, 53).is_err());
        assert!(EpiPeriod::new(2025, 1, 2024, 10).is_err());
    }

    #[test]
    fn test_display() {
        let same_year = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        assert_eq!(same_year.to_string(), "SE1-SE10/2025");

        let cross_year = EpiPeriod::new(2024, 50, 2025, 2).unwrap();
        assert_eq!(cross_year.to_string(), "SE50/2024-SE2/2025");
    }
}
