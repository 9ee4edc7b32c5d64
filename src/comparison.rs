//! Comparison Period Derivation
//!
//! Turns a primary reporting period into the window it is compared against.

use crate::error::EpiError;
use crate::period::{shift_backward, EpiPeriod};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the comparison window relates to the primary period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// No comparison is performed
    None,
    /// Same week range in the immediately prior year
    YearOverYear,
    /// The immediately preceding span of equal length
    PreviousPeriod,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::None => "none",
            ComparisonMode::YearOverYear => "year_over_year",
            ComparisonMode::PreviousPeriod => "previous_period",
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = EpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ComparisonMode::None),
            "year_over_year" | "yoy" => Ok(ComparisonMode::YearOverYear),
            "previous_period" | "previous" => Ok(ComparisonMode::PreviousPeriod),
            other => Err(EpiError::Query(format!("Unknown comparison mode: {}", other))),
        }
    }
}

/// Derive the comparison window for a period, or `None` when the mode
/// performs no comparison.
///
/// Year-over-year preserves week numbers and only shifts the years; no
/// clamping happens at week 52 even for prior years with 53 ISO weeks.
/// Previous-period produces an equal-length span ending exactly one week
/// before the primary start.
pub fn comparison_period(period: &EpiPeriod, mode: ComparisonMode) -> Option<EpiPeriod> {
    match mode {
        ComparisonMode::None => None,
        ComparisonMode::YearOverYear => Some(EpiPeriod {
            year_from: period.year_from - 1,
            week_from: period.week_from,
            year_to: period.year_to - 1,
            week_to: period.week_to,
        }),
        ComparisonMode::PreviousPeriod => {
            let duration = period.span_weeks();
            let (year_to, week_to) = shift_backward(period.year_from, period.week_from, 1);
            let (year_from, week_from) =
                shift_backward(period.year_from, period.week_from, duration);
            Some(EpiPeriod {
                year_from,
                week_from,
                year_to,
                week_to,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_none_derives_nothing() {
        let period = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        assert_eq!(comparison_period(&period, ComparisonMode::None), None);
    }

    #[test]
    fn test_year_over_year_shifts_years_only() {
        let period = EpiPeriod::new(2024, 50, 2025, 2).unwrap();
        let previous = comparison_period(&period, ComparisonMode::YearOverYear).unwrap();
        assert_eq!(previous, EpiPeriod::new(2023, 50, 2024, 2).unwrap());

        // Re-adding one year recovers the primary period exactly.
        let recovered = EpiPeriod {
            year_from: previous.year_from + 1,
            week_from: previous.week_from,
            year_to: previous.year_to + 1,
            week_to: previous.week_to,
        };
        assert_eq!(recovered, period);
    }

    #[test]
    fn test_previous_period_rolls_into_prior_year() {
        let period = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        let previous = comparison_period(&period, ComparisonMode::PreviousPeriod).unwrap();
        assert_eq!(previous, EpiPeriod::new(2024, 43, 2024, 52).unwrap());
    }

    #[test]
    fn test_previous_period_preserves_length() {
        let periods = [
            EpiPeriod::new(2025, 1, 2025, 10).unwrap(),
            EpiPeriod::new(2025, 5, 2025, 5).unwrap(),
            EpiPeriod::new(2024, 48, 2025, 7).unwrap(),
            EpiPeriod::new(2022, 10, 2024, 3).unwrap(),
        ];
        for period in periods {
            let previous = comparison_period(&period, ComparisonMode::PreviousPeriod).unwrap();
            assert_eq!(previous.span_weeks(), period.span_weeks(), "for {}", period);
        }
    }

    #[test]
    fn test_previous_period_is_adjacent() {
        let periods = [
            EpiPeriod::new(2025, 1, 2025, 10).unwrap(),
            EpiPeriod::new(2025, 30, 2025, 33).unwrap(),
            EpiPeriod::new(2024, 48, 2025, 7).unwrap(),
        ];
        for period in periods {
            let previous = comparison_period(&period, ComparisonMode::PreviousPeriod).unwrap();
            let (expected_year, expected_week) =
                shift_backward(period.year_from, period.week_from, 1);
            assert_eq!((previous.year_to, previous.week_to), (expected_year, expected_week));
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("yoy".parse::<ComparisonMode>().unwrap(), ComparisonMode::YearOverYear);
        assert_eq!(
            "previous_period".parse::<ComparisonMode>().unwrap(),
            ComparisonMode::PreviousPeriod
        );
        assert_eq!("NONE".parse::<ComparisonMode>().unwrap(), ComparisonMode::None);
        assert!("weekly".parse::<ComparisonMode>().is_err());
    }
}
