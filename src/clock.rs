//! Reporting Clock
//!
//! The current (year, week) reporting position is injected explicitly
//! rather than read from ambient system time inside the engine, keeping
//! comparison runs reproducible.

use crate::error::{EpiError, Result};
use crate::period::{shift_backward, EpiPeriod, WEEKS_PER_YEAR};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingClock {
    year: i32,
    week: u32,
}

impl ReportingClock {
    /// Clock pinned to an explicit reporting position.
    pub fn fixed(year: i32, week: u32) -> Result<Self> {
        if !(1..=WEEKS_PER_YEAR).contains(&week) {
            return Err(EpiError::Period(format!(
                "week out of range 1..={}: SE{}",
                WEEKS_PER_YEAR, week
            )));
        }
        Ok(Self { year, week })
    }

    /// Clock derived from a calendar date. ISO week 53 folds into week 52 to
    /// stay within the fixed 52-week reporting year.
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week().min(WEEKS_PER_YEAR),
        }
    }

    pub fn current_week(&self) -> (i32, u32) {
        (self.year, self.week)
    }

    /// The `weeks`-long period ending at the clock's position.
    pub fn window(&self, weeks: u32) -> Result<EpiPeriod> {
        if weeks == 0 {
            return Err(EpiError::Period("window must cover at least one week".to_string()));
        }
        let (year_from, week_from) = shift_backward(self.year, self.week, weeks - 1);
        EpiPeriod::new(year_from, week_from, self.year, self.week)
    }
}
