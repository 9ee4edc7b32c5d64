//! Delta Calculation
//!
//! Change between a current and a previous measure value.

use serde::{Deserialize, Serialize};

/// Direction of change between two period values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub difference: f64,
    /// Percentage change rounded to one decimal. `None` when the baseline is
    /// zero, where percentage change is undefined.
    pub percentage: Option<f64>,
    pub trend: Trend,
}

/// Pure over all finite inputs; never produces `NaN` or infinite
/// percentages.
pub fn calculate_delta(current: f64, previous: f64) -> Delta {
    let difference = current - previous;
    let percentage = if previous != 0.0 {
        Some((difference / previous * 1000.0).round() / 10.0)
    } else {
        None
    };
    let trend = if difference > 0.0 {
        Trend::Up
    } else if difference < 0.0 {
        Trend::Down
    } else {
        Trend::Stable
    };
    Delta {
        difference,
        percentage,
        trend,
    }
}
