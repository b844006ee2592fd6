//! Daily to monthly downsampling.

use crate::core::series::{Observation, Series};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date attached to the value kept for a month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthLabel {
    /// Date of the last observation in the month.
    #[default]
    LastObservation,
    /// Last calendar day of the month.
    MonthEnd,
}

/// Keeps the latest-dated observation of each calendar month.
///
/// Input must be ascending by date. Months without observations do not appear.
pub fn monthly_last(series: &Series, label: MonthLabel) -> Series {
    let mut months: Vec<Observation> = Vec::new();

    for obs in series.iter() {
        match months.last_mut() {
            Some(last) if same_month(last.date, obs.date) => {
                if obs.date >= last.date {
                    *last = *obs;
                }
            }
            _ => months.push(*obs),
        }
    }

    if label == MonthLabel::MonthEnd {
        for obs in &mut months {
            obs.date = month_end(obs.date);
        }
    }

    Series::new(months)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}
