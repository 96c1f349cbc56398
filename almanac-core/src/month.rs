//! Month grid layout for calendar views.
//!
//! Weeks start on Sunday. Cells before the 1st and after the last day of the
//! month are blank.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};

use crate::event::Event;
use crate::query::sort_chronologically;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A calendar month, navigable by month and by year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| YearMonth { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        YearMonth {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.first.month())
            .count() as u32
    }

    /// Weekday of the 1st, counted from Sunday = 0.
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn prev_month(&self) -> Self {
        self.shift_back(Months::new(1))
    }

    pub fn next_month(&self) -> Self {
        self.shift_forward(Months::new(1))
    }

    pub fn prev_year(&self) -> Self {
        self.shift_back(Months::new(12))
    }

    pub fn next_year(&self) -> Self {
        self.shift_forward(Months::new(12))
    }

    fn shift_back(&self, by: Months) -> Self {
        self.first
            .checked_sub_months(by)
            .map_or(*self, |first| YearMonth { first })
    }

    fn shift_forward(&self, by: Months) -> Self {
        self.first
            .checked_add_months(by)
            .map_or(*self, |first| YearMonth { first })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| YearMonth { first })
            .map_err(|_| format!("Invalid month '{}'. Expected YYYY-MM", s))
    }
}

/// One day of the grid with the events scheduled on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    /// Rows of exactly seven cells, Sunday first.
    pub weeks: Vec<Vec<Option<DayCell>>>,
}

impl MonthGrid {
    pub fn build(month: YearMonth, events: &[Event], today: NaiveDate) -> Self {
        let mut cells: Vec<Option<DayCell>> = (0..month.first_weekday()).map(|_| None).collect();

        for date in month.first_day().iter_days().take(month.days_in_month() as usize) {
            let mut day_events: Vec<Event> =
                events.iter().filter(|e| e.date == date).cloned().collect();
            sort_chronologically(&mut day_events);

            cells.push(Some(DayCell {
                date,
                is_today: date == today,
                events: day_events,
            }));
        }

        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        let weeks = cells.chunks(7).map(|week| week.to_vec()).collect();

        MonthGrid { month, weeks }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days().find(|cell| cell.date == date)
    }
}
