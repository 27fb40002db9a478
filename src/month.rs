use chrono::{Datelike, Local, Month, Weekday};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Weekday of the given date in the proleptic Gregorian calendar.
///
/// Pure arithmetic, so it is defined for every `i32` year and not only for
/// the range `NaiveDate` can represent.
pub(crate) fn weekday_of(year: i32, month: &Month, day: u32) -> Weekday {
    const T: [i64; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

    let m = month.number_from_month() as usize;
    let y = if m < 3 { year as i64 - 1 } else { year as i64 };
    let idx = (y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400) + T[m - 1] + day as i64)
        .rem_euclid(7);

    WEEKDAYS_FROM_SUNDAY[idx as usize]
}

/// A displayed month: the unit the grid is built for and navigated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthReference {
    year: i32,
    month: Month,
}

impl MonthReference {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::new(
                ErrorKind::InvalidMonth,
                &format!("{} is not within 1..=12", month),
            ));
        }

        Ok(MonthReference {
            year,
            month: MONTHS[month as usize - 1],
        })
    }

    pub fn from_month(year: i32, month: Month) -> Self {
        MonthReference { year, month }
    }

    pub fn current() -> Self {
        Local::now().date_naive().into()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn month_number(&self) -> u32 {
        self.month.number_from_month()
    }

    pub fn days_in_month(&self) -> u32 {
        days_of_month(&self.month, self.year)
    }

    pub fn first_weekday(&self) -> Weekday {
        weekday_of(self.year, &self.month, 1)
    }

    pub fn contains<T: Datelike>(&self, date: &T) -> bool {
        date.year() == self.year && date.month() == self.month_number()
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.month.name(), self.year)
    }

    pub fn next(&self) -> Self {
        *self + 1
    }

    pub fn prev(&self) -> Self {
        *self - 1
    }

    fn months_since_epoch(&self) -> i64 {
        self.year as i64 * 12 + self.month.number_from_month() as i64 - 1
    }

    // Saturates at the first and last month representable with an i32 year.
    fn from_months_since_epoch(months: i64) -> Self {
        let months = months.clamp(i32::MIN as i64 * 12, i32::MAX as i64 * 12 + 11);
        MonthReference {
            year: months.div_euclid(12) as i32,
            month: MONTHS[months.rem_euclid(12) as usize],
        }
    }
}

impl<T: Datelike> From<T> for MonthReference {
    fn from(m: T) -> Self {
        MonthReference {
            year: m.year(),
            month: MONTHS[m.month0() as usize],
        }
    }
}

impl Add<u32> for MonthReference {
    type Output = MonthReference;
    fn add(self, rhs: u32) -> Self::Output {
        MonthReference::from_months_since_epoch(self.months_since_epoch() + rhs as i64)
    }
}

impl Sub<u32> for MonthReference {
    type Output = MonthReference;
    fn sub(self, rhs: u32) -> Self::Output {
        MonthReference::from_months_since_epoch(self.months_since_epoch() - rhs as i64)
    }
}

impl Ord for MonthReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.months_since_epoch().cmp(&other.months_since_epoch())
    }
}

impl PartialOrd for MonthReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MonthReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month_number())
    }
}

impl FromStr for MonthReference {
    type Err = Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s.trim().rsplit_once('-').ok_or_else(|| {
            Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not of the form YYYY-MM", s),
            )
        })?;

        let year = year.parse::<i32>().map_err(|e| {
            Error::new(ErrorKind::DateParse, &format!("year '{}': {}", year, e))
        })?;
        let month = month.parse::<u32>().map_err(|e| {
            Error::new(ErrorKind::DateParse, &format!("month '{}': {}", month, e))
        })?;

        MonthReference::new(year, month)
    }
}
