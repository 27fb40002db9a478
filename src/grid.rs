//! Placement of the days of a month, and of the events on them, onto a
//! grid of week rows and weekday columns.
//!
//! Everything here is a pure function of its inputs. A [`GridAssignment`]
//! is rebuilt whenever the displayed month changes and borrows the events
//! it places instead of copying them.

use chrono::{Datelike, Weekday};
use serde_with::DeserializeFromStr;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};
use crate::event::Dated;
use crate::month::MonthReference;

pub const DAYS_PER_WEEK: u32 = 7;

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The weekday shown in the leftmost grid column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, DeserializeFromStr)]
pub struct WeekStart(Weekday);

impl WeekStart {
    pub fn new(weekday: Weekday) -> Self {
        WeekStart(weekday)
    }

    pub fn weekday(&self) -> Weekday {
        self.0
    }

    /// Column index of `weekday` when weeks start on `self`.
    pub fn column_of(&self, weekday: Weekday) -> u32 {
        (weekday.num_days_from_sunday() + DAYS_PER_WEEK - self.0.num_days_from_sunday())
            % DAYS_PER_WEEK
    }

    /// Abbreviated weekday names in column order.
    pub fn labels(&self) -> Vec<&'static str> {
        let start = self.0.num_days_from_sunday() as usize;
        WEEKDAY_LABELS
            .iter()
            .cycle()
            .skip(start)
            .take(DAYS_PER_WEEK as usize)
            .copied()
            .collect()
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart(Weekday::Sun)
    }
}

impl FromStr for WeekStart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().parse::<Weekday>().map(WeekStart).map_err(|_| {
            Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not a weekday", s),
            )
        })
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub week: u32,
    pub weekday: u32,
}

impl GridCell {
    pub fn new(week: u32, weekday: u32) -> Self {
        GridCell { week, weekday }
    }
}

/// Column of day 1 of the given month.
pub fn weekday_of_first_day(year: i32, month: u32, week_start: WeekStart) -> Result<u32> {
    let reference = MonthReference::new(year, month)?;
    Ok(week_start.column_of(reference.first_weekday()))
}

/// Cell of `day` (1-based) in a month whose first day sits in column
/// `first_weekday_offset`. Use [`checked_cell_for_day`] for unvalidated days.
///
/// # Panics
///
/// Panics if `day` is 0.
pub fn cell_for_day(day: u32, first_weekday_offset: u32) -> GridCell {
    assert!(day >= 1, "days are 1-based, got day 0");
    let idx = first_weekday_offset + day - 1;

    GridCell {
        week: idx / DAYS_PER_WEEK,
        weekday: idx % DAYS_PER_WEEK,
    }
}

pub fn checked_cell_for_day(
    reference: &MonthReference,
    day: u32,
    week_start: WeekStart,
) -> Result<GridCell> {
    validate_day(reference, day)?;
    Ok(cell_for_day(
        day,
        week_start.column_of(reference.first_weekday()),
    ))
}

/// Number of week rows the month occupies.
pub fn row_count(year: i32, month: u32, week_start: WeekStart) -> Result<u32> {
    let reference = MonthReference::new(year, month)?;
    Ok(rows_of(&reference, week_start))
}

fn rows_of(reference: &MonthReference, week_start: WeekStart) -> u32 {
    let offset = week_start.column_of(reference.first_weekday());
    cell_for_day(reference.days_in_month(), offset).week + 1
}

fn validate_day(reference: &MonthReference, day: u32) -> Result<()> {
    if day == 0 || day > reference.days_in_month() {
        return Err(Error::new(
            ErrorKind::InvalidDay,
            &format!(
                "{} is not within 1..={} for {}",
                day,
                reference.days_in_month(),
                reference
            ),
        ));
    }
    Ok(())
}

/// Places every event dated within `year`/`month` onto its day's cell.
/// Events of other months are skipped.
pub fn assign_events<'a, E, I>(
    events: I,
    year: i32,
    month: u32,
    week_start: WeekStart,
) -> Result<GridAssignment<'a, E>>
where
    E: Dated + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let reference = MonthReference::new(year, month)?;
    Ok(GridAssignment::build(reference, events, week_start))
}

#[derive(Debug, PartialEq)]
pub struct DaySlot<'a, E> {
    pub day: u32,
    pub cell: GridCell,
    pub events: Vec<&'a E>,
}

impl<E> DaySlot<'_, E> {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A month laid out on the grid, with borrowed events attached to days.
#[derive(Debug, PartialEq)]
pub struct GridAssignment<'a, E> {
    month: MonthReference,
    week_start: WeekStart,
    offset: u32,
    days: Vec<DaySlot<'a, E>>,
}

impl<'a, E: Dated> GridAssignment<'a, E> {
    pub fn build<I>(month: MonthReference, events: I, week_start: WeekStart) -> Self
    where
        I: IntoIterator<Item = &'a E>,
    {
        let offset = week_start.column_of(month.first_weekday());

        let mut days: Vec<DaySlot<'a, E>> = (1..=month.days_in_month())
            .map(|day| DaySlot {
                day,
                cell: cell_for_day(day, offset),
                events: Vec::new(),
            })
            .collect();

        let mut skipped = 0usize;
        for event in events {
            let date = event.date();
            if month.contains(&date) {
                days[date.day0() as usize].events.push(event);
            } else {
                skipped += 1;
            }
        }

        log::debug!(
            "grid for {}: {} events placed, {} outside the month",
            month,
            days.iter().map(|d| d.events.len()).sum::<usize>(),
            skipped
        );

        GridAssignment {
            month,
            week_start,
            offset,
            days,
        }
    }
}

impl<'a, E> GridAssignment<'a, E> {
    pub fn month(&self) -> MonthReference {
        self.month
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn first_weekday_offset(&self) -> u32 {
        self.offset
    }

    pub fn row_count(&self) -> u32 {
        self.days.last().map_or(1, |slot| slot.cell.week + 1)
    }

    pub fn days(&self) -> &[DaySlot<'a, E>] {
        &self.days
    }

    pub fn day(&self, day: u32) -> Option<&DaySlot<'a, E>> {
        day.checked_sub(1).and_then(|idx| self.days.get(idx as usize))
    }

    /// Day shown at `cell`, `None` for the padding before day 1 and after
    /// the last day.
    pub fn day_at(&self, cell: GridCell) -> Option<u32> {
        if cell.weekday >= DAYS_PER_WEEK {
            return None;
        }

        let idx = cell.week.checked_mul(DAYS_PER_WEEK)?.checked_add(cell.weekday)?;
        let day = idx.checked_sub(self.offset)? + 1;

        if day as usize <= self.days.len() {
            Some(day)
        } else {
            None
        }
    }

    pub fn events_at(&self, cell: GridCell) -> &[&'a E] {
        match self.day_at(cell) {
            Some(day) => self.events_on(day),
            None => &[],
        }
    }

    pub fn events_on(&self, day: u32) -> &[&'a E] {
        self.day(day)
            .map(|slot| slot.events.as_slice())
            .unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.days.iter().map(|slot| slot.events.len()).sum()
    }

    /// Grid rows top to bottom, padding cells as `None`.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&DaySlot<'a, E>>>> + '_ {
        (0..self.row_count()).map(move |week| {
            (0..DAYS_PER_WEEK)
                .map(|weekday| {
                    self.day_at(GridCell::new(week, weekday))
                        .and_then(|day| self.day(day))
                })
                .collect()
        })
    }
}
