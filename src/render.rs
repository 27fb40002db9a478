use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use std::fmt::{self, Display, Write};

use crate::grid::{DaySlot, GridAssignment, DAYS_PER_WEEK};

#[derive(Clone, Debug)]
pub struct Theme {
    pub today_day_char: Option<char>,
    pub event_day_char: Option<char>,
    pub focus_day_char: Option<char>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            today_day_char: Some('*'),
            event_day_char: Some('+'),
            focus_day_char: Some('>'),
        }
    }
}

pub struct DayCell<'a> {
    day_num: u32,
    selected: bool,
    is_today: bool,
    has_events: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    pub const CELL_WIDTH: usize = 4;

    pub fn new(day_num: u32, theme: &'a Theme) -> Self {
        DayCell {
            day_num,
            selected: false,
            is_today: false,
            has_events: false,
            theme,
        }
    }

    pub fn select(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn today(mut self, is_today: bool) -> Self {
        self.is_today = is_today;
        self
    }

    pub fn events(mut self, has_events: bool) -> Self {
        self.has_events = has_events;
        self
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // focus wins over today in the first column
        let lead = if self.selected {
            self.theme.focus_day_char.unwrap_or(' ')
        } else if self.is_today {
            self.theme.today_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        let mark = if self.has_events {
            self.theme.event_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        write!(f, "{}{}{:>2}", lead, mark, self.day_num)
    }
}

pub struct MonthPane<'g, 'a, E> {
    grid: &'g GridAssignment<'a, E>,
    today: Option<NaiveDate>,
    selected: Option<u32>,
    theme: Theme,
}

impl<'g, 'a, E> MonthPane<'g, 'a, E> {
    pub fn new(grid: &'g GridAssignment<'a, E>) -> Self {
        MonthPane {
            grid,
            today: None,
            selected: None,
            theme: Theme::default(),
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn select(mut self, day: u32) -> Self {
        self.selected = Some(day);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn width() -> usize {
        DAYS_PER_WEEK as usize * DayCell::CELL_WIDTH
    }

    fn cell(&self, slot: &DaySlot<'a, E>) -> DayCell<'_> {
        let month = self.grid.month();
        let is_today = self
            .today
            .map_or(false, |t| month.contains(&t) && t.day() == slot.day);

        DayCell::new(slot.day, &self.theme)
            .select(self.selected == Some(slot.day))
            .today(is_today)
            .events(!slot.is_empty())
    }
}

impl<E> Display for MonthPane<'_, '_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:^width$}",
            self.grid.month().title(),
            width = Self::width()
        )?;

        writeln!(
            f,
            "{}",
            self.grid
                .week_start()
                .labels()
                .iter()
                .map(|label| format!("{:>width$}", label, width = DayCell::CELL_WIDTH))
                .join("")
        )?;

        for row in self.grid.rows() {
            let mut line = String::with_capacity(Self::width());
            for slot in row {
                match slot {
                    Some(slot) => write!(line, "{}", self.cell(slot))?,
                    None => write!(line, "{:width$}", "", width = DayCell::CELL_WIDTH)?,
                }
            }
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

/// Heading plus one line per event.
pub fn render_day<'e, E, I>(date: NaiveDate, events: I) -> String
where
    E: Display + 'e,
    I: IntoIterator<Item = &'e E>,
{
    let mut out = format!("{}\n", date.format("%A, %B %-d %Y"));
    let mut empty = true;

    for event in events {
        empty = false;
        out.push_str(&format!("  {}\n", event));
    }

    if empty {
        out.push_str("  no events\n");
    }

    out
}
