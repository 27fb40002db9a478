use chrono::{NaiveDate, NaiveTime};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Anything that happens on a calendar date and can therefore be placed
/// on a month grid.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}

impl<T: Dated + ?Sized> Dated for &T {
    fn date(&self) -> NaiveDate {
        (**self).date()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Constructor, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    pub fn allday(title: &str, date: NaiveDate) -> Self {
        Event::new(title.to_owned(), date, None, None)
    }

    pub fn is_allday(&self) -> bool {
        self.time.is_none()
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

impl Dated for Event {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

// All-day events sort before timed events on the same date.
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.date, self.time, &self.title, &self.description).cmp(&(
            other.date,
            other.time,
            &other.title,
            &other.description,
        ))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", time.format("%H:%M"), self.title)?,
            None => write!(f, "all-day {}", self.title)?,
        }

        if let Some(desc) = &self.description {
            write!(f, " ({})", desc)?;
        }

        Ok(())
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| NaiveTime::parse_from_str(&s, FORMAT).map_err(de::Error::custom))
            .transpose()
    }
}
