use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{CalendarSpec, Config};
use crate::error::{Error, ErrorKind, Result};
use crate::event::Event;
use crate::month::MonthReference;

#[derive(Default, Serialize, Deserialize)]
struct CalendarFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, rename = "event")]
    events: Vec<Event>,
}

/// A named list of events backed by one TOML file.
#[derive(Clone, Debug)]
pub struct Calendar {
    name: String,
    path: PathBuf,
    events: Vec<Event>,
}

impl Calendar {
    pub fn new(name: &str, path: &Path) -> Self {
        Calendar {
            name: name.to_owned(),
            path: path.to_owned(),
            events: Vec::new(),
        }
    }

    /// Reads the calendar at `path`. A missing file yields an empty
    /// calendar that is created on the first [`Calendar::save`].
    ///
    /// The name is taken from `name`, then from the file, then from the
    /// file stem.
    pub fn open(path: &Path, name: Option<&str>) -> Result<Self> {
        let file = match fs::read_to_string(path) {
            Ok(content) => toml::from_str::<CalendarFile>(&content).map_err(|e| {
                Error::new(
                    ErrorKind::CalendarParse,
                    &format!("{}: {}", path.display(), e),
                )
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("Calendar '{}' does not exist yet", path.display());
                CalendarFile::default()
            }
            Err(e) => return Err(e.into()),
        };

        let name = name
            .map(str::to_owned)
            .or(file.name)
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "Untitled".to_owned());

        let mut events = file.events;
        events.sort();

        Ok(Calendar {
            name,
            path: path.to_owned(),
            events,
        })
    }

    pub fn from_spec(spec: &CalendarSpec) -> Result<Self> {
        Calendar::open(&spec.path, spec.name.as_deref())
    }

    pub fn save(&self) -> Result<()> {
        let file = CalendarFile {
            name: Some(self.name.clone()),
            events: self.events.clone(),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        log::info!(
            "Wrote {} events of '{}' to '{}'",
            self.events.len(),
            self.name,
            self.path.display()
        );

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn add_event(&mut self, event: Event) {
        let idx = self.events.partition_point(|e| e <= &event);
        self.events.insert(idx, event);
    }

    /// Removes the first event called `title` on `date`.
    pub fn remove_event(&mut self, title: &str, date: NaiveDate) -> Result<Event> {
        let idx = self
            .events
            .iter()
            .position(|e| e.date == date && e.title == title)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::EventNotFound,
                    &format!("'{}' on {} in '{}'", title, date, self.name),
                )
            })?;

        Ok(self.events.remove(idx))
    }

    pub fn events_of_month<'a>(
        &'a self,
        month: &'a MonthReference,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| month.contains(&e.date))
    }

    pub fn events_of_day<'a>(&'a self, date: NaiveDate) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.date == date)
    }
}

pub struct Agenda {
    calendars: Vec<Calendar>,
}

impl Agenda {
    pub fn new(calendars: Vec<Calendar>) -> Self {
        Agenda { calendars }
    }

    /// Loads every configured calendar. Calendars that fail to load are
    /// logged and left out.
    pub fn from_config(config: &Config) -> Self {
        let calendars = config
            .calendars
            .iter()
            .map(Calendar::from_spec)
            .inspect(|c| {
                if let Err(e) = c {
                    log::warn!("{}", e)
                }
            })
            .filter_map(Result::ok)
            .collect();

        Agenda { calendars }
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    pub fn calendar(&self, name: &str) -> Result<&Calendar> {
        self.calendars
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::new(ErrorKind::CalendarNotFound, name))
    }

    pub fn calendar_mut(&mut self, name: &str) -> Result<&mut Calendar> {
        self.calendars
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::new(ErrorKind::CalendarNotFound, name))
    }

    /// Drops the calendar from the agenda and deletes its file.
    pub fn remove_calendar(&mut self, name: &str) -> Result<Calendar> {
        let idx = self
            .calendars
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::new(ErrorKind::CalendarNotFound, name))?;

        let path = &self.calendars[idx].path;
        match fs::remove_file(path) {
            Ok(()) => log::info!("Deleted '{}'", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(self.calendars.remove(idx))
    }

    pub fn events_of_month<'a>(
        &'a self,
        month: &'a MonthReference,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.calendars
            .iter()
            .flat_map(move |calendar| calendar.events_of_month(month))
    }

    pub fn events_of_day<'a>(&'a self, date: NaiveDate) -> impl Iterator<Item = &'a Event> + 'a {
        self.calendars
            .iter()
            .flat_map(move |calendar| calendar.events_of_day(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const WORK: &str = r#"
name = "Work"

[[event]]
title = "Review"
date = "2024-02-20"
time = "14:00"

[[event]]
title = "Planning"
date = "2024-02-05"

[[event]]
title = "Offsite"
date = "2024-03-01"
"#;

    #[test]
    fn open_sorts_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work.toml");
        fs::write(&path, WORK).unwrap();

        let calendar = Calendar::open(&path, None).unwrap();
        assert_eq!(calendar.name(), "Work");
        assert_eq!(calendar.events()[0].title, "Planning");

        let renamed = Calendar::open(&path, Some("Job")).unwrap();
        assert_eq!(renamed.name(), "Job");

        let feb = MonthReference::new(2024, 2).unwrap();
        assert_eq!(calendar.events_of_month(&feb).count(), 2);
    }

    #[test]
    fn missing_file_is_empty_calendar_named_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        let calendar = Calendar::open(&dir.path().join("home.toml"), None).unwrap();

        assert_eq!(calendar.name(), "home");
        assert!(calendar.events().is_empty());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[event]]\ntitle = 3\n").unwrap();

        let err = Calendar::open(&path, None).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CalendarParse));
    }

    #[test]
    fn add_save_reload_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal").join("home.toml");

        let mut calendar = Calendar::new("Home", &path);
        calendar.add_event(
            Event::allday("Dentist", date(2024, 2, 14))
                .with_time(NaiveTime::from_hms_opt(10, 15, 0).unwrap()),
        );
        calendar.add_event(Event::allday("Birthday", date(2024, 2, 14)));
        calendar.add_event(Event::allday("Earlier", date(2024, 2, 1)));
        calendar.save().unwrap();

        let mut reloaded = Calendar::open(&path, None).unwrap();
        assert_eq!(reloaded.name(), "Home");
        let titles: Vec<&str> = reloaded.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Earlier", "Birthday", "Dentist"]);
        assert_eq!(reloaded.events()[2].time, NaiveTime::from_hms_opt(10, 15, 0));

        let removed = reloaded.remove_event("Birthday", date(2024, 2, 14)).unwrap();
        assert_eq!(removed.title, "Birthday");
        assert!(matches!(
            reloaded
                .remove_event("Birthday", date(2024, 2, 14))
                .unwrap_err()
                .kind,
            ErrorKind::EventNotFound
        ));
    }

    #[test]
    fn agenda_skips_broken_calendars() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work.toml");
        let broken = dir.path().join("broken.toml");
        fs::write(&work, WORK).unwrap();
        fs::write(&broken, "not = [valid").unwrap();

        let config = Config {
            calendars: vec![
                CalendarSpec {
                    name: None,
                    path: work,
                },
                CalendarSpec {
                    name: None,
                    path: broken,
                },
            ],
            ..Config::default()
        };

        let agenda = Agenda::from_config(&config);
        assert_eq!(agenda.calendars().len(), 1);
        assert!(agenda.calendar("Work").is_ok());
        assert!(agenda.calendar("broken").is_err());
        assert_eq!(agenda.events_of_day(date(2024, 3, 1)).count(), 1);
    }

    #[test]
    fn remove_calendar_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work.toml");
        fs::write(&path, WORK).unwrap();

        let mut agenda = Agenda::new(vec![Calendar::open(&path, None).unwrap()]);
        let removed = agenda.remove_calendar("Work").unwrap();

        assert_eq!(removed.events().len(), 3);
        assert!(!path.exists());
        assert!(agenda.calendars().is_empty());
        assert!(matches!(
            agenda.remove_calendar("Work").unwrap_err().kind,
            ErrorKind::CalendarNotFound
        ));
    }

    #[test]
    fn failed_delete_keeps_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work.toml");
        fs::create_dir(&path).unwrap();

        let mut agenda = Agenda::new(vec![Calendar::new("Work", &path)]);
        let err = agenda.remove_calendar("Work").unwrap_err();

        assert!(matches!(err.kind, ErrorKind::IOError(_)));
        assert_eq!(agenda.calendars().len(), 1);
        assert!(agenda.calendar("Work").is_ok());
        assert!(path.is_dir());
    }
}
