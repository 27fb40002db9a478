extern crate calgrid as lib;

use chrono::{Local, NaiveDate, NaiveTime};
use flexi_logger::{FileSpec, Logger};
use lib::agenda::Agenda;
use lib::config::Config;
use lib::event::Event;
use lib::grid::GridAssignment;
use lib::month::MonthReference;
use lib::render::{render_day, MonthPane};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "cg", about = "calgrid - month grids of your calendars.")]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Show the month grid
    Show {
        #[structopt(short = "m", long = "month", help = "month to show as YYYY-MM")]
        month: Option<MonthReference>,
        #[structopt(long = "calendar", help = "only show events of this calendar")]
        calendar: Option<String>,
        #[structopt(long = "next", default_value = "0", help = "move N months forward")]
        next: u32,
        #[structopt(long = "prev", default_value = "0", help = "move N months back")]
        prev: u32,
    },
    /// List the events of a day
    Day {
        #[structopt(help = "date as YYYY-MM-DD")]
        date: NaiveDate,
        #[structopt(long = "calendar")]
        calendar: Option<String>,
    },
    /// Add an event to a calendar
    Add {
        #[structopt(long = "calendar")]
        calendar: String,
        #[structopt(long = "date", help = "date as YYYY-MM-DD")]
        date: NaiveDate,
        #[structopt(long = "time", help = "start as HH:MM, all-day if omitted", parse(try_from_str = parse_time))]
        time: Option<NaiveTime>,
        #[structopt(long = "description")]
        description: Option<String>,
        title: String,
    },
    /// Remove an event from a calendar
    Remove {
        #[structopt(long = "calendar")]
        calendar: String,
        #[structopt(long = "date", help = "date as YYYY-MM-DD")]
        date: NaiveDate,
        title: String,
    },
    /// List the configured calendars
    Calendars,
    /// Delete a calendar and its file
    DeleteCalendar { name: String },
}

fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M")
}

fn show(
    agenda: &Agenda,
    config: &Config,
    month: MonthReference,
    calendar: Option<&str>,
) -> lib::Result<()> {
    let events: Vec<&Event> = match calendar {
        Some(name) => agenda.calendar(name)?.events_of_month(&month).collect(),
        None => agenda.events_of_month(&month).collect(),
    };

    let grid = GridAssignment::build(month, events.iter().copied(), config.week_start);
    print!(
        "{}",
        MonthPane::new(&grid).today(Local::now().date_naive())
    );

    for slot in grid.days().iter().filter(|slot| !slot.is_empty()) {
        for event in slot.events.iter() {
            println!("{:>2}  {}", slot.day, event);
        }
    }

    Ok(())
}

fn run(args: Args) -> lib::Result<()> {
    let config = Config::find_or_default(args.configfile.as_deref())?;
    let mut agenda = Agenda::from_config(&config);

    match args.cmd.unwrap_or(Command::Show {
        month: None,
        calendar: None,
        next: 0,
        prev: 0,
    }) {
        Command::Show {
            month,
            calendar,
            next,
            prev,
        } => {
            let month = month.unwrap_or_else(MonthReference::current) + next - prev;
            show(&agenda, &config, month, calendar.as_deref())?;
        }
        Command::Day { date, calendar } => {
            let events: Vec<&Event> = match calendar.as_deref() {
                Some(name) => agenda.calendar(name)?.events_of_day(date).collect(),
                None => agenda.events_of_day(date).collect(),
            };
            print!("{}", render_day(date, events.iter().copied()));
        }
        Command::Add {
            calendar,
            date,
            time,
            description,
            title,
        } => {
            let calendar = agenda.calendar_mut(&calendar)?;
            calendar.add_event(Event::new(title, date, time, description));
            calendar.save()?;
        }
        Command::Remove {
            calendar,
            date,
            title,
        } => {
            let calendar = agenda.calendar_mut(&calendar)?;
            let removed = calendar.remove_event(&title, date)?;
            calendar.save()?;
            println!("Removed {} on {}", removed, removed.date);
        }
        Command::Calendars => {
            for calendar in agenda.calendars() {
                println!(
                    "{} ({} events, {})",
                    calendar.name(),
                    calendar.events().len(),
                    calendar.path().display()
                );
            }
        }
        Command::DeleteCalendar { name } => {
            let removed = agenda.remove_calendar(&name)?;
            println!("Deleted calendar '{}'", removed.name());
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    run(args)?;

    Ok(())
}
