use std::convert::From;
use std::error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    InvalidMonth,
    InvalidDay,
    ConfigParse,
    CalendarParse,
    CalendarNotFound,
    EventNotFound,
    DateParse,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn is_invalid_month(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidMonth)
    }

    pub fn is_invalid_day(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidDay)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::DateParse,
            format!("Could not parse date: {}", parse_error).as_str(),
        )
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::new(ErrorKind::CalendarParse, &error.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(error: toml::ser::Error) -> Self {
        Error::new(
            ErrorKind::CalendarParse,
            &format!("Could not serialize calendar: {}", error),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::InvalidMonth => "month out of range".to_owned(),
            ErrorKind::InvalidDay => "day out of range".to_owned(),
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::CalendarParse => "invalid calendar format".to_owned(),
            ErrorKind::CalendarNotFound => "no such calendar".to_owned(),
            ErrorKind::EventNotFound => "no such event".to_owned(),
            ErrorKind::DateParse => "invalid date format".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}
