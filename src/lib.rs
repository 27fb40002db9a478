pub mod agenda;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod month;
pub mod render;

pub use error::{Error, ErrorKind, Result};
