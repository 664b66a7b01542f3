// src/gps/mod.rs
//! GPS data handling and parsing

pub mod data;
pub mod nmea;

pub use data::Fix;
pub use nmea::{parse_sentence, SentenceOutcome};
