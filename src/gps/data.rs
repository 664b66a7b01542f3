// src/gps/data.rs
//! Position fix data structures

use chrono::{DateTime, Utc};

/// One validated position/velocity fix extracted from an RMC sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,  // km/h
    pub course: Option<f64>, // degrees
    pub timestamp: Option<DateTime<Utc>>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed: None,
            course: None,
            timestamp: None,
        }
    }

    /// A coordinate of exactly zero on either axis is the receiver's
    /// "no fix yet" sentinel, not a real position.
    pub fn has_position(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}
