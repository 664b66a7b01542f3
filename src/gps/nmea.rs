// src/gps/nmea.rs
//! NMEA sentence validation and fix extraction

use super::data::Fix;
use crate::error::{Result, UplinkError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Result of parsing one well-formed sentence.
///
/// Only RMC (recommended minimum) sentences carry the position we report;
/// every other sentence type is ignored without producing an update, as is
/// an RMC sentence whose receiver has not yet acquired a fix.
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceOutcome {
    Fix(Fix),
    Ignored,
}

/// Parse and validate a single NMEA sentence.
///
/// Malformed framing or a checksum mismatch is a parse error; a valid
/// sentence of an uninteresting type is `Ignored`, which is not an error.
pub fn parse_sentence(line: &str) -> Result<SentenceOutcome> {
    let body = validate_frame(line)?;
    let fields: Vec<&str> = body.split(',').collect();

    let tag = fields[0];
    if tag.len() == 5 && tag.ends_with("RMC") {
        parse_rmc(&fields)
    } else {
        Ok(SentenceOutcome::Ignored)
    }
}

/// Check `$...*HH` framing and the XOR checksum, returning the sentence
/// body between `$` and `*`.
fn validate_frame(line: &str) -> Result<&str> {
    let inner = line
        .strip_prefix('$')
        .ok_or_else(|| UplinkError::Parse(format!("missing '$' start delimiter: {:?}", line)))?;

    let (body, checksum) = inner
        .rsplit_once('*')
        .ok_or_else(|| UplinkError::Parse(format!("missing '*' checksum delimiter: {:?}", line)))?;

    if checksum.len() != 2 {
        return Err(UplinkError::Parse(format!(
            "invalid checksum field {:?}",
            checksum
        )));
    }
    let expected = u8::from_str_radix(checksum, 16)
        .map_err(|_| UplinkError::Parse(format!("invalid checksum field {:?}", checksum)))?;

    let actual = body.bytes().fold(0u8, |acc, b| acc ^ b);
    if actual != expected {
        return Err(UplinkError::Parse(format!(
            "checksum mismatch: computed {:02X}, sentence says {:02X}",
            actual, expected
        )));
    }

    Ok(body)
}

/// Extract a fix from an RMC (Recommended Minimum Course) sentence.
fn parse_rmc(fields: &[&str]) -> Result<SentenceOutcome> {
    if fields.len() < 10 {
        return Err(UplinkError::Parse(format!(
            "RMC sentence has {} fields, expected at least 10",
            fields.len()
        )));
    }

    // Status (field 2): 'A' is active, 'V' is void (no fix yet)
    if fields[2] != "A" {
        return Ok(SentenceOutcome::Ignored);
    }

    let latitude = parse_coordinate(fields[3], fields[4])?;
    let longitude = parse_coordinate(fields[5], fields[6])?;
    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        // Empty coordinate fields also mean the receiver has no fix
        _ => return Ok(SentenceOutcome::Ignored),
    };

    let mut fix = Fix::new(latitude, longitude);
    if !fix.has_position() {
        // Exactly-zero coordinates are the "no fix yet" sentinel
        return Ok(SentenceOutcome::Ignored);
    }

    // Speed over ground in knots (field 7)
    if !fields[7].is_empty() {
        if let Ok(speed_knots) = fields[7].parse::<f64>() {
            fix.speed = Some(speed_knots * 1.852); // Convert knots to km/h
        }
    }

    // Course over ground in degrees (field 8)
    if !fields[8].is_empty() {
        if let Ok(course) = fields[8].parse::<f64>() {
            fix.course = Some(course);
        }
    }

    fix.timestamp = parse_timestamp(fields[1], fields[9]);

    Ok(SentenceOutcome::Fix(fix))
}

/// Convert a `ddmm.mmmm` coordinate and its hemisphere letter to signed
/// degrees. Empty fields yield `None`.
fn parse_coordinate(value: &str, hemisphere: &str) -> Result<Option<f64>> {
    if value.is_empty() || hemisphere.is_empty() {
        return Ok(None);
    }

    let raw = value.parse::<f64>().map_err(|_| {
        UplinkError::Parse(format!("invalid coordinate field {:?}", value))
    })?;

    let degrees = (raw / 100.0) as i32;
    let minutes = raw % 100.0;
    let mut signed = degrees as f64 + minutes / 60.0;

    match hemisphere {
        "N" | "E" => {}
        "S" | "W" => signed = -signed,
        other => {
            return Err(UplinkError::Parse(format!(
                "invalid hemisphere {:?}",
                other
            )))
        }
    }

    Ok(Some(signed))
}

/// Combine the RMC time (`hhmmss[.ss]`) and date (`ddmmyy`) fields into a
/// UTC timestamp. Unparseable fields are tolerated as `None`.
fn parse_timestamp(time: &str, date: &str) -> Option<DateTime<Utc>> {
    let time = time.split('.').next()?;
    let time = NaiveTime::parse_from_str(time, "%H%M%S").ok()?;
    let date = NaiveDate::parse_from_str(date, "%d%m%y").ok()?;
    Some(date.and_time(time).and_utc())
}
