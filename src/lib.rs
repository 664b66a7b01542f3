// src/lib.rs
//! GPS Uplink Library
//!
//! Reads NMEA sentences from a serial GPS receiver, extracts valid position
//! fixes and delivers each one as a GeoJSON point feature to a remote
//! feature store.

pub mod config;
pub mod error;
pub mod geo;
pub mod gps;
pub mod pipeline;
pub mod update;
pub mod uplink;

// Re-export main types for convenience
pub use config::{Credentials, UplinkConfig};
pub use error::{Result, UplinkError};
pub use gps::{Fix, SentenceOutcome};
pub use pipeline::PipelineStats;
pub use uplink::{FeatureSink, XyzClient};
