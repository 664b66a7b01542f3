// src/geo.rs
//! GeoJSON point-feature encoding
//!
//! The feature store expects a single-feature collection with one Point
//! geometry. GeoJSON orders coordinates [longitude, latitude], the reverse
//! of how positions are usually spoken and of how the parser yields them.

use crate::error::{Result, UplinkError};
use crate::gps::Fix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated coordinate pair, both axes non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting the zero "no fix yet" sentinel on either axis.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude == 0.0 || longitude == 0.0 {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// [longitude, latitude]
    pub coordinates: [f64; 2],
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<f64>,
}

/// Encode one fix as a single-feature GeoJSON collection.
///
/// Pure and deterministic: the same fix always yields byte-identical output.
/// A fix without a real position cannot be encoded; the pipeline filters
/// those out before calling here, so hitting that error means an invariant
/// was broken upstream.
pub fn encode_fix(fix: &Fix) -> Result<Vec<u8>> {
    let point = GeoPoint::new(fix.latitude, fix.longitude).ok_or_else(|| {
        UplinkError::Other("attempted to encode a fix without a position".to_string())
    })?;

    let collection = FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features: vec![Feature {
            kind: "Feature".to_string(),
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: [point.longitude, point.latitude],
            },
            properties: Properties {
                timestamp: fix.timestamp,
                speed_kmh: fix.speed,
                course: fix.course,
            },
        }],
    };

    Ok(serde_json::to_vec(&collection)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order_is_lon_lat() {
        let fix = Fix::new(48.1173, 11.5167);
        let payload = encode_fix(&fix).unwrap();

        let collection: FeatureCollection = serde_json::from_slice(&payload).unwrap();
        let coords = collection.features[0].geometry.coordinates;
        // Longitude first, latitude second
        assert_eq!(coords[0], 11.5167);
        assert_eq!(coords[1], 48.1173);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let fix = Fix::new(-33.865143, 151.2099);
        let payload = encode_fix(&fix).unwrap();

        let collection: FeatureCollection = serde_json::from_slice(&payload).unwrap();
        let coords = collection.features[0].geometry.coordinates;
        assert_eq!(coords, [151.2099, -33.865143]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut fix = Fix::new(48.1173, 11.5167);
        fix.speed = Some(41.4848);
        fix.course = Some(84.4);

        assert_eq!(encode_fix(&fix).unwrap(), encode_fix(&fix).unwrap());
    }

    #[test]
    fn test_structure_markers() {
        let fix = Fix::new(48.1173, 11.5167);
        let payload = encode_fix(&fix).unwrap();

        let collection: FeatureCollection = serde_json::from_slice(&payload).unwrap();
        assert_eq!(collection.kind, "FeatureCollection");
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].kind, "Feature");
        assert_eq!(collection.features[0].geometry.kind, "Point");
    }

    #[test]
    fn test_zero_sentinel_rejected() {
        assert!(GeoPoint::new(0.0, 11.5167).is_none());
        assert!(GeoPoint::new(48.1173, 0.0).is_none());
        assert!(encode_fix(&Fix::new(0.0, 11.5167)).is_err());
    }

    #[test]
    fn test_properties_carried() {
        let mut fix = Fix::new(48.1173, 11.5167);
        fix.speed = Some(41.4848);
        fix.course = Some(84.4);

        let payload = encode_fix(&fix).unwrap();
        let collection: FeatureCollection = serde_json::from_slice(&payload).unwrap();
        let props = &collection.features[0].properties;
        assert_eq!(props.speed_kmh, Some(41.4848));
        assert_eq!(props.course, Some(84.4));
        assert!(props.timestamp.is_none());
    }
}
