//! Position value object
//!
//! A single sensor reading. The facade caches the most recent one and
//! forwards it to subscribers; it never inspects or merges readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One positioning fix as delivered by the sensor.
///
/// Immutable data. `horizontal_accuracy` is the radius of uncertainty in
/// meters around the coordinate; `altitude` is absent when the sensor could
/// not determine it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude above sea level in meters, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Radius of uncertainty around the coordinate, in meters
    pub horizontal_accuracy: f64,
    /// When the sensor produced this reading
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// Build a reading stamped with the current time.
    pub fn new(latitude: f64, longitude: f64, horizontal_accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            horizontal_accuracy,
            timestamp: Utc::now(),
        }
    }

    /// Same coordinate with an altitude attached.
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) ±{:.0}m",
            self.latitude, self.longitude, self.horizontal_accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let pos = Position::new(48.8584, 2.2945, 12.0).with_altitude(35.0);
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, back);
    }

    #[test]
    fn test_altitude_omitted_when_absent() {
        let pos = Position::new(0.0, 0.0, 5.0);
        let json = serde_json::to_string(&pos).unwrap();
        assert!(!json.contains("altitude"));
    }

    #[test]
    fn test_display_rounds_accuracy() {
        let pos = Position::new(48.8584, 2.2945, 12.4);
        assert_eq!(format!("{pos}"), "(48.858400, 2.294500) ±12m");
    }
}
