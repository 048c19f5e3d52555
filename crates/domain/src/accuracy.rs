//! Desired accuracy levels for the positioning sensor.

use serde::{Deserialize, Serialize};

/// How precise the caller wants sensor readings to be.
///
/// Higher precision costs more power on real hardware. Each level maps to a
/// fixed platform precision constant; that mapping lives at the adapter
/// boundary so the domain stays platform-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    /// Highest precision the hardware offers, intended for turn-by-turn use
    BestForNavigation,
    /// Best precision available without navigation-grade power draw
    Best,
    /// Within roughly ten meters
    NearestTenMeters,
    /// Within roughly a hundred meters
    HundredMeters,
    /// Within roughly a kilometer
    Kilometer,
    /// Within roughly three kilometers
    ThreeKilometers,
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Accuracy::BestForNavigation => "best-for-navigation",
            Accuracy::Best => "best",
            Accuracy::NearestTenMeters => "nearest-ten-meters",
            Accuracy::HundredMeters => "hundred-meters",
            Accuracy::Kilometer => "kilometer",
            Accuracy::ThreeKilometers => "three-kilometers",
        };
        write!(f, "{label}")
    }
}
