//! Wayfinder positioning facade.
//!
//! A small, testable surface over a device's positioning sensor: request
//! permission, subscribe to continuous updates, and fetch the most recent
//! known position with a bounded wait. The platform sensor sits behind the
//! outbound [`LocationSensorPort`] trait; [`LocationService`] is the facade
//! application code talks to.
//!
//! [`LocationSensorPort`]: ports::outbound::LocationSensorPort
//! [`LocationService`]: application::services::LocationService

pub mod application;
pub mod infrastructure;
pub mod ports;

// Re-export commonly used entrypoints
pub use application::services::LocationService;
pub use ports::outbound::{LocationSensorPort, NativeAuthorizationStatus, SensorError, SensorEvent};
