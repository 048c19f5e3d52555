//! Location Sensor Port - Outbound port for the platform positioning subsystem
//!
//! This port abstracts the device's native positioning sensor, allowing the
//! facade to request permission, tune accuracy, and receive readings without
//! depending on a concrete platform binding.

use wayfinder_domain::{Position, RequestType};

/// Precision constant for navigation-grade readings.
pub const ACCURACY_BEST_FOR_NAVIGATION: f64 = -2.0;
/// Precision constant for the best non-navigation readings.
pub const ACCURACY_BEST: f64 = -1.0;
/// Precision constant for ten-meter readings.
pub const ACCURACY_NEAREST_TEN_METERS: f64 = 10.0;
/// Precision constant for hundred-meter readings.
pub const ACCURACY_HUNDRED_METERS: f64 = 100.0;
/// Precision constant for kilometer readings.
pub const ACCURACY_KILOMETER: f64 = 1000.0;
/// Precision constant for three-kilometer readings.
pub const ACCURACY_THREE_KILOMETERS: f64 = 3000.0;

/// Authorization state as the platform reports it.
///
/// This is the sensor's closed native set. It is translated into the
/// domain's `AuthorizationStatus` at the adapter boundary, where `Restricted`
/// collapses into denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeAuthorizationStatus {
    /// The user has not been prompted yet
    NotDetermined,
    /// Platform policy (parental controls, MDM) forbids location access
    Restricted,
    /// The user refused access
    Denied,
    /// Access granted while the application is in use
    AuthorizedWhenInUse,
    /// Access granted at any time
    AuthorizedAlways,
}

/// Failure reported by the sensor instead of a reading.
///
/// Delivery errors are non-fatal to the facade: a pending bounded retrieval
/// keeps waiting for either a reading or its timeout.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SensorError {
    /// The sensor could not determine a position right now
    #[error("sensor could not determine a position")]
    LocationUnknown,
    /// The user has denied location access
    #[error("location permission denied")]
    PermissionDenied,
    /// The positioning hardware is unavailable
    #[error("positioning sensor unavailable")]
    SensorUnavailable,
    /// Any other platform-reported failure
    #[error("platform error: {0}")]
    Platform(String),
}

/// Asynchronous notification from the sensor.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    /// One or more fresh readings, oldest first. The facade uses only the
    /// most recent entry.
    PositionsUpdated(Vec<Position>),
    /// The platform authorization state changed
    AuthorizationChanged(NativeAuthorizationStatus),
    /// The sensor failed to produce a reading
    Error(SensorError),
}

/// Listener callback registered by the facade.
///
/// Invoked on the sensor's own delivery context, which may differ from the
/// caller-facing context.
pub type SensorListener = Box<dyn FnMut(SensorEvent) + Send + 'static>;

/// Location Sensor Port trait for the platform positioning subsystem.
///
/// Commands are fire-and-forget: effects surface later as [`SensorEvent`]s
/// through the registered listener. Start/stop are idempotent on real
/// hardware; implementations must tolerate redundant calls.
///
/// NOTE: This trait is intentionally **object-safe** so the facade can hold
/// an `Arc<dyn LocationSensorPort>` without depending on concrete platform
/// bindings.
pub trait LocationSensorPort: Send + Sync {
    /// Current authorization state (synchronous query)
    fn authorization_status(&self) -> NativeAuthorizationStatus;

    /// Prompt the user for the given permission class.
    ///
    /// The outcome arrives later as an `AuthorizationChanged` event.
    fn request_permission(&self, request_type: RequestType) -> anyhow::Result<()>;

    /// Set the desired precision for subsequent readings
    fn set_desired_accuracy(&self, value: f64);

    /// Ask for a single reading, delivered as a `PositionsUpdated` event
    fn request_one_shot_location(&self) -> anyhow::Result<()>;

    /// Begin continuous position updates
    fn start_continuous_updates(&self);

    /// Stop continuous position updates
    fn stop_continuous_updates(&self);

    /// Register the event listener. The facade registers exactly one
    /// listener at construction; a later registration replaces it.
    fn subscribe(&self, listener: SensorListener);
}
