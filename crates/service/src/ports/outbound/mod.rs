//! Outbound ports - interfaces the facade consumes.

pub mod sensor_port;

pub use sensor_port::{
    LocationSensorPort, NativeAuthorizationStatus, SensorError, SensorEvent, SensorListener,
    ACCURACY_BEST, ACCURACY_BEST_FOR_NAVIGATION, ACCURACY_HUNDRED_METERS, ACCURACY_KILOMETER,
    ACCURACY_NEAREST_TEN_METERS, ACCURACY_THREE_KILOMETERS,
};
