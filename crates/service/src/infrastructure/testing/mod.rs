//! Test doubles for the outbound ports.

pub mod mock_sensor_port;

pub use mock_sensor_port::MockLocationSensorPort;
