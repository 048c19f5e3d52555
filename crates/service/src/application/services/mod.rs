//! Application services.

pub mod location_service;

pub use location_service::{
    AuthorizationSubscriber, LocationService, PositionCompletion, UpdateSubscriber,
};
