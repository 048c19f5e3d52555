//! Wayfinder domain types.
//!
//! Pure value objects for the positioning facade: the cached [`Position`]
//! reading and the closed enums describing accuracy levels, authorization
//! states, and permission request classes. No platform types leak in here;
//! translation from native sensor vocabulary happens at the adapter boundary.

pub mod accuracy;
pub mod authorization;
pub mod position;

pub use accuracy::Accuracy;
pub use authorization::{AuthorizationStatus, RequestType};
pub use position::Position;
