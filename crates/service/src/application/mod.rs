//! Application layer - the positioning facade.

pub mod services;
