//! Port definitions for the positioning facade.

pub mod outbound;
