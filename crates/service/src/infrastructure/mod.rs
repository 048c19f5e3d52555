//! Infrastructure adapters and boundary converters.

pub mod converters;
pub mod testing;
