//! Data transfer objects handed to the presentation layer.

pub mod calendar;
pub mod sessions;
