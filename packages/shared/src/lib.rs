//! Utilities shared by the Teamroom packages.

pub mod logger;
pub mod time;
