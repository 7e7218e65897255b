//! Utilities shared by the Postwatch binaries and their tests.

pub mod logger;
pub mod time;
