//! Community compatibility scoring for the Mentara platform.

pub mod config;
pub mod error;
pub mod matching;
pub mod telemetry;
