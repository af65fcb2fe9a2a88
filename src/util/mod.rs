//! Utility modules for git2s3.

pub mod fan_out_limit;

pub use fan_out_limit::{FanOutLimit, FanOutPermit};
