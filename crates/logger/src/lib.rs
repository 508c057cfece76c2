//! Shared tracing setup for the sitewatch binaries.

mod subscriber;

pub use subscriber::{LogFormat, init, init_with_level};
