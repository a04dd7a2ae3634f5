//! Shared utilities for the Kaiwa chat client.

pub mod logger;
pub mod time;
