//! Supporting utilities for the CLI.

pub mod logging;
pub mod parsing;
