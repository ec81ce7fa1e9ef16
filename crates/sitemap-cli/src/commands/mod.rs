//! Command implementations.

mod resolve;

pub use resolve::resolve;
