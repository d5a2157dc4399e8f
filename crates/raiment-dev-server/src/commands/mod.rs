//! Command implementations.
//!
//! - [`serve`] - run the development server until Ctrl+C

pub mod serve;

pub use serve::execute as serve_execute;
