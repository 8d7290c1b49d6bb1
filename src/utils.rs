//! Utility functions and helpers.

pub mod spinner;
pub mod text;

pub use spinner::Spinner;
