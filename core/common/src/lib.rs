//! Common types shared across Drivelink modules.

pub mod error;

pub use error::{Error, Result};
