//! Core types and error handling for the launcher.

pub mod error;

pub use error::{ErrorContext, LiftoffError, user_friendly_error};
