//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All terminal output from the binary goes through this module so quiet
//! mode is honored in one place.

pub mod output;
