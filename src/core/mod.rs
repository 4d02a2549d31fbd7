//! core
//!
//! Core types and text handling for seedline.
//!
//! # Modules
//!
//! - [`tokenize`] - Command line tokenizer and quoting
//! - [`types`] - Type descriptors, dynamic values and the `FieldType` bridge
//! - [`formats`] - Fixed textual formats for dates and time spans
//! - [`naming`] - Case-insensitive naming rules
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Tokenizing never fails; conversion reports precise errors
//! - Formats are strict and culture-independent
//! - Schemas are strict and self-describing

pub mod config;
pub mod formats;
pub mod naming;
pub mod tokenize;
pub mod types;
