//! seedline - Plain-text command scripts for seeding typed data
//!
//! seedline reads lines like `add book b1 "Dune" --Year=1965` and applies
//! them to an application's own data structures, and turns those structures
//! back into the lines that recreate them.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Registry, interpreter, converter and generator
//! - [`core`] - Tokenizer, type descriptors, formats, naming and config
//! - [`demo`] - A sample library context used by the binary
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A generated line run against a fresh context recreates the record
//! 2. `add` with an existing key updates that record, never duplicates it
//! 3. Conversion never creates records
//! 4. Registration errors are reported at startup, not at run time

pub mod cli;
pub mod core;
pub mod demo;
pub mod engine;
pub mod ui;
