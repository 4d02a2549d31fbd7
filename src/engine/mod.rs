//! engine
//!
//! Registry, interpreter and generator.
//!
//! # Architecture
//!
//! The engine is built around one value, [`Registry<C>`], populated once at
//! startup and then shared read-only:
//!
//! 1. **Register**: record types ([`RecordRegistration`]), custom commands
//!    ([`CustomCommand`]) and custom converters
//! 2. **Run**: [`Registry::run`] tokenizes a line, converts each token and
//!    applies it to the context
//! 3. **Generate**: [`Registry::generate_command`] turns a record back into
//!    the line that recreates it
//!
//! # Command Lifecycle
//!
//! ```text
//! tokenize -> dispatch (add | custom) -> convert -> bind
//! ```
//!
//! # Invariants
//!
//! - Registration needs `&mut Registry`; everything else takes `&Registry`
//! - `add` is reserved and always means create-or-update
//! - Conversion never creates records
//! - A failing line leaves earlier bindings in place

pub mod command;
pub mod convert;
pub mod errors;
pub mod generate;
pub mod registry;
pub mod runner;

pub use command::{CommandHandler, CommandOutcome, CustomCommand, InvokeError, Param};
pub use errors::{ArityBound, BoxError, RegistryError, ScriptError};
pub use generate::GenerateOptions;
pub use registry::{
    Acquire, CustomConverter, Field, FieldInfo, FieldSnapshot, Method, MethodInfo,
    RecordRegistration, RecordSchema, Registry,
};
