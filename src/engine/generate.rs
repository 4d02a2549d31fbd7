//! engine::generate
//!
//! Turns records back into `add` commands, and builds usage text.
//!
//! # Output
//!
//! A generated line has the record name, the quoted identity, positional
//! values while they are set and then `--Field=value` pairs, in declaration
//! order. Running the line against a fresh context recreates a record with
//! the same field values.
//!
//! # Example
//!
//! ```
//! use seedline::engine::{Field, GenerateOptions, RecordRegistration, Registry};
//!
//! #[derive(Default)]
//! struct Atlas {
//!     cities: Vec<City>,
//! }
//!
//! #[derive(Default)]
//! struct City {
//!     code: String,
//!     name: String,
//!     population: u64,
//! }
//!
//! let mut registry = Registry::<Atlas>::new();
//! registry
//!     .register(
//!         RecordRegistration::new("city")
//!             .collection(|atlas: &mut Atlas| &mut atlas.cities)
//!             .identity("Code", |c: &City| &c.code, |c, v| c.code = v)
//!             .positional(Field::new("Name", |c: &City| &c.name, |c, v| c.name = v))
//!             .field(Field::new("Population", |c: &City| &c.population, |c, v| c.population = v)),
//!     )
//!     .unwrap();
//!
//! let city = City { code: "nyc".into(), name: "New York".into(), population: 0 };
//! let line = registry.generate_command(&city, &GenerateOptions::default()).unwrap();
//! assert_eq!(line, r#"add city nyc "New York""#);
//! ```

use std::fmt::Write as _;

use super::errors::ScriptError;
use super::registry::{FieldInfo, MethodInfo, RecordSchema, Registry};
use crate::core::config::Config;
use crate::core::tokenize::quote;
use crate::core::types::{short_type_name, TypeDescriptor, TypeKind};

/// Knobs for [`Registry::generate_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Use the first declared alias for the record type and fields.
    pub prefer_aliases: bool,
    /// Emit leading set positional fields as bare tokens.
    pub positional: bool,
    /// Leave out fields holding their default value.
    pub skip_defaults: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefer_aliases: false,
            positional: true,
            skip_defaults: true,
        }
    }
}

impl From<&Config> for GenerateOptions {
    fn from(config: &Config) -> Self {
        Self {
            prefer_aliases: config.prefer_aliases(),
            positional: config.positional(),
            skip_defaults: config.skip_defaults(),
        }
    }
}

impl<C: 'static> Registry<C> {
    /// Build the `add` command that recreates `record`.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` if no registration exists for `T`, and
    /// `MultilineValue` if an emitted value contains a line break.
    pub fn generate_command<T: 'static>(
        &self,
        record: &T,
        options: &GenerateOptions,
    ) -> Result<String, ScriptError> {
        let unregistered = || ScriptError::UnregisteredType(short_type_name::<T>().to_string());
        let schema = self.registration_for::<T>().ok_or_else(unregistered)?;
        let snapshot = schema.snapshot(record).ok_or_else(unregistered)?;

        let record_name = if options.prefer_aliases {
            schema.aliases().first().map(String::as_str).unwrap_or(schema.name())
        } else {
            schema.name()
        };

        let fields = schema.fields();
        // `run_many` splits scripts on line breaks, so a value holding one
        // cannot survive inside a single command.
        let render = |index: usize| {
            let rendered = snapshot[index].value.render();
            if rendered.contains(['\n', '\r']) {
                return Err(ScriptError::MultilineValue {
                    record: schema.name().to_string(),
                    field: fields[index].name.to_string(),
                });
            }
            Ok(rendered)
        };

        let identity = schema.identity();
        let mut parts = vec![
            "add".to_string(),
            record_name.to_string(),
            quote(&render(identity.index)?),
        ];

        let mut pending: Vec<usize> = snapshot
            .iter()
            .filter(|s| s.index != identity.index)
            .filter(|s| !s.value.is_null())
            .filter(|s| !(options.skip_defaults && s.is_default))
            .map(|s| s.index)
            .collect();

        if options.positional {
            for field in schema.positional() {
                let Some(position) = pending.iter().position(|&i| i == field.index) else {
                    break;
                };
                let rendered = render(field.index)?;
                // Would read back as a named argument.
                if rendered.starts_with("--") {
                    break;
                }
                parts.push(quote(&rendered));
                pending.remove(position);
            }
        }

        for index in pending {
            let field = &fields[index];
            let name = if options.prefer_aliases {
                field.aliases.first().map(String::as_str).unwrap_or(field.name)
            } else {
                field.name
            };
            let rendered = render(index)?;
            parts.push(format!("--{name}={}", quote(&rendered)));
        }

        Ok(parts.join(" "))
    }

    /// Generate one line per record, joined with newlines.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` if no registration exists for `T`.
    pub fn generate_commands<'r, T: 'static>(
        &self,
        records: impl IntoIterator<Item = &'r T>,
        options: &GenerateOptions,
    ) -> Result<String, ScriptError> {
        let lines = records
            .into_iter()
            .map(|record| self.generate_command(record, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// One-line usage for record type `name`.
    ///
    /// ```text
    /// add language <Key> <Name> [--NativeName=<text>]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecordType` if `name` is not registered.
    pub fn usage_example(&self, name: &str) -> Result<String, ScriptError> {
        let schema = self.schema(name)?;
        Ok(self.usage_line(schema))
    }

    /// Multi-line usage for record type `name`: the usage line, aliases and
    /// a table of fields and methods.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecordType` if `name` is not registered.
    pub fn detailed_usage_example(&self, name: &str) -> Result<String, ScriptError> {
        let schema = self.schema(name)?;
        let mut out = self.usage_line(schema);
        out.push('\n');

        if !schema.aliases().is_empty() {
            let _ = writeln!(out, "aliases: {}", schema.aliases().join(", "));
        }

        let fields = schema.fields();
        let positional = schema.positional();
        let rows: Vec<(String, String, String)> = fields
            .iter()
            .map(|field| {
                let mut notes = Vec::new();
                if field.identity {
                    notes.push("identity".to_string());
                }
                if let Some(slot) = positional.iter().position(|p| p.index == field.index) {
                    notes.push(format!("positional {}", slot + 1));
                }
                if !field.aliases.is_empty() {
                    notes.push(format!("aliases: {}", field.aliases.join(", ")));
                }
                (
                    field.name.to_string(),
                    self.describe_type(field.descriptor),
                    notes.join("; "),
                )
            })
            .collect();

        let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
        let type_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);
        out.push_str("fields:\n");
        for (name, ty, notes) in rows {
            let line = format!("  {name:<name_width$}  {ty:<type_width$}  {notes}");
            let _ = writeln!(out, "{}", line.trim_end());
        }

        let methods: Vec<String> = schema
            .methods()
            .iter()
            .filter_map(|m| self.method_usage(m))
            .collect();
        if !methods.is_empty() {
            out.push_str("methods:\n");
            for method in methods {
                let _ = writeln!(out, "  {method}");
            }
        }

        Ok(out.trim_end().to_string())
    }

    /// Invocation prompt for custom command `name`, with defaulted
    /// parameters bracketed.
    ///
    /// ```text
    /// update-language <key> <name> [<native>]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedAction` if no such command is registered.
    pub fn custom_command_prompt(&self, name: &str) -> Result<String, ScriptError> {
        let command = self
            .command(name)
            .ok_or_else(|| ScriptError::UnsupportedAction(name.to_string()))?;

        let params = command.param_list();
        let required = command.required();
        let mut out = command.name().to_string();
        for param in &params[..required] {
            let _ = write!(out, " <{}>", param.name());
        }
        let optional = &params[required..];
        for param in optional {
            let _ = write!(out, " [<{}>", param.name());
        }
        out.push_str(&"]".repeat(optional.len()));
        Ok(out)
    }

    /// Help listing every record type and custom command.
    pub fn help_text(&self) -> String {
        let mut out = String::from("Commands:\n");
        out.push_str("  add <type> <identity> [<values>...] [--Field=value]...\n");

        let records: Vec<_> = self.records().collect();
        if !records.is_empty() {
            out.push_str("\nRecord types:\n");
            for schema in records {
                let _ = writeln!(out, "  {}", self.usage_line(schema));
            }
        }

        let prompts: Vec<(String, Option<&str>)> = self
            .commands()
            .filter_map(|command| {
                let prompt = self.custom_command_prompt(command.name()).ok()?;
                Some((prompt, command.description()))
            })
            .collect();
        if !prompts.is_empty() {
            out.push_str("\nCustom commands:\n");
            let width = prompts.iter().map(|p| p.0.len()).max().unwrap_or(0);
            for (prompt, description) in prompts {
                match description {
                    Some(text) => {
                        let _ = writeln!(out, "  {prompt:<width$}  {text}");
                    }
                    None => {
                        let _ = writeln!(out, "  {prompt}");
                    }
                }
            }
        }

        out.trim_end().to_string()
    }

    fn schema(&self, name: &str) -> Result<&dyn RecordSchema<C>, ScriptError> {
        self.record(name)
            .ok_or_else(|| ScriptError::UnknownRecordType(name.to_string()))
    }

    fn usage_line(&self, schema: &dyn RecordSchema<C>) -> String {
        let identity = schema.identity();
        let positional = schema.positional();
        let mut out = format!("add {} <{}>", schema.name(), identity.name);

        for field in &positional {
            let _ = write!(out, " <{}>", field.name);
        }
        for field in schema.fields() {
            if field.identity || positional.iter().any(|p| p.index == field.index) {
                continue;
            }
            let _ = write!(out, " {}", self.named_usage(&field));
        }
        for method in schema.methods() {
            if let Some(usage) = self.method_usage(&method) {
                let _ = write!(out, " [{usage}]");
            }
        }
        out
    }

    fn named_usage(&self, field: &FieldInfo<'_>) -> String {
        format!("[--{}=<{}>]", field.name, self.describe_type(field.descriptor))
    }

    /// Only two-argument methods are callable from a command line.
    fn method_usage(&self, method: &MethodInfo<'_>) -> Option<String> {
        match method.params {
            [first, second] => Some(format!(
                "--{}:<{}>=<{}>",
                method.name,
                self.describe_type(first),
                self.describe_type(second)
            )),
            _ => None,
        }
    }

    /// Placeholder text for a type, preferring a custom converter's description.
    pub fn describe_type(&self, ty: &TypeDescriptor) -> String {
        if let Some(description) = self.converter(ty.id()).and_then(|c| c.description()) {
            return description.to_string();
        }
        match ty.kind() {
            TypeKind::Optional(inner) => self.describe_type(inner),
            TypeKind::Sequence(element) => format!("[{},...]", self.describe_type(element)),
            _ => ty.describe(),
        }
    }
}
