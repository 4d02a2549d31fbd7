//! engine::runner
//!
//! The interpreter: runs command lines against a context.
//!
//! # Grammar
//!
//! ```text
//! add <type> <identity> [<positional>...] [--<field>=<value> | --<method>:<arg>=<value>]...
//! <custom-command> [<arg>...]
//! ```
//!
//! # Invariants
//!
//! - `add` with an existing key (in any casing) updates that record
//! - Positional tokens bind in declaration order; extras are ignored
//! - Named arguments require `=`
//! - Nothing is rolled back: values applied before a failing token stay
//!
//! Scripts run line by line, skipping blank lines and `#` comments, and stop
//! at the first failure.

use super::errors::ScriptError;
use super::registry::{FieldInfo, RecordSchema, Registry};
use crate::core::naming;
use crate::core::tokenize::tokenize;
use crate::core::types::Value;

/// A `--name=value` token, split.
struct Named<'t> {
    name: &'t str,
    value: &'t str,
}

impl<C: 'static> Registry<C> {
    /// Run one command line.
    ///
    /// # Errors
    ///
    /// Returns a `ScriptError` for malformed lines, unknown names, values
    /// that do not convert, or a failing custom command.
    pub fn run(&self, ctx: &mut C, line: &str) -> Result<(), ScriptError> {
        let tokens = tokenize(line);
        let Some(action) = tokens.first() else {
            return Err(ScriptError::InvalidCommand("empty command".to_string()));
        };

        if naming::is_reserved(action) {
            return self.run_add(ctx, &tokens);
        }

        match self.command(action) {
            Some(command) => command.execute(self, ctx, &tokens[1..]),
            None => Err(ScriptError::UnsupportedAction(action.clone())),
        }
    }

    /// Run a newline-separated script, returning how many commands ran.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first failing line and returns its error wrapped in
    /// `ScriptError::Line` with the 1-based line number.
    pub fn run_many(&self, ctx: &mut C, text: &str) -> Result<usize, ScriptError> {
        let mut executed = 0;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.run(ctx, line).map_err(|source| ScriptError::Line {
                line: index + 1,
                source: Box::new(source),
            })?;
            executed += 1;
        }
        tracing::debug!(executed, "script finished");
        Ok(executed)
    }

    fn run_add(&self, ctx: &mut C, tokens: &[String]) -> Result<(), ScriptError> {
        if tokens.len() < 3 {
            return Err(ScriptError::InvalidCommand(
                "usage: add <type> <identity> [<values>...] [--Field=value]...".to_string(),
            ));
        }
        let schema = self
            .record(&tokens[1])
            .ok_or_else(|| ScriptError::UnknownRecordType(tokens[1].clone()))?;

        let mut positional = Vec::new();
        let mut named = Vec::new();
        for token in &tokens[3..] {
            match token.strip_prefix("--") {
                Some(rest) => named.push(split_named(token, rest)?),
                None => positional.push(token.as_str()),
            }
        }

        let mut key = tokens[2].clone();
        let created = schema.find_or_create(ctx, &key)?;
        tracing::debug!(record = schema.name(), key = %key, created, "add");

        let fields = schema.positional();
        if positional.len() > fields.len() {
            tracing::debug!(
                record = schema.name(),
                ignored = ?&positional[fields.len()..],
                "ignoring extra positional values"
            );
        }
        for (field, token) in fields.iter().zip(&positional) {
            self.bind(ctx, schema, &key, field, token)?;
        }

        for arg in named {
            if let Some(field) = schema.resolve_field(arg.name) {
                if field.identity
                    && !naming::eq_ignore_case(arg.value, &key)
                    && schema.lookup_key(ctx, arg.value).is_some()
                {
                    return Err(ScriptError::DuplicateKey {
                        record: schema.name().to_string(),
                        key: arg.value.to_string(),
                    });
                }
                self.bind(ctx, schema, &key, &field, arg.value)?;
                if field.identity {
                    key = arg.value.to_string();
                }
            } else if let Some((member, first)) = arg.name.split_once(':') {
                self.call_method(ctx, schema, &key, member, first, arg.value)?;
            } else {
                return Err(ScriptError::UnknownField {
                    record: schema.name().to_string(),
                    field: arg.name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn bind(
        &self,
        ctx: &mut C,
        schema: &dyn RecordSchema<C>,
        key: &str,
        field: &FieldInfo<'_>,
        token: &str,
    ) -> Result<(), ScriptError> {
        let value = self
            .convert(ctx, token, field.descriptor)
            .map_err(|source| ScriptError::Convert {
                target: format!("{}.{}", schema.name(), field.name),
                source,
            })?;
        schema.assign(ctx, key, field.index, value)
    }

    /// Dispatch `--member:first=second` to a two-argument method named
    /// `member` or `Set<member>`, preferring the exact name.
    fn call_method(
        &self,
        ctx: &mut C,
        schema: &dyn RecordSchema<C>,
        key: &str,
        member: &str,
        first: &str,
        second: &str,
    ) -> Result<(), ScriptError> {
        let setter = format!("Set{member}");
        let methods = schema.methods();
        let candidates: Vec<_> = methods
            .iter()
            .filter(|m| naming::eq_ignore_case(m.name, member) || naming::eq_ignore_case(m.name, &setter))
            .collect();

        let Some(&fallback) = candidates.first() else {
            return Err(ScriptError::UnknownMember {
                record: schema.name().to_string(),
                member: member.to_string(),
            });
        };

        // First exact-name match wins, then the first `Set` match.
        let method = candidates
            .iter()
            .copied()
            .filter(|m| m.params.len() == 2)
            .min_by_key(|m| !naming::eq_ignore_case(m.name, member))
            .ok_or_else(|| ScriptError::MethodArity {
                record: schema.name().to_string(),
                member: member.to_string(),
                takes: fallback.params.len(),
            })?;

        let target = format!("{}.{}", schema.name(), method.name);
        let mut args: Vec<Value> = Vec::with_capacity(2);
        for (token, ty) in [first, second].into_iter().zip(method.params) {
            let value = self
                .convert(ctx, token, ty)
                .map_err(|source| ScriptError::Convert {
                    target: target.clone(),
                    source,
                })?;
            args.push(value);
        }

        tracing::debug!(record = schema.name(), method = method.name, key, "method call");
        schema.invoke(ctx, key, method.index, args)
    }
}

fn split_named<'t>(token: &str, rest: &'t str) -> Result<Named<'t>, ScriptError> {
    match rest.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(Named { name, value }),
        _ => Err(ScriptError::InvalidCommand(format!(
            "named arguments must use the format --Property=value (got '{token}')"
        ))),
    }
}
