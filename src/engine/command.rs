//! engine::command
//!
//! Custom commands: named actions with typed parameters, invoked as
//! `<name> [<args>...]`.
//!
//! # Architecture
//!
//! A custom command wraps a plain Rust function whose first parameter is
//! the context and whose remaining parameters (up to six) are
//! [`FieldType`]s. The [`CommandHandler`] trait is implemented for every
//! such function, so parameter types are read from the signature and each
//! token runs through the same conversion pipeline as record fields.
//!
//! Trailing parameters may declare defaults. A call may omit any suffix of
//! the defaulted parameters.
//!
//! # Example
//!
//! ```
//! use seedline::engine::{CustomCommand, Registry};
//!
//! #[derive(Default)]
//! struct Log(Vec<String>);
//!
//! let mut registry = Registry::<Log>::new();
//! registry
//!     .register_command(
//!         CustomCommand::new("note", |log: &mut Log, text: String, times: u32| {
//!             for _ in 0..times {
//!                 log.0.push(text.clone());
//!             }
//!         })
//!         .params(["text", "times"])
//!         .default_value("times", 1u32),
//!     )
//!     .unwrap();
//!
//! let mut log = Log::default();
//! registry.run(&mut log, "note hello").unwrap();
//! registry.run(&mut log, "note bye 2").unwrap();
//! assert_eq!(log.0, ["hello", "bye", "bye"]);
//! ```

use super::errors::{ArityBound, BoxError, RegistryError, ScriptError};
use super::registry::Registry;
use crate::core::naming::{self, fold};
use crate::core::types::{ConvertError, FieldType, TypeDescriptor, TypeKind, Value};

type Handler<C> = Box<dyn Fn(&mut C, Vec<Value>) -> Result<(), InvokeError> + Send + Sync>;

/// Why a handler call did not complete.
#[derive(Debug)]
pub enum InvokeError {
    /// A converted value did not fit the parameter type.
    Convert(ConvertError),
    /// The handler itself reported an error.
    Failed(BoxError),
}

/// Return types accepted from command handlers.
pub trait CommandOutcome {
    fn into_result(self) -> Result<(), BoxError>;
}

impl CommandOutcome for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> CommandOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A function usable as a custom command handler.
///
/// `Args` is the tuple of parameter types after the context. Implemented
/// for `Fn(&mut C, A, B, ...) -> R` with up to six parameters.
pub trait CommandHandler<C, Args>: Send + Sync + 'static {
    /// Descriptors of the handler's parameters, in order.
    fn param_types() -> Vec<TypeDescriptor>;

    /// Call the handler with one value per parameter.
    fn call(&self, ctx: &mut C, args: Vec<Value>) -> Result<(), InvokeError>;
}

macro_rules! impl_command_handler {
    ($($arg:ident),*) => {
        impl<C, F, R, $($arg,)*> CommandHandler<C, ($($arg,)*)> for F
        where
            F: Fn(&mut C, $($arg),*) -> R + Send + Sync + 'static,
            R: CommandOutcome,
            $($arg: FieldType,)*
        {
            fn param_types() -> Vec<TypeDescriptor> {
                vec![$(<$arg as FieldType>::descriptor()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, ctx: &mut C, args: Vec<Value>) -> Result<(), InvokeError> {
                let mut args = args.into_iter();
                $(
                    let $arg = <$arg as FieldType>::from_value(args.next().unwrap_or(Value::Null))
                        .map_err(InvokeError::Convert)?;
                )*
                (self)(ctx, $($arg),*).into_result().map_err(InvokeError::Failed)
            }
        }
    };
}

impl_command_handler!();
impl_command_handler!(A1);
impl_command_handler!(A1, A2);
impl_command_handler!(A1, A2, A3);
impl_command_handler!(A1, A2, A3, A4);
impl_command_handler!(A1, A2, A3, A4, A5);
impl_command_handler!(A1, A2, A3, A4, A5, A6);

/// One parameter of a custom command.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    ty: TypeDescriptor,
    default: Option<Value>,
}

impl Param {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// The value used when the token is omitted.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A default declared before registration, checked by the registry.
struct PendingDefault {
    param: String,
    ty: Option<TypeDescriptor>,
    value: Value,
}

/// A named action with typed parameters.
pub struct CustomCommand<C> {
    name: String,
    params: Vec<Param>,
    names: Vec<String>,
    defaults: Vec<PendingDefault>,
    description: Option<String>,
    handler: Handler<C>,
}

impl<C: 'static> CustomCommand<C> {
    /// Wrap `handler` as command `name`.
    ///
    /// Parameters are named `arg1`, `arg2`, ... until [`params`](Self::params)
    /// names them.
    pub fn new<H, Args>(name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler<C, Args>,
        Args: 'static,
    {
        let params = H::param_types()
            .into_iter()
            .enumerate()
            .map(|(i, ty)| Param {
                name: format!("arg{}", i + 1),
                ty,
                default: None,
            })
            .collect();

        Self {
            name: name.into(),
            params,
            names: Vec::new(),
            defaults: Vec::new(),
            description: None,
            handler: Box::new(move |ctx, args| handler.call(ctx, args)),
        }
    }

    /// Name the parameters, in order.
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Give parameter `param` a default value.
    pub fn default_value<V: FieldType>(mut self, param: impl Into<String>, value: V) -> Self {
        self.defaults.push(PendingDefault {
            param: param.into(),
            ty: Some(V::descriptor()),
            value: value.to_value(),
        });
        self
    }

    /// Let optional parameter `param` be omitted, defaulting to absent.
    pub fn optional(mut self, param: impl Into<String>) -> Self {
        self.defaults.push(PendingDefault {
            param: param.into(),
            ty: None,
            value: Value::Null,
        });
        self
    }

    /// One-line description shown in help text.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_list(&self) -> &[Param] {
        &self.params
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of leading parameters without a default.
    pub fn required(&self) -> usize {
        self.params.iter().take_while(|p| p.default.is_none()).count()
    }

    /// Apply names and defaults, checking them against the handler signature.
    fn finish(&mut self) -> Result<(), RegistryError> {
        if self.names.len() > self.params.len() {
            return Err(RegistryError::UnknownParameter {
                command: self.name.clone(),
                param: self.names[self.params.len()].clone(),
            });
        }
        for (param, name) in self.params.iter_mut().zip(self.names.drain(..)) {
            param.name = name;
        }

        for pending in std::mem::take(&mut self.defaults) {
            let command = self.name.clone();
            let param = self
                .params
                .iter_mut()
                .find(|p| naming::eq_ignore_case(&p.name, &pending.param))
                .ok_or_else(|| RegistryError::UnknownParameter {
                    command: command.clone(),
                    param: pending.param.clone(),
                })?;
            let invalid = |reason: String| RegistryError::InvalidDefault {
                command: command.clone(),
                param: pending.param.clone(),
                reason,
            };

            match &pending.ty {
                None if !param.ty.is_optional() => {
                    return Err(invalid(format!(
                        "only optional parameters may default to absent ({} is required)",
                        param.ty.name()
                    )));
                }
                Some(ty) if !accepts(&param.ty, ty) => {
                    return Err(invalid(format!(
                        "expected a {} value, got {}",
                        param.ty.name(),
                        ty.name()
                    )));
                }
                _ => {}
            }
            param.default = Some(pending.value);
        }

        if let Some(position) = self.params.iter().position(|p| p.default.is_some()) {
            if let Some(after) = self.params[position..].iter().find(|p| p.default.is_none()) {
                return Err(RegistryError::InvalidDefault {
                    command: self.name.clone(),
                    param: after.name.clone(),
                    reason: "parameters after a defaulted parameter need defaults too".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Convert `tokens` and call the handler.
    pub(crate) fn execute(
        &self,
        registry: &Registry<C>,
        ctx: &mut C,
        tokens: &[String],
    ) -> Result<(), ScriptError> {
        let required = self.required();
        let total = self.params.len();
        let given = tokens.len();
        let exact = required == total;

        if given < required || given > total {
            let (bound, count) = match (given < required, exact) {
                (_, true) => (ArityBound::Exactly, total),
                (true, false) => (ArityBound::AtLeast, required),
                (false, false) => (ArityBound::AtMost, total),
            };
            return Err(ScriptError::Arity {
                command: self.name.clone(),
                bound,
                count,
                given,
            });
        }

        let mut values = Vec::with_capacity(total);
        for (index, param) in self.params.iter().enumerate() {
            let value = match tokens.get(index) {
                Some(token) => registry
                    .convert(ctx, token, &param.ty)
                    .map_err(|source| ScriptError::Convert {
                        target: format!("{}.{}", self.name, param.name),
                        source,
                    })?,
                None => param.default.clone().unwrap_or(Value::Null),
            };
            values.push(value);
        }

        tracing::debug!(command = %self.name, given, "dispatching custom command");
        (self.handler)(ctx, values).map_err(|err| match err {
            InvokeError::Convert(source) => ScriptError::Convert {
                target: self.name.clone(),
                source,
            },
            InvokeError::Failed(source) => ScriptError::Command {
                name: self.name.clone(),
                source,
            },
        })
    }
}

/// Whether a default of type `given` fits parameter type `param`.
fn accepts(param: &TypeDescriptor, given: &TypeDescriptor) -> bool {
    if param.id() == given.id() {
        return true;
    }
    match param.kind() {
        TypeKind::Optional(inner) => inner.id() == given.id(),
        _ => false,
    }
}

impl<C: 'static> Registry<C> {
    /// Register a custom command.
    ///
    /// # Errors
    ///
    /// - `ReservedCommandName` for `add` in any casing
    /// - `DuplicateName` if a command with this name exists
    /// - `UnknownParameter` / `InvalidDefault` for bad names or defaults
    pub fn register_command(&mut self, mut command: CustomCommand<C>) -> Result<&mut Self, RegistryError> {
        if naming::is_reserved(&command.name) {
            return Err(RegistryError::ReservedCommandName(command.name));
        }
        let key = fold(&command.name);
        if self.commands.contains_key(&key) {
            return Err(RegistryError::DuplicateName(command.name));
        }
        command.finish()?;

        tracing::debug!(
            command = %command.name,
            params = command.params.len(),
            required = command.required(),
            "registered custom command"
        );
        self.commands.insert(key, command);
        Ok(self)
    }

    /// Look up a custom command by name, case-insensitively.
    pub fn command(&self, name: &str) -> Option<&CustomCommand<C>> {
        self.commands.get(&fold(name))
    }

    /// All custom commands, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &CustomCommand<C>> {
        self.commands.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        lines: Vec<String>,
    }

    fn greet(ctx: &mut Ctx, name: String, punctuation: Option<String>) {
        ctx.lines
            .push(format!("hello {name}{}", punctuation.unwrap_or_default()));
    }

    #[test]
    fn reserved_name_rejected() {
        let err = Registry::<Ctx>::new()
            .register_command(CustomCommand::new("ADD", |_: &mut Ctx| {}))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::ReservedCommandName("ADD".into()));
    }

    #[test]
    fn duplicate_command_rejected() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(CustomCommand::new("ping", |_: &mut Ctx| {}))
            .unwrap();
        let err = registry
            .register_command(CustomCommand::new("Ping", |_: &mut Ctx| {}))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::DuplicateName("Ping".into()));
    }

    #[test]
    fn param_types_come_from_signature() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(CustomCommand::new("greet", greet).params(["name", "punctuation"]))
            .unwrap();

        let command = registry.command("GREET").unwrap();
        let params = command.param_list();
        assert_eq!(params[0].name(), "name");
        assert!(params[1].descriptor().is_optional());
        assert_eq!(command.required(), 2);
    }

    #[test]
    fn unnamed_params_get_positional_names() {
        let command = CustomCommand::new("greet", greet);
        assert_eq!(command.param_list()[1].name(), "arg2");
    }

    #[test]
    fn too_many_names_rejected() {
        let err = Registry::<Ctx>::new()
            .register_command(CustomCommand::new("greet", greet).params(["a", "b", "c"]))
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::UnknownParameter {
                command: "greet".into(),
                param: "c".into()
            }
        );
    }

    #[test]
    fn default_type_must_match() {
        let err = Registry::<Ctx>::new()
            .register_command(
                CustomCommand::new("greet", greet)
                    .params(["name", "punctuation"])
                    .default_value("punctuation", 3u8),
            )
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::InvalidDefault { .. }));
    }

    #[test]
    fn optional_requires_option_type() {
        let err = Registry::<Ctx>::new()
            .register_command(
                CustomCommand::new("greet", greet)
                    .params(["name", "punctuation"])
                    .optional("name"),
            )
            .err()
            .unwrap();
        assert!(err.to_string().contains("only optional parameters"));
    }

    #[test]
    fn defaults_must_be_trailing() {
        let err = Registry::<Ctx>::new()
            .register_command(
                CustomCommand::new("pair", |_: &mut Ctx, _a: String, _b: String| {})
                    .params(["a", "b"])
                    .default_value("a", "x".to_string()),
            )
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::InvalidDefault {
                command: "pair".into(),
                param: "b".into(),
                reason: "parameters after a defaulted parameter need defaults too".into(),
            }
        );
    }

    #[test]
    fn inner_type_default_fits_optional_param() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(
                CustomCommand::new("greet", greet)
                    .params(["name", "punctuation"])
                    .default_value("punctuation", "!".to_string()),
            )
            .unwrap();

        let mut ctx = Ctx::default();
        registry.run(&mut ctx, "greet world").unwrap();
        registry.run(&mut ctx, "greet world ?").unwrap();
        assert_eq!(ctx.lines, ["hello world!", "hello world?"]);
    }

    #[test]
    fn arity_bounds() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(CustomCommand::new("greet", greet).optional("arg2"))
            .unwrap()
            .register_command(CustomCommand::new("exact", |_: &mut Ctx, _a: u8| {}))
            .unwrap();
        let mut ctx = Ctx::default();

        let err = registry.run(&mut ctx, "greet").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'greet' requires at least 1 parameter(s), got 0"
        );
        let err = registry.run(&mut ctx, "greet a b c").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'greet' requires at most 2 parameter(s), got 3"
        );
        let err = registry.run(&mut ctx, "exact 1 2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'exact' requires exactly 1 parameter(s), got 2"
        );
    }

    #[test]
    fn handler_errors_surface() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(CustomCommand::new("fail", |_: &mut Ctx, why: String| {
                Err::<(), _>(why)
            }))
            .unwrap();

        let err = registry.run(&mut Ctx::default(), "fail nope").unwrap_err();
        assert!(matches!(err, ScriptError::Command { .. }));
        assert_eq!(err.to_string(), "command 'fail' failed: nope");
    }

    #[test]
    fn argument_conversion_errors_name_the_param() {
        let mut registry = Registry::<Ctx>::new();
        registry
            .register_command(CustomCommand::new("count", |_: &mut Ctx, _n: u32| {}).params(["n"]))
            .unwrap();

        let err = registry.run(&mut Ctx::default(), "count many").unwrap_err();
        assert!(err.is_conversion());
        assert!(err.to_string().starts_with("invalid value for count.n"));
    }
}
