//! engine::registry
//!
//! Record registrations, custom converters and the registry that owns them.
//!
//! # Architecture
//!
//! A [`Registry<C>`] is built once at startup for one context type `C` and
//! read by every `run`, `generate` and usage call afterwards. It holds:
//!
//! - record registrations, keyed by command name and alias
//! - custom commands (see [`super::command`])
//! - custom converters, keyed by the exact target type
//!
//! Each [`RecordRegistration<C, T>`] is a descriptor table for record type
//! `T`: its identity field, positional fields, named fields, methods, and how
//! records are acquired from the context. The registry stores registrations
//! behind the object-safe [`RecordSchema`] trait so records of different
//! types live side by side.
//!
//! # Invariants
//!
//! - Names and aliases are unique (case-insensitively) across the registry
//! - Field names and field aliases are unique within a registration
//! - Identity lookups compare keys case-insensitively
//! - Registration needs `&mut Registry`; reading needs only `&Registry`
//!
//! # Example
//!
//! ```
//! use seedline::engine::{Field, RecordRegistration, Registry};
//!
//! #[derive(Default)]
//! struct Library {
//!     languages: Vec<Language>,
//! }
//!
//! #[derive(Default)]
//! struct Language {
//!     key: String,
//!     name: String,
//! }
//!
//! let mut registry = Registry::<Library>::new();
//! registry
//!     .register(
//!         RecordRegistration::new("language")
//!             .alias("lang")
//!             .collection(|lib: &mut Library| &mut lib.languages)
//!             .identity("Key", |l: &Language| &l.key, |l, v| l.key = v)
//!             .positional(Field::new("Name", |l: &Language| &l.name, |l, v| l.name = v)),
//!     )
//!     .unwrap();
//!
//! let mut library = Library::default();
//! registry.run(&mut library, "add lang en English").unwrap();
//! assert_eq!(library.languages[0].name, "English");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

use indexmap::IndexMap;

use super::command::CustomCommand;
use super::errors::{RegistryError, ScriptError};
use crate::core::naming::{self, fold};
use crate::core::types::{short_type_name, ConvertError, FieldType, TypeDescriptor, Value};

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ConvertError> + Send + Sync>;
type DefaultCheck<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Invoker<T> = Box<dyn Fn(&mut T, Vec<Value>) -> Result<(), ConvertError> + Send + Sync>;
type ConvertFn<C> = Box<dyn Fn(&mut C, &str) -> Result<Value, ConvertError> + Send + Sync>;

/// Whether a combined accessor may create a missing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// Return the record only if it exists.
    Find,
    /// Return the existing record, creating it if absent.
    FindOrCreate,
}

/// Collection accessor: records live in a `Vec` inside the context.
pub type CollectionFn<C, T> = for<'a> fn(&'a mut C) -> &'a mut Vec<T>;

/// Find accessor: look a record up by key, never creating it.
pub type FindFn<C, T> = for<'a, 'k> fn(&'a mut C, &'k str) -> Option<&'a mut T>;

/// Create accessor: make a new record with the given key.
pub type CreateFn<C, T> = for<'a, 'k> fn(&'a mut C, &'k str) -> &'a mut T;

/// Combined accessor: find, or find-or-create, depending on [`Acquire`].
pub type CombinedFn<C, T> = for<'a, 'k> fn(&'a mut C, &'k str, Acquire) -> Option<&'a mut T>;

/// How records of one type are found and created inside the context.
enum Acquisition<C, T> {
    Collection {
        records: CollectionFn<C, T>,
        make: fn() -> T,
    },
    FindCreate {
        find: FindFn<C, T>,
        create: CreateFn<C, T>,
    },
    Combined(CombinedFn<C, T>),
}

/// A settable field of record type `T`.
///
/// Holds the field's name, aliases, type descriptor, typed getter/setter and
/// the predicate the generator uses to leave default values out.
pub struct Field<T> {
    name: String,
    aliases: Vec<String>,
    descriptor: TypeDescriptor,
    get: Getter<T>,
    set: Setter<T>,
    is_default: DefaultCheck<T>,
}

impl<T: 'static> Field<T> {
    /// Declare a field whose default is `V::default()`.
    pub fn new<V>(name: impl Into<String>, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self
    where
        V: FieldType + Default + PartialEq,
    {
        Self::with_default_check(name, get, set, |value: &V| *value == V::default())
    }

    /// Declare a field with an explicit "is default" predicate.
    ///
    /// Use this for types without a `Default` impl, or when the zero value
    /// should still be emitted.
    pub fn with_default_check<V, P>(
        name: impl Into<String>,
        get: fn(&T) -> &V,
        set: fn(&mut T, V),
        is_default: P,
    ) -> Self
    where
        V: FieldType,
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            descriptor: V::descriptor(),
            get: Box::new(move |record| get(record).to_value()),
            set: Box::new(move |record, value| {
                set(record, V::from_value(value)?);
                Ok(())
            }),
            is_default: Box::new(move |record| is_default(get(record))),
        }
    }

    /// Add an alternate name accepted for `--name=value` arguments.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Replace the default-value predicate with one over the whole record.
    pub fn default_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.is_default = Box::new(predicate);
        self
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A named procedure on record type `T`, callable as `--Name:arg=value`.
pub struct Method<T> {
    name: String,
    params: Vec<TypeDescriptor>,
    invoke: Invoker<T>,
}

impl<T: 'static> Method<T> {
    /// Declare a one-argument method.
    pub fn unary<A: FieldType>(name: impl Into<String>, f: fn(&mut T, A)) -> Self {
        Self {
            name: name.into(),
            params: vec![A::descriptor()],
            invoke: Box::new(move |record, args| {
                let mut args = args.into_iter();
                let a = A::from_value(args.next().unwrap_or(Value::Null))?;
                f(record, a);
                Ok(())
            }),
        }
    }

    /// Declare a two-argument method.
    pub fn binary<A: FieldType, B: FieldType>(name: impl Into<String>, f: fn(&mut T, A, B)) -> Self {
        Self {
            name: name.into(),
            params: vec![A::descriptor(), B::descriptor()],
            invoke: Box::new(move |record, args| {
                let mut args = args.into_iter();
                let a = A::from_value(args.next().unwrap_or(Value::Null))?;
                let b = B::from_value(args.next().unwrap_or(Value::Null))?;
                f(record, a, b);
                Ok(())
            }),
        }
    }
}

/// Borrowed view of a field, independent of the record type.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo<'a> {
    /// Position in the registration's declaration order.
    pub index: usize,
    pub name: &'a str,
    pub aliases: &'a [String],
    pub descriptor: &'a TypeDescriptor,
    /// Whether this is the identity field.
    pub identity: bool,
}

/// Borrowed view of a method, independent of the record type.
#[derive(Debug, Clone, Copy)]
pub struct MethodInfo<'a> {
    pub index: usize,
    pub name: &'a str,
    pub params: &'a [TypeDescriptor],
}

/// A field's current value on one record, as seen by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub index: usize,
    pub value: Value,
    pub is_default: bool,
}

/// Object-safe view of a record registration.
///
/// Implemented by [`RecordRegistration<C, T>`]; the interpreter and the
/// generator only ever talk to this trait.
pub trait RecordSchema<C>: Send + Sync {
    /// Canonical command token.
    fn name(&self) -> &str;

    /// Type aliases, in declaration order.
    fn aliases(&self) -> &[String];

    /// Record type id.
    fn record_type(&self) -> TypeId;

    /// Short record type name.
    fn type_name(&self) -> &'static str;

    /// The identity field.
    fn identity(&self) -> FieldInfo<'_>;

    /// Positional fields, in binding order.
    fn positional(&self) -> Vec<FieldInfo<'_>>;

    /// All fields, in declaration order.
    fn fields(&self) -> Vec<FieldInfo<'_>>;

    /// Resolve a field by name or alias, case-insensitively.
    fn resolve_field(&self, name: &str) -> Option<FieldInfo<'_>>;

    /// All methods, in declaration order.
    fn methods(&self) -> Vec<MethodInfo<'_>>;

    /// Stored key of the record matching `key`, without creating it.
    fn lookup_key(&self, ctx: &mut C, key: &str) -> Option<String>;

    /// Find the record matching `key` or create it. Returns whether it was created.
    fn find_or_create(&self, ctx: &mut C, key: &str) -> Result<bool, ScriptError>;

    /// Set field `index` on the record matching `key`.
    fn assign(&self, ctx: &mut C, key: &str, index: usize, value: Value) -> Result<(), ScriptError>;

    /// Call method `index` on the record matching `key`.
    fn invoke(
        &self,
        ctx: &mut C,
        key: &str,
        index: usize,
        args: Vec<Value>,
    ) -> Result<(), ScriptError>;

    /// Current field values of `record`, or `None` if it is not this type.
    fn snapshot(&self, record: &dyn Any) -> Option<Vec<FieldSnapshot>>;

    /// Add a type alias after registration.
    fn push_alias(&mut self, alias: String);
}

/// Descriptor table for record type `T` within context `C`.
///
/// Built with chained calls and handed to [`Registry::register`], which
/// validates it.
pub struct RecordRegistration<C, T> {
    name: String,
    aliases: Vec<String>,
    identity: Option<(usize, fn(&T) -> &String, fn(&mut T, String))>,
    positional: Vec<usize>,
    fields: Vec<Field<T>>,
    methods: Vec<Method<T>>,
    acquisition: Option<Acquisition<C, T>>,
    lookup: HashMap<String, usize>,
}

impl<C: 'static, T: 'static> RecordRegistration<C, T> {
    /// Start a registration under command name `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            identity: None,
            positional: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            acquisition: None,
            lookup: HashMap::new(),
        }
    }

    /// Add an alternate command name for this record type.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declare the identity field. Keys are always text.
    pub fn identity(
        mut self,
        name: impl Into<String>,
        get: fn(&T) -> &String,
        set: fn(&mut T, String),
    ) -> Self {
        let index = self.fields.len();
        self.fields.push(Field::new(name, get, set));
        self.identity = Some((index, get, set));
        self
    }

    /// Add a field bound by position after the identity token.
    pub fn positional(mut self, field: Field<T>) -> Self {
        self.positional.push(self.fields.len());
        self.fields.push(field);
        self
    }

    /// Add a field bound only by `--name=value`.
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method callable as `--Name:arg=value`.
    pub fn method(mut self, method: Method<T>) -> Self {
        self.methods.push(method);
        self
    }

    /// Acquire records from a `Vec` in the context.
    ///
    /// Lookups scan linearly, comparing keys case-insensitively; new records
    /// start as `T::default()` with the identity set.
    pub fn collection(mut self, records: CollectionFn<C, T>) -> Self
    where
        T: Default,
    {
        self.acquisition = Some(Acquisition::Collection {
            records,
            make: T::default,
        });
        self
    }

    /// Acquire records through separate find and create functions.
    ///
    /// `find` is responsible for comparing keys case-insensitively.
    pub fn find_create(mut self, find: FindFn<C, T>, create: CreateFn<C, T>) -> Self {
        self.acquisition = Some(Acquisition::FindCreate { find, create });
        self
    }

    /// Acquire records through one function that is told whether it may create.
    pub fn combined(mut self, accessor: CombinedFn<C, T>) -> Self {
        self.acquisition = Some(Acquisition::Combined(accessor));
        self
    }

    /// Check the table and build the field lookup.
    fn validate(&mut self) -> Result<(), RegistryError> {
        if self.acquisition.is_none() {
            return Err(RegistryError::MissingAcquisition(self.name.clone()));
        }
        if self.identity.is_none() {
            return Err(RegistryError::MissingIdentity(self.name.clone()));
        }

        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (index, field) in self.fields.iter().enumerate() {
            for name in field.names() {
                if let Some(&first) = lookup.get(&fold(name)) {
                    return Err(RegistryError::FieldNameCollision {
                        record: self.name.clone(),
                        name: name.to_string(),
                        first: self.fields[first].name.clone(),
                        second: field.name.clone(),
                    });
                }
                lookup.insert(fold(name), index);
            }
        }
        self.lookup = lookup;
        Ok(())
    }

    fn key_of<'r>(&self, record: &'r T) -> &'r String {
        match self.identity {
            Some((_, get, _)) => get(record),
            None => unreachable!("registration validated without identity"),
        }
    }

    fn locate<'a>(&self, ctx: &'a mut C, key: &str) -> Option<&'a mut T> {
        match self.acquisition.as_ref()? {
            Acquisition::Collection { records, .. } => records(ctx)
                .iter_mut()
                .find(|record| naming::eq_ignore_case(self.key_of(record), key)),
            Acquisition::FindCreate { find, .. } => find(ctx, key),
            Acquisition::Combined(accessor) => accessor(ctx, key, Acquire::Find),
        }
    }

    fn create<'a>(&self, ctx: &'a mut C, key: &str) -> Option<&'a mut T> {
        match self.acquisition.as_ref()? {
            Acquisition::Collection { records, make } => {
                let records = records(ctx);
                records.push(make());
                records.last_mut()
            }
            Acquisition::FindCreate { create, .. } => Some(create(ctx, key)),
            Acquisition::Combined(accessor) => accessor(ctx, key, Acquire::FindOrCreate),
        }
    }

    fn missing(&self, key: &str) -> ScriptError {
        ScriptError::MissingRecord {
            record: self.name.clone(),
            key: key.to_string(),
        }
    }

    fn info(&self, index: usize) -> FieldInfo<'_> {
        let field = &self.fields[index];
        FieldInfo {
            index,
            name: &field.name,
            aliases: &field.aliases,
            descriptor: &field.descriptor,
            identity: self.identity.map(|(i, _, _)| i) == Some(index),
        }
    }
}

impl<C: 'static, T: 'static> RecordSchema<C> for RecordRegistration<C, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn record_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn identity(&self) -> FieldInfo<'_> {
        self.info(self.identity.map(|(i, _, _)| i).unwrap_or_default())
    }

    fn positional(&self) -> Vec<FieldInfo<'_>> {
        self.positional.iter().map(|&i| self.info(i)).collect()
    }

    fn fields(&self) -> Vec<FieldInfo<'_>> {
        (0..self.fields.len()).map(|i| self.info(i)).collect()
    }

    fn resolve_field(&self, name: &str) -> Option<FieldInfo<'_>> {
        self.lookup.get(&fold(name)).map(|&i| self.info(i))
    }

    fn methods(&self) -> Vec<MethodInfo<'_>> {
        self.methods
            .iter()
            .enumerate()
            .map(|(index, method)| MethodInfo {
                index,
                name: &method.name,
                params: &method.params,
            })
            .collect()
    }

    fn lookup_key(&self, ctx: &mut C, key: &str) -> Option<String> {
        let record = self.locate(ctx, key)?;
        Some(self.key_of(record).clone())
    }

    fn find_or_create(&self, ctx: &mut C, key: &str) -> Result<bool, ScriptError> {
        if self.locate(ctx, key).is_some() {
            return Ok(false);
        }

        let record = self.create(ctx, key).ok_or_else(|| self.missing(key))?;
        if let Some((_, _, set_key)) = self.identity {
            set_key(record, key.to_string());
        }
        Ok(true)
    }

    fn assign(&self, ctx: &mut C, key: &str, index: usize, value: Value) -> Result<(), ScriptError> {
        let field = &self.fields[index];
        let record = self.locate(ctx, key).ok_or_else(|| self.missing(key))?;
        (field.set)(record, value).map_err(|source| ScriptError::Convert {
            target: format!("{}.{}", self.name, field.name),
            source,
        })
    }

    fn invoke(
        &self,
        ctx: &mut C,
        key: &str,
        index: usize,
        args: Vec<Value>,
    ) -> Result<(), ScriptError> {
        let method = &self.methods[index];
        let record = self.locate(ctx, key).ok_or_else(|| self.missing(key))?;
        (method.invoke)(record, args).map_err(|source| ScriptError::Convert {
            target: format!("{}.{}", self.name, method.name),
            source,
        })
    }

    fn snapshot(&self, record: &dyn Any) -> Option<Vec<FieldSnapshot>> {
        let record = record.downcast_ref::<T>()?;
        Some(
            self.fields
                .iter()
                .enumerate()
                .map(|(index, field)| FieldSnapshot {
                    index,
                    value: (field.get)(record),
                    is_default: (field.is_default)(record),
                })
                .collect(),
        )
    }

    fn push_alias(&mut self, alias: String) {
        self.aliases.push(alias);
    }
}

/// A user-supplied conversion for one exact target type.
pub struct CustomConverter<C> {
    description: Option<String>,
    convert: ConvertFn<C>,
}

impl<C> CustomConverter<C> {
    /// Human-readable type description for usage text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn apply(&self, ctx: &mut C, token: &str) -> Result<Value, ConvertError> {
        (self.convert)(ctx, token)
    }
}

/// Command schema registry for context type `C`.
///
/// Owned by the application and passed by reference to the interpreter,
/// the generator and the usage builders. Independent registries never
/// share state.
pub struct Registry<C> {
    records: Vec<Box<dyn RecordSchema<C>>>,
    names: IndexMap<String, usize>,
    pub(crate) commands: IndexMap<String, CustomCommand<C>>,
    converters: HashMap<TypeId, CustomConverter<C>>,
}

impl<C: 'static> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Registry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            names: IndexMap::new(),
            commands: IndexMap::new(),
            converters: HashMap::new(),
        }
    }

    /// Register a record type under its name and aliases.
    ///
    /// # Errors
    ///
    /// - `MissingAcquisition` / `MissingIdentity` for an incomplete table
    /// - `FieldNameCollision` if two fields claim the same name or alias
    /// - `DuplicateName` if the name or an alias is already taken
    pub fn register<T: 'static>(
        &mut self,
        mut registration: RecordRegistration<C, T>,
    ) -> Result<&mut Self, RegistryError> {
        registration.validate()?;

        let names: Vec<String> = std::iter::once(registration.name.clone())
            .chain(registration.aliases.iter().cloned())
            .collect();
        let mut folded: Vec<String> = Vec::with_capacity(names.len());
        for name in &names {
            let key = fold(name);
            if self.names.contains_key(&key) || folded.contains(&key) {
                return Err(RegistryError::DuplicateName(name.clone()));
            }
            folded.push(key);
        }

        let index = self.records.len();
        tracing::debug!(
            record = %registration.name,
            aliases = ?registration.aliases,
            fields = registration.fields.len(),
            "registered record type"
        );
        self.records.push(Box::new(registration));
        for key in folded {
            self.names.insert(key, index);
        }
        Ok(self)
    }

    /// Add another command name for an already registered record type.
    ///
    /// # Errors
    ///
    /// - `UnknownRecordType` if `name` is not registered
    /// - `DuplicateName` if `alias` is already taken
    pub fn add_alias(&mut self, name: &str, alias: &str) -> Result<&mut Self, RegistryError> {
        let index = *self
            .names
            .get(&fold(name))
            .ok_or_else(|| RegistryError::UnknownRecordType(name.to_string()))?;
        if self.names.contains_key(&fold(alias)) {
            return Err(RegistryError::DuplicateName(alias.to_string()));
        }
        self.records[index].push_alias(alias.to_string());
        self.names.insert(fold(alias), index);
        Ok(self)
    }

    /// Register a converter for target type `V`, replacing any earlier one.
    pub fn register_converter<V, F>(&mut self, convert: F) -> &mut Self
    where
        V: FieldType,
        F: Fn(&mut C, &str) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.insert_converter::<V>(None, Box::new(convert))
    }

    /// Register a converter for `V` with a type description for usage text.
    pub fn register_described_converter<V, F>(
        &mut self,
        description: impl Into<String>,
        convert: F,
    ) -> &mut Self
    where
        V: FieldType,
        F: Fn(&mut C, &str) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.insert_converter::<V>(Some(description.into()), Box::new(convert))
    }

    fn insert_converter<V: FieldType>(
        &mut self,
        description: Option<String>,
        convert: ConvertFn<C>,
    ) -> &mut Self {
        self.converters.insert(
            V::descriptor().id(),
            CustomConverter {
                description,
                convert,
            },
        );
        self
    }

    /// Look up a registration by name or alias, case-insensitively.
    pub fn record(&self, name: &str) -> Option<&dyn RecordSchema<C>> {
        self.names
            .get(&fold(name))
            .map(|&index| self.records[index].as_ref())
    }

    /// First registration for record type id `id`.
    pub fn record_for_type(&self, id: TypeId) -> Option<&dyn RecordSchema<C>> {
        self.records
            .iter()
            .find(|record| record.record_type() == id)
            .map(|record| record.as_ref())
    }

    /// First registration for record type `T`.
    pub fn registration_for<T: 'static>(&self) -> Option<&dyn RecordSchema<C>> {
        self.record_for_type(TypeId::of::<T>())
    }

    /// All registrations, in registration order.
    pub fn records(&self) -> impl Iterator<Item = &dyn RecordSchema<C>> {
        self.records.iter().map(|record| record.as_ref())
    }

    /// The converter registered for type id `id`, if any.
    pub fn converter(&self, id: TypeId) -> Option<&CustomConverter<C>> {
        self.converters.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        items: Vec<Item>,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Item {
        key: String,
        label: String,
        count: u32,
    }

    fn items(ctx: &mut Ctx) -> &mut Vec<Item> {
        &mut ctx.items
    }

    fn item_registration() -> RecordRegistration<Ctx, Item> {
        RecordRegistration::new("item")
            .alias("it")
            .collection(items)
            .identity("Key", |i: &Item| &i.key, |i, v| i.key = v)
            .positional(Field::new("Label", |i: &Item| &i.label, |i, v| i.label = v).alias("l"))
            .field(Field::new("Count", |i: &Item| &i.count, |i, v| i.count = v))
    }

    #[test]
    fn register_and_resolve_by_alias() {
        let mut registry = Registry::new();
        registry.register(item_registration()).unwrap();

        let schema = registry.record("IT").unwrap();
        assert_eq!(schema.name(), "item");
        assert_eq!(schema.type_name(), "Item");
        assert_eq!(schema.resolve_field("L").unwrap().name, "Label");
        assert_eq!(schema.resolve_field("count").unwrap().index, 2);
        assert!(schema.identity().identity);
    }

    #[test]
    fn missing_acquisition_rejected() {
        let registration: RecordRegistration<Ctx, Item> =
            RecordRegistration::new("item").identity("Key", |i: &Item| &i.key, |i, v| i.key = v);
        let err = Registry::new().register(registration).err().unwrap();
        assert_eq!(err, RegistryError::MissingAcquisition("item".into()));
    }

    #[test]
    fn missing_identity_rejected() {
        let registration: RecordRegistration<Ctx, Item> =
            RecordRegistration::new("item").collection(items);
        let err = Registry::new().register(registration).err().unwrap();
        assert_eq!(err, RegistryError::MissingIdentity("item".into()));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut registry = Registry::new();
        registry.register(item_registration()).unwrap();

        let clash = RecordRegistration::new("other")
            .alias("ITEM")
            .collection(items)
            .identity("Key", |i: &Item| &i.key, |i, v| i.key = v);
        let err = registry.register(clash).err().unwrap();
        assert_eq!(err, RegistryError::DuplicateName("ITEM".into()));
        // The failed registration left nothing behind.
        assert!(registry.record("other").is_none());
    }

    #[test]
    fn colliding_field_alias_rejected() {
        let registration = item_registration()
            .field(Field::new("Note", |i: &Item| &i.label, |i, v| i.label = v).alias("label"));
        let err = Registry::new().register(registration).err().unwrap();
        assert_eq!(
            err,
            RegistryError::FieldNameCollision {
                record: "item".into(),
                name: "label".into(),
                first: "Label".into(),
                second: "Note".into(),
            }
        );
    }

    #[test]
    fn add_alias_requires_known_name() {
        let mut registry = Registry::new();
        registry.register(item_registration()).unwrap();

        assert_eq!(
            registry.add_alias("nope", "x").err().unwrap(),
            RegistryError::UnknownRecordType("nope".into())
        );
        registry.add_alias("item", "thing").unwrap();
        assert_eq!(registry.record("thing").unwrap().aliases(), ["it", "thing"]);
        assert_eq!(
            registry.add_alias("item", "IT").err().unwrap(),
            RegistryError::DuplicateName("IT".into())
        );
    }

    #[test]
    fn find_or_create_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register(item_registration()).unwrap();
        let schema = registry.record("item").unwrap();

        let mut ctx = Ctx::default();
        assert!(schema.find_or_create(&mut ctx, "abc").unwrap());
        assert!(!schema.find_or_create(&mut ctx, "ABC").unwrap());
        assert_eq!(ctx.items.len(), 1);
        assert_eq!(ctx.items[0].key, "abc");
        assert_eq!(schema.lookup_key(&mut ctx, "aBc"), Some("abc".into()));
        assert_eq!(schema.lookup_key(&mut ctx, "zzz"), None);
    }

    #[test]
    fn snapshot_reports_defaults() {
        let mut registry = Registry::new();
        registry.register(item_registration()).unwrap();
        let schema = registry.registration_for::<Item>().unwrap();

        let item = Item {
            key: "k".into(),
            label: "Label".into(),
            count: 0,
        };
        let snapshot = schema.snapshot(&item).unwrap();
        assert_eq!(snapshot[1].value, Value::Text("Label".into()));
        assert!(!snapshot[1].is_default);
        assert!(snapshot[2].is_default);
        assert!(schema.snapshot(&42u8).is_none());
    }
}
