//! core::types
//!
//! Type descriptors and dynamic values shared by the converter, the binder
//! and the generator.
//!
//! # Types
//!
//! - [`TypeDescriptor`] - Identity and shape of a field or parameter type
//! - [`Value`] - A converted token, before it is handed to a typed setter
//! - [`FieldType`] - Bridge between a Rust type and its descriptor/value form
//! - [`RecordRef`] - Typed reference to another registered record, by key
//!
//! # Design
//!
//! Records are described by explicit descriptor tables instead of runtime
//! reflection. Every settable Rust type implements [`FieldType`], which names
//! its [`TypeKind`] (what the conversion pipeline does with a token) and
//! moves values in and out of the dynamic [`Value`] form.
//!
//! # Example
//!
//! ```
//! use seedline::core::types::{FieldType, TypeKind, Value};
//!
//! assert!(matches!(String::descriptor().kind(), TypeKind::Text));
//! assert_eq!(i32::from_value(Value::Signed(42)).unwrap(), 42);
//! assert!(u8::from_value(Value::Signed(-1)).is_err());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use thiserror::Error;
use uuid::Uuid;

use super::formats::{self, DATE_FORMAT, TIME_SPAN_FORMAT};

/// Errors from converting a token or value into a typed value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("invalid array format '{0}': expected [a,b,c] or [\"a\",\"b\"]")]
    InvalidArrayFormat(String),

    #[error("'{value}' is not a valid {type_name} (expected one of: {expected})")]
    InvalidEnumValue {
        value: String,
        type_name: String,
        expected: String,
    },

    #[error("'{value}' is not a valid {type_name}: expected format {format}")]
    InvalidFormat {
        value: String,
        type_name: String,
        format: &'static str,
    },

    #[error("cannot convert '{value}' to {type_name}")]
    ConversionFailed { value: String, type_name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: &'static str,
    },

    #[error("{0}")]
    Custom(String),
}

impl ConvertError {
    /// Shorthand for a failed conversion of `value` into `type_name`.
    pub fn failed(value: impl fmt::Display, type_name: impl Into<String>) -> Self {
        ConvertError::ConversionFailed {
            value: value.to_string(),
            type_name: type_name.into(),
        }
    }

    fn mismatch(expected: &str, found: &Value) -> Self {
        ConvertError::TypeMismatch {
            expected: expected.to_string(),
            found: found.kind_name(),
        }
    }
}

/// What the conversion pipeline does with a token of a given type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Token passes through unchanged.
    Text,
    /// `true` / `false`, case-insensitive.
    Bool,
    /// Signed integer.
    Signed,
    /// Unsigned integer.
    Unsigned,
    /// Floating point number.
    Float,
    /// Date in `yyyy-MM-dd` form.
    Date,
    /// Time span in `[-][d.]hh:mm:ss[.fffffff]` form.
    TimeSpan,
    /// UUID in any standard textual form.
    Uuid,
    /// Named variants, or a flag set when `flags` is true.
    Enum(EnumInfo),
    /// Bracketed array literal of the element type.
    Sequence(Box<TypeDescriptor>),
    /// Empty token converts to absent, anything else to the inner type.
    Optional(Box<TypeDescriptor>),
    /// Key of another registered record type.
    Record,
    /// No built-in parse; needs a custom converter.
    Opaque,
}

/// Variant names of an enumerated type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumInfo {
    /// Canonical variant names, in declaration order.
    pub variants: Vec<&'static str>,
    /// Whether comma-joined combinations are accepted.
    pub flags: bool,
}

impl EnumInfo {
    /// Find the canonical name matching `name` case-insensitively.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        self.variants
            .iter()
            .copied()
            .find(|v| v.eq_ignore_ascii_case(name))
    }
}

/// Identity and shape of a settable type.
///
/// The `id` is the [`TypeId`] custom converters are keyed by. For
/// [`RecordRef<T>`] it is the id of `T` itself, so a converter registered for
/// a record type applies to every reference to it.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: String,
    kind: TypeKind,
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind
    }
}

impl TypeDescriptor {
    /// Describe `T` with an explicit name and kind.
    pub fn of<T: 'static>(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: name.into(),
            kind,
        }
    }

    /// Describe an enumerated type.
    pub fn enumeration<T: 'static>(variants: Vec<&'static str>, flags: bool) -> Self {
        Self::of::<T>(short_type_name::<T>(), TypeKind::Enum(EnumInfo { variants, flags }))
    }

    /// Describe a type with no built-in parse.
    pub fn opaque<T: 'static>() -> Self {
        Self::of::<T>(short_type_name::<T>(), TypeKind::Opaque)
    }

    /// The type id used for custom converter and registration lookups.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Short type name, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the conversion pipeline does with this type.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Whether an empty token is accepted as "absent".
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, TypeKind::Optional(_))
    }

    /// Human-readable placeholder for usage text.
    ///
    /// # Example
    ///
    /// ```
    /// use seedline::core::types::FieldType;
    ///
    /// assert_eq!(Vec::<String>::descriptor().describe(), "[text,...]");
    /// assert_eq!(Option::<i32>::descriptor().describe(), "integer");
    /// ```
    pub fn describe(&self) -> String {
        match &self.kind {
            TypeKind::Text => "text".to_string(),
            TypeKind::Bool => "true|false".to_string(),
            TypeKind::Signed | TypeKind::Unsigned => "integer".to_string(),
            TypeKind::Float => "number".to_string(),
            TypeKind::Date => DATE_FORMAT.to_string(),
            TypeKind::TimeSpan => TIME_SPAN_FORMAT.to_string(),
            TypeKind::Uuid => "uuid".to_string(),
            TypeKind::Enum(info) if info.flags => format!("{},...", info.variants.join("|")),
            TypeKind::Enum(info) => info.variants.join("|"),
            TypeKind::Sequence(element) => format!("[{},...]", element.describe()),
            TypeKind::Optional(inner) => inner.describe(),
            TypeKind::Record => format!("{} key", self.name.to_ascii_lowercase()),
            TypeKind::Opaque => self.name.clone(),
        }
    }
}

/// Last path segment of a Rust type name (`seedline::demo::Book` -> `Book`).
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A value produced by a custom converter for a type the pipeline does not
/// know natively.
#[derive(Clone)]
pub struct CustomValue {
    value: Arc<dyn Any + Send + Sync>,
    display: String,
}

impl CustomValue {
    /// Wrap a value; `display` is what the generator emits for it.
    pub fn new<V: Any + Send + Sync>(value: V, display: impl Into<String>) -> Self {
        Self {
            value: Arc::new(value),
            display: display.into(),
        }
    }

    /// Borrow the wrapped value if it is a `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    /// Textual form used by the generator.
    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomValue").field(&self.display).finish()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// A converted value on its way to (or from) a typed field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Date(NaiveDate),
    TimeSpan(TimeDelta),
    Uuid(Uuid),
    /// Canonical variant names; one for plain enums, zero or more for flags.
    Enum(Vec<&'static str>),
    Sequence(Vec<Value>),
    /// Identity key of a referenced record.
    Ref(String),
    Custom(CustomValue),
}

impl Value {
    /// Wrap an arbitrary value produced by a custom converter.
    pub fn custom<V: Any + Send + Sync + fmt::Display>(value: V) -> Self {
        let display = value.to_string();
        Value::Custom(CustomValue::new(value, display))
    }

    /// Whether this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Variant name, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Signed(_) => "signed integer",
            Value::Unsigned(_) => "unsigned integer",
            Value::Float(_) => "number",
            Value::Date(_) => "date",
            Value::TimeSpan(_) => "time span",
            Value::Uuid(_) => "uuid",
            Value::Enum(_) => "enum",
            Value::Sequence(_) => "sequence",
            Value::Ref(_) => "record reference",
            Value::Custom(_) => "custom value",
        }
    }

    /// Render as command text, before any quoting.
    ///
    /// Sequences render as `[a,b]`, or as a JSON array when an element would
    /// not survive the bare form.
    ///
    /// # Example
    ///
    /// ```
    /// use seedline::core::types::Value;
    ///
    /// let plain = Value::Sequence(vec![Value::Text("en".into()), Value::Text("es".into())]);
    /// assert_eq!(plain.render(), "[en,es]");
    ///
    /// let tricky = Value::Sequence(vec![Value::Text("a,b".into())]);
    /// assert_eq!(tricky.render(), r#"["a,b"]"#);
    /// ```
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) | Value::Ref(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Signed(i) => i.to_string(),
            Value::Unsigned(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Date(d) => formats::format_date(*d),
            Value::TimeSpan(t) => formats::format_time_span(*t),
            Value::Uuid(u) => u.hyphenated().to_string(),
            Value::Enum(names) => names.join(","),
            Value::Sequence(items) => {
                let rendered: Vec<String> = items.iter().map(Value::render).collect();
                let bare_safe = rendered.iter().all(|item| {
                    !item.is_empty()
                        && item.trim() == item
                        && !item.contains([',', '"', '\'', '[', ']', '\n', '\r'])
                });
                if bare_safe {
                    format!("[{}]", rendered.join(","))
                } else {
                    serde_json::to_string(&rendered).unwrap_or_else(|_| "[]".to_string())
                }
            }
            Value::Custom(custom) => custom.display().to_string(),
        }
    }
}

/// Bridge between a Rust type and the conversion pipeline.
///
/// Implemented for strings, booleans, integers, floats, [`NaiveDate`],
/// [`TimeDelta`], [`Uuid`], `Vec<T>`, `Option<T>` and [`RecordRef<T>`].
/// Enums use [`field_enum!`](crate::field_enum), bitflags types use
/// [`flags_field!`](crate::flags_field). Anything else implements it by hand
/// with [`TypeDescriptor::opaque`] and a custom converter.
pub trait FieldType: Sized + 'static {
    /// Describe this type to the converter and usage generators.
    fn descriptor() -> TypeDescriptor;

    /// Take a converted value.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError` if the value has the wrong shape or range.
    fn from_value(value: Value) -> Result<Self, ConvertError>;

    /// Produce the value the generator renders.
    fn to_value(&self) -> Value;
}

impl FieldType for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("text", TypeKind::Text)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(ConvertError::mismatch("text", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldType for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("bool", TypeKind::Bool)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ConvertError::mismatch("bool", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! integer_field_type {
    ($kind:ident, $variant:ident, $wide:ty, $($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<Self>(stringify!($ty), TypeKind::$kind)
                }

                fn from_value(value: Value) -> Result<Self, ConvertError> {
                    match value {
                        Value::Signed(i) => <$ty>::try_from(i)
                            .map_err(|_| ConvertError::failed(i, stringify!($ty))),
                        Value::Unsigned(u) => <$ty>::try_from(u)
                            .map_err(|_| ConvertError::failed(u, stringify!($ty))),
                        other => Err(ConvertError::mismatch(stringify!($ty), &other)),
                    }
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $wide)
                }
            }
        )+
    };
}

integer_field_type!(Signed, Signed, i64, i8, i16, i32, i64, isize);
integer_field_type!(Unsigned, Unsigned, u64, u8, u16, u32, u64, usize);

impl FieldType for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("f64", TypeKind::Float)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Signed(i) => Ok(i as f64),
            Value::Unsigned(u) => Ok(u as f64),
            other => Err(ConvertError::mismatch("f64", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldType for f32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("f32", TypeKind::Float)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        f64::from_value(value).map(|f| f as f32)
    }

    fn to_value(&self) -> Value {
        // Widen through the shortest decimal form so 0.1f32 renders as 0.1.
        Value::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
    }
}

impl FieldType for NaiveDate {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("date", TypeKind::Date)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(ConvertError::mismatch("date", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FieldType for TimeDelta {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("time span", TypeKind::TimeSpan)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::TimeSpan(t) => Ok(t),
            other => Err(ConvertError::mismatch("time span", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::TimeSpan(*self)
    }
}

impl FieldType for Uuid {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>("uuid", TypeKind::Uuid)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Uuid(u) => Ok(u),
            other => Err(ConvertError::mismatch("uuid", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn descriptor() -> TypeDescriptor {
        let inner = T::descriptor();
        TypeDescriptor::of::<Self>(inner.name().to_string(), TypeKind::Optional(Box::new(inner)))
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        let element = T::descriptor();
        TypeDescriptor::of::<Self>(
            format!("list of {}", element.name()),
            TypeKind::Sequence(Box::new(element)),
        )
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ConvertError::mismatch("sequence", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(FieldType::to_value).collect())
    }
}

/// Typed reference to another registered record, held by its identity key.
///
/// Converting a token into a `RecordRef<T>` looks the key up in `T`'s
/// registration (never creating it) and stores the key as the record holds
/// it, so `EN` resolves to `en` when the language was added as `en`.
pub struct RecordRef<T> {
    key: String,
    marker: PhantomData<fn() -> T>,
}

impl<T> RecordRef<T> {
    /// Reference the record with identity `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            marker: PhantomData,
        }
    }

    /// The referenced record's identity key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for RecordRef<T> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T> fmt::Debug for RecordRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordRef<{}>({:?})", short_type_name::<T>(), self.key)
    }
}

impl<T> PartialEq for RecordRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for RecordRef<T> {}

impl<T> std::hash::Hash for RecordRef<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Display for RecordRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl<T: 'static> FieldType for RecordRef<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<T>(short_type_name::<T>(), TypeKind::Record)
    }

    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Ref(key) => Ok(Self::new(key)),
            other => Err(ConvertError::mismatch("record reference", &other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Ref(self.key.clone())
    }
}

/// Take the single variant name out of an enum value.
///
/// Used by [`field_enum!`](crate::field_enum).
pub fn single_enum_name(value: Value, type_name: &str) -> Result<&'static str, ConvertError> {
    match value {
        Value::Enum(names) if names.len() == 1 => Ok(names[0]),
        Value::Enum(names) => Err(ConvertError::failed(names.join(","), type_name)),
        other => Err(ConvertError::mismatch(type_name, &other)),
    }
}

/// Descriptor for a `bitflags` type. Used by [`flags_field!`](crate::flags_field).
pub fn flags_descriptor<F: bitflags::Flags + 'static>() -> TypeDescriptor {
    let variants = F::FLAGS
        .iter()
        .map(|flag| flag.name())
        .filter(|name| !name.is_empty())
        .collect();
    TypeDescriptor::enumeration::<F>(variants, true)
}

/// Rebuild a `bitflags` value from its flag names.
pub fn flags_from_value<F: bitflags::Flags + 'static>(value: Value) -> Result<F, ConvertError> {
    match value {
        Value::Enum(names) => names.into_iter().try_fold(F::empty(), |acc, name| {
            F::from_name(name)
                .map(|flag| acc.union(flag))
                .ok_or_else(|| ConvertError::failed(name, short_type_name::<F>()))
        }),
        other => Err(ConvertError::mismatch(short_type_name::<F>(), &other)),
    }
}

/// Flag names set in a `bitflags` value.
pub fn flags_to_value<F: bitflags::Flags>(flags: &F) -> Value {
    Value::Enum(flags.iter_names().map(|(name, _)| name).collect())
}

/// Declare an enum usable as a record field or command parameter.
///
/// Variant names are matched case-insensitively when converting and emitted
/// verbatim when generating.
///
/// # Example
///
/// ```
/// use seedline::core::types::{FieldType, Value};
///
/// seedline::field_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
///     pub enum Shelf {
///         #[default]
///         Front,
///         Back,
///     }
/// }
///
/// assert_eq!(Shelf::from_value(Value::Enum(vec!["Back"])).unwrap(), Shelf::Back);
/// assert_eq!(Shelf::Front.to_value(), Value::Enum(vec!["Front"]));
/// ```
#[macro_export]
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl $crate::core::types::FieldType for $name {
            fn descriptor() -> $crate::core::types::TypeDescriptor {
                $crate::core::types::TypeDescriptor::enumeration::<Self>(
                    vec![$(stringify!($variant)),+],
                    false,
                )
            }

            fn from_value(
                value: $crate::core::types::Value,
            ) -> ::std::result::Result<Self, $crate::core::types::ConvertError> {
                let name = $crate::core::types::single_enum_name(value, stringify!($name))?;
                $(
                    if name == stringify!($variant) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::core::types::ConvertError::failed(name, stringify!($name)))
            }

            fn to_value(&self) -> $crate::core::types::Value {
                match self {
                    $( $name::$variant => $crate::core::types::Value::Enum(vec![stringify!($variant)]), )+
                }
            }
        }
    };
}

/// Make a `bitflags` type usable as a record field or command parameter.
///
/// Flag sets are written comma-joined (`Hardcover,Ebook`).
#[macro_export]
macro_rules! flags_field {
    ($ty:ty) => {
        impl $crate::core::types::FieldType for $ty {
            fn descriptor() -> $crate::core::types::TypeDescriptor {
                $crate::core::types::flags_descriptor::<$ty>()
            }

            fn from_value(
                value: $crate::core::types::Value,
            ) -> ::std::result::Result<Self, $crate::core::types::ConvertError> {
                $crate::core::types::flags_from_value::<$ty>(value)
            }

            fn to_value(&self) -> $crate::core::types::Value {
                $crate::core::types::flags_to_value(self)
            }
        }
    };
}
