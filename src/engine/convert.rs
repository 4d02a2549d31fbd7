//! engine::convert
//!
//! Token to typed value conversion.
//!
//! # Pipeline
//!
//! The first matching stage wins:
//!
//! 1. Optional types: an empty token is absent
//! 2. Text passes through
//! 3. Sequences parse an array literal, converting each element
//! 4. Enums match variant names case-insensitively
//! 5. A custom converter registered for the exact target type
//! 6. Dates, time spans and UUIDs in their fixed formats
//! 7. Record references resolve through the target's registration
//! 8. Booleans and numbers, with invariant parsing rules
//!
//! Array literals accept `[a,b]`, `["a","b"]` and `['a','b']`.

use super::registry::Registry;
use crate::core::formats::{self, DATE_FORMAT, TIME_SPAN_FORMAT};
use crate::core::types::{ConvertError, EnumInfo, TypeDescriptor, TypeKind, Value};

impl<C: 'static> Registry<C> {
    /// Convert `token` into a value of type `ty`.
    ///
    /// `ctx` is consulted for record references and custom converters;
    /// conversion never creates records.
    ///
    /// # Errors
    ///
    /// Returns the `ConvertError` of the first stage that claims the type
    /// and rejects the token.
    pub fn convert(&self, ctx: &mut C, token: &str, ty: &TypeDescriptor) -> Result<Value, ConvertError> {
        match ty.kind() {
            TypeKind::Optional(inner) => {
                if token.is_empty() {
                    return Ok(Value::Null);
                }
                self.convert(ctx, token, inner)
            }
            TypeKind::Text => Ok(Value::Text(token.to_string())),
            TypeKind::Sequence(element) => self.convert_sequence(ctx, token, element),
            TypeKind::Enum(info) => convert_enum(token, ty, info),
            _ => {
                if let Some(converter) = self.converter(ty.id()) {
                    return converter.apply(ctx, token);
                }
                self.convert_scalar(ctx, token, ty)
            }
        }
    }

    fn convert_sequence(
        &self,
        ctx: &mut C,
        token: &str,
        element: &TypeDescriptor,
    ) -> Result<Value, ConvertError> {
        let elements = parse_array(token)?;
        let mut values = Vec::with_capacity(elements.len());
        for element_token in elements {
            values.push(self.convert(ctx, &element_token, element)?);
        }
        Ok(Value::Sequence(values))
    }

    fn convert_scalar(&self, ctx: &mut C, token: &str, ty: &TypeDescriptor) -> Result<Value, ConvertError> {
        let text = token.trim();
        match ty.kind() {
            TypeKind::Date => formats::parse_date(text)
                .map(Value::Date)
                .ok_or_else(|| invalid_format(token, ty, DATE_FORMAT)),
            TypeKind::TimeSpan => formats::parse_time_span(text)
                .map(Value::TimeSpan)
                .ok_or_else(|| invalid_format(token, ty, TIME_SPAN_FORMAT)),
            TypeKind::Uuid => uuid::Uuid::parse_str(text)
                .map(Value::Uuid)
                .map_err(|_| invalid_format(token, ty, "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx")),
            TypeKind::Record => {
                let schema = self
                    .record_for_type(ty.id())
                    .ok_or_else(|| ConvertError::failed(token, ty.name()))?;
                match schema.lookup_key(ctx, token) {
                    Some(key) => Ok(Value::Ref(key)),
                    None => {
                        tracing::debug!(record = schema.name(), key = token, "reference to missing record");
                        Ok(Value::Null)
                    }
                }
            }
            TypeKind::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(ConvertError::failed(token, ty.name()))
                }
            }
            TypeKind::Signed => text
                .parse::<i64>()
                .map(Value::Signed)
                .map_err(|_| ConvertError::failed(token, ty.name())),
            TypeKind::Unsigned => text
                .parse::<u64>()
                .map(Value::Unsigned)
                .map_err(|_| ConvertError::failed(token, ty.name())),
            TypeKind::Float => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ConvertError::failed(token, ty.name())),
            _ => Err(ConvertError::failed(token, ty.name())),
        }
    }
}

fn invalid_format(token: &str, ty: &TypeDescriptor, format: &'static str) -> ConvertError {
    ConvertError::InvalidFormat {
        value: token.to_string(),
        type_name: ty.name().to_string(),
        format,
    }
}

fn convert_enum(token: &str, ty: &TypeDescriptor, info: &EnumInfo) -> Result<Value, ConvertError> {
    let invalid = || ConvertError::InvalidEnumValue {
        value: token.to_string(),
        type_name: ty.name().to_string(),
        expected: info.variants.join(", "),
    };

    if !info.flags {
        return info
            .canonical(token.trim())
            .map(|name| Value::Enum(vec![name]))
            .ok_or_else(invalid);
    }

    let mut names = Vec::new();
    for part in token.split([',', '|']).map(str::trim).filter(|p| !p.is_empty()) {
        let name = info.canonical(part).ok_or_else(invalid)?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(Value::Enum(names))
}

/// Split an array literal into element tokens.
///
/// Bare segments are trimmed and empty ones dropped. Quoted elements keep
/// their exact text; numbers and booleans become their JSON text.
pub(crate) fn parse_array(token: &str) -> Result<Vec<String>, ConvertError> {
    let invalid = || ConvertError::InvalidArrayFormat(token.to_string());

    let trimmed = token.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;

    let has_double = inner.contains('"');
    let has_single = inner.contains('\'');

    if !has_double && !has_single {
        return Ok(inner
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect());
    }

    let json = if has_single && !has_double {
        format!("[{}]", inner.replace('\'', "\""))
    } else {
        trimmed.to_string()
    };

    let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).map_err(|_| invalid())?;
    parsed
        .into_iter()
        .map(|element| match element {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            serde_json::Value::Null => Ok(String::new()),
            _ => Err(invalid()),
        })
        .collect()
}
