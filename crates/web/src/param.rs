//! Typed path parameters.
//!
//! The router percent-decodes each matched value with [`percent_decode`] and hands it to
//! [`bind`], which converts it to the [`ParamType`] the action declared. Handlers read the
//! results from [`Params`] by name or position.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// The type an action declares for one of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Text,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Bool,
    /// 64-bit floating point
    Float,
    Char,
    /// 8-bit signed integer
    Byte,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Int => "integer",
            Self::Long => "long",
            Self::Bool => "boolean",
            Self::Float => "float",
            Self::Char => "character",
            Self::Byte => "byte",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i32),
    Long(i64),
    Bool(bool),
    Float(f64),
    Char(char),
    Byte(i8),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Text(_) => ParamType::Text,
            Self::Int(_) => ParamType::Int,
            Self::Long(_) => ParamType::Long,
            Self::Bool(_) => ParamType::Bool,
            Self::Float(_) => ParamType::Float,
            Self::Char(_) => ParamType::Char,
            Self::Byte(_) => ParamType::Byte,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("parameter {name:?} value {value:?} is not a valid {expected}")]
    TypeConversion { name: String, value: String, expected: ParamType },
}

impl BindError {
    pub fn type_conversion<N: ToString, V: ToString>(name: N, value: V, expected: ParamType) -> Self {
        Self::TypeConversion { name: name.to_string(), value: value.to_string(), expected }
    }
}

/// Decodes `%XX` escapes in a path value. Escapes that do not form valid UTF-8 become
/// `U+FFFD`; a value without escapes is borrowed as is.
pub fn percent_decode(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(raw.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(raw),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Converts an already decoded `text` to `expected`.
///
/// Booleans accept `true`/`false` in any letter case; characters must be exactly one.
pub fn bind(name: &str, text: &str, expected: ParamType) -> Result<ParamValue, BindError> {
    let mismatch = || BindError::type_conversion(name, text, expected);

    let value = match expected {
        ParamType::Text => ParamValue::Text(text.to_owned()),
        ParamType::Int => ParamValue::Int(text.parse().map_err(|_e| mismatch())?),
        ParamType::Long => ParamValue::Long(text.parse().map_err(|_e| mismatch())?),
        ParamType::Float => ParamValue::Float(text.parse().map_err(|_e| mismatch())?),
        ParamType::Byte => ParamValue::Byte(text.parse().map_err(|_e| mismatch())?),
        ParamType::Bool => match text {
            t if t.eq_ignore_ascii_case("true") => ParamValue::Bool(true),
            t if t.eq_ignore_ascii_case("false") => ParamValue::Bool(false),
            _ => return Err(mismatch()),
        },
        ParamType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ParamValue::Char(c),
                _ => return Err(mismatch()),
            }
        }
    };
    Ok(value)
}

/// One bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self { name: name.into(), value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

/// Bound parameters of a matched action, in template order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    inner: Vec<Param>,
}

impl Params {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.inner.iter()
    }

    /// The value at `index` in template order.
    pub fn at(&self, index: usize) -> Option<&ParamValue> {
        self.inner.get(index).map(Param::value)
    }

    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.inner.iter().find(|param| param.name == name).map(Param::value)
    }

    /// The value called `name`, if present and bound as `T`.
    ///
    /// ```
    /// use strand_web::param::{Param, ParamValue, Params};
    ///
    /// let params: Params = [Param::new("id", ParamValue::Long(42))].into_iter().collect();
    /// assert_eq!(params.get::<i64>("id"), Some(42));
    /// assert_eq!(params.get::<String>("id"), None);
    /// ```
    pub fn get<T: FromParamValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_param_value)
    }
}

impl FromIterator<Param> for Params {
    fn from_iter<T: IntoIterator<Item = Param>>(iter: T) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// Rust types a [`ParamValue`] can be read back as.
pub trait FromParamValue: Sized {
    fn from_param_value(value: &ParamValue) -> Option<Self>;
}

macro_rules! from_param_value {
    ($ty:ty, $variant:ident) => {
        impl FromParamValue for $ty {
            fn from_param_value(value: &ParamValue) -> Option<Self> {
                match value {
                    ParamValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_param_value!(String, Text);
from_param_value!(i32, Int);
from_param_value!(i64, Long);
from_param_value!(bool, Bool);
from_param_value!(f64, Float);
from_param_value!(char, Char);
from_param_value!(i8, Byte);
