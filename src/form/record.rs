use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;

use super::controller::{FormError, FormResult};

/// Name of one field of a record.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldKey(Cow<'static, str>);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn owned(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self::owned(value)
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(value: &FieldKey) -> Self {
        value.clone()
    }
}

/// Scalar value stored in a record field.
///
/// Equality is strict: `Text("1")` and `Number(1)` are different values.
/// With the `serde` feature, text is a JSON string and numbers are JSON
/// numbers; `Text` is listed first so a string never comes back as a number.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Text(String),
    #[cfg_attr(feature = "serde", serde(with = "rust_decimal::serde::float"))]
    Number(Decimal),
}

impl FieldValue {
    /// The value as an input widget would display it.
    pub fn to_raw(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Number(value) => value.normalize().to_string(),
            FieldValue::Text(value) => value.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

/// Conversion between a typed record field and the engine's scalar view of it.
pub trait FieldCodec: Sized {
    fn to_field_value(&self) -> FieldValue;
    fn parse_raw(raw: &str) -> Result<Self, String>;
}

impl FieldCodec for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn parse_raw(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FieldCodec for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn parse_raw(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            other => Err(format!("`{other}` is not a boolean")),
        }
    }
}

impl FieldCodec for Decimal {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(*self)
    }

    fn parse_raw(raw: &str) -> Result<Self, String> {
        Decimal::from_str(raw.trim()).map_err(|error| error.to_string())
    }
}

macro_rules! integer_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldCodec for $ty {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Number(Decimal::from(*self))
                }

                fn parse_raw(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|error| error.to_string())
                }
            }
        )*
    };
}

integer_codec!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<C> FieldCodec for Option<C>
where
    C: FieldCodec,
{
    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map(FieldCodec::to_field_value)
            .unwrap_or(FieldValue::Null)
    }

    fn parse_raw(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        C::parse_raw(raw).map(Some)
    }
}

/// A record edited through a form.
///
/// Usually derived with `#[derive(FormRecord)]`; [`DynamicRecord`] covers
/// records whose shape is only known at runtime.
pub trait FormRecord: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Keys present in this record.
    fn field_keys(&self) -> Vec<FieldKey>;

    /// `None` when the key is not part of the record.
    fn field_value(&self, key: &FieldKey) -> Option<FieldValue>;

    /// Writes raw text coming from an input into the field.
    fn apply_raw(&mut self, key: &FieldKey, raw: &str) -> FormResult<()>;

    fn raw_value(&self, key: &FieldKey) -> String {
        self.field_value(key)
            .map(|value| value.to_raw())
            .unwrap_or_default()
    }
}

pub type DynamicRecord = BTreeMap<FieldKey, FieldValue>;

impl FormRecord for DynamicRecord {
    type Fields = ();

    fn fields() -> Self::Fields {}

    fn field_keys(&self) -> Vec<FieldKey> {
        self.keys().cloned().collect()
    }

    fn field_value(&self, key: &FieldKey) -> Option<FieldValue> {
        self.get(key).cloned()
    }

    fn apply_raw(&mut self, key: &FieldKey, raw: &str) -> FormResult<()> {
        self.insert(key.clone(), FieldValue::Text(raw.to_string()));
        Ok(())
    }
}

#[doc(hidden)]
pub fn parse_field<C>(key: &FieldKey, raw: &str) -> FormResult<C>
where
    C: FieldCodec,
{
    C::parse_raw(raw).map_err(|reason| FormError::InvalidRawValue {
        key: key.clone(),
        raw: raw.to_string(),
        reason,
    })
}
