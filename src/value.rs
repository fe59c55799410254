//! Values a BACnet reading can carry.
//!
//! A reading is either a single scalar or an ordered list of scalars (BACnet
//! array properties such as `priorityArray`). The formatter switches on the
//! variant instead of inspecting types at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single primitive value.
///
/// # Examples
///
/// ```
/// use telegraf_bacnet::Scalar;
///
/// assert_eq!(Scalar::Float(72.3).to_string(), "72.3");
/// assert_eq!(Scalar::from("degF").to_string(), "degF");
/// assert!(Scalar::Bool(true).is_bool());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            // Whole floats keep a fractional digit so `1.0` and `1` stay distinct.
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// The value of a reading, or of a tag merged from a buffered reading.
///
/// Sequence values render one line per element; when a sequence ends up as a
/// tag value it is written as `[a, b, c]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    Sequence(Vec<Scalar>),
}

impl FieldValue {
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn as_sequence(&self) -> Option<&[Scalar]> {
        match self {
            Self::Sequence(v) => Some(v),
            Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => v.fmt(f),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! field_value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    Self::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

field_value_from_scalar!(bool, i64, i32, u32, f64, &str, String);
