//! Element kinds: the nine fixed-width value types a channel can carry.

use crate::buffer::Store;
use crate::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the nine supported element kinds, in host type-code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ElementKind {
    /// 64-bit float (code 0).
    Double,
    /// 32-bit float (code 1).
    Single,
    /// Signed 8-bit integer (code 2).
    Int8,
    /// Unsigned 8-bit integer (code 3).
    Uint8,
    /// Signed 16-bit integer (code 4).
    Int16,
    /// Unsigned 16-bit integer (code 5).
    Uint16,
    /// Signed 32-bit integer (code 6).
    Int32,
    /// Unsigned 32-bit integer (code 7).
    Uint32,
    /// Boolean, stored as one byte (code 8).
    Boolean,
}

impl ElementKind {
    /// All kinds, indexed by their code.
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Double,
        ElementKind::Single,
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Boolean,
    ];

    /// Map a configuration code in `0..=8` to its kind.
    pub fn from_code(code: u8) -> Result<Self, LoggerError> {
        Self::ALL.get(code as usize).copied().ok_or_else(|| {
            LoggerError::config(format!(
                "The input type must be an integer between 0 and 8, got {}",
                code
            ))
        })
    }

    /// The configuration code of this kind.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Size of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementKind::Double => std::mem::size_of::<f64>(),
            ElementKind::Single => std::mem::size_of::<f32>(),
            ElementKind::Int8 => std::mem::size_of::<i8>(),
            ElementKind::Uint8 => std::mem::size_of::<u8>(),
            ElementKind::Int16 => std::mem::size_of::<i16>(),
            ElementKind::Uint16 => std::mem::size_of::<u16>(),
            ElementKind::Int32 => std::mem::size_of::<i32>(),
            ElementKind::Uint32 => std::mem::size_of::<u32>(),
            ElementKind::Boolean => std::mem::size_of::<bool>(),
        }
    }

    /// Host type name.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Double => "double",
            ElementKind::Single => "single",
            ElementKind::Int8 => "int8",
            ElementKind::Uint8 => "uint8",
            ElementKind::Int16 => "int16",
            ElementKind::Uint16 => "uint16",
            ElementKind::Int32 => "int32",
            ElementKind::Uint32 => "uint32",
            ElementKind::Boolean => "boolean",
        }
    }

    /// True for the two floating-point kinds.
    pub fn is_float(self) -> bool {
        matches!(self, ElementKind::Double | ElementKind::Single)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ElementKind {
    type Error = LoggerError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<ElementKind> for u8 {
    fn from(kind: ElementKind) -> u8 {
        kind.code()
    }
}

/// A buffered value widened for formatting.
///
/// Floats widen to `f64`; integers and booleans widen to `i64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f64),
    Int(i64),
}

impl Scalar {
    /// The value as a float (exact for every integer kind).
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Float(v) => v,
            Scalar::Int(v) => v as f64,
        }
    }

    /// The value as an integer; floats truncate toward zero and saturate.
    pub fn as_i64(self) -> i64 {
        match self {
            Scalar::Float(v) => v as i64,
            Scalar::Int(v) => v,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that stores one of the nine element kinds.
///
/// Implemented for `f64, f32, i8, u8, i16, u16, i32, u32, bool` only.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + 'static + sealed::Sealed {
    /// The kind this type stores.
    const KIND: ElementKind;

    /// Widen for formatting.
    fn to_scalar(self) -> Scalar;

    #[doc(hidden)]
    fn cells(store: &Store) -> Option<&[Self]>;

    #[doc(hidden)]
    fn cells_mut(store: &mut Store) -> Option<&mut [Self]>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, |$v:ident| $scalar:expr) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            #[inline]
            fn to_scalar(self) -> Scalar {
                let $v = self;
                $scalar
            }

            #[inline]
            fn cells(store: &Store) -> Option<&[Self]> {
                match store {
                    Store::$variant(cells) => Some(cells),
                    _ => None,
                }
            }

            #[inline]
            fn cells_mut(store: &mut Store) -> Option<&mut [Self]> {
                match store {
                    Store::$variant(cells) => Some(cells),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(f64, Double, |v| Scalar::Float(v));
impl_element!(f32, Single, |v| Scalar::Float(v as f64));
impl_element!(i8, Int8, |v| Scalar::Int(v as i64));
impl_element!(u8, Uint8, |v| Scalar::Int(v as i64));
impl_element!(i16, Int16, |v| Scalar::Int(v as i64));
impl_element!(u16, Uint16, |v| Scalar::Int(v as i64));
impl_element!(i32, Int32, |v| Scalar::Int(v as i64));
impl_element!(u32, Uint32, |v| Scalar::Int(v as i64));
impl_element!(bool, Boolean, |v| Scalar::Int(v as i64));
