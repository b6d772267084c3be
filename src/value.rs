/*
    This file is part of Donet.

    Copyright © 2024 Max Rodriguez

    Donet is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    Donet is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with Donet. If not, see <https://www.gnu.org/licenses/>.
*/

//! [`DCValue`] is the dynamically-typed runtime value this crate packs
//! and unpacks against a schema. The Python original reflects over an
//! arbitrary host object's attributes (`getattr`/`setattr`) to find the
//! value for a field; Rust has no equivalent dynamic dispatch, so callers
//! instead supply and receive `DCValue`s positionally, in declared field
//! order (see [`crate::dclass::DClass::pack_values`]).

use crate::error::EncodeError;

/// A value conforming to some [`crate::dcparameter::Parameter`].
#[derive(Debug, Clone)]
pub enum DCValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    /// Elements of an `ArrayParameter`, or the `(u32, u8)` pair of a
    /// `uint32uint8array` element.
    Array(Vec<DCValue>),
    /// Field values of a `StructParameter`, in declared field order.
    Struct(Vec<DCValue>),
    /// A switch value: the discriminant followed by the selected case's
    /// (or default case's) parameter values, in order.
    Switch(Vec<DCValue>),
}

/// Numeric-aware: `Int`/`UInt`/`Float` compare equal across variants when
/// they hold the same value. A switch's case labels always parse as `Int`
/// (`parse_literal_value` has no type context to pick `UInt`), while an
/// unsigned discriminant unpacks as `UInt` — without this, matching a case
/// against an unpacked `uint8`/`uint16`/`uint32` discriminant always misses.
impl PartialEq for DCValue {
    fn eq(&self, other: &Self) -> bool {
        use DCValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Int(a), UInt(b)) | (UInt(b), Int(a)) => *a >= 0 && *a as u64 == *b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => *a as f64 == *b,
            (UInt(a), Float(b)) | (Float(b), UInt(a)) => *a as f64 == *b,
            (Bool(a), Bool(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Struct(a), Struct(b)) => a == b,
            (Switch(a), Switch(b)) => a == b,
            _ => false,
        }
    }
}

impl DCValue {
    pub fn as_i64(&self) -> Result<i64, EncodeError> {
        match self {
            DCValue::Int(v) => Ok(*v),
            DCValue::UInt(v) => Ok(*v as i64),
            DCValue::Float(v) => Ok(*v as i64),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_f64(&self) -> Result<f64, EncodeError> {
        match self {
            DCValue::Int(v) => Ok(*v as f64),
            DCValue::UInt(v) => Ok(*v as f64),
            DCValue::Float(v) => Ok(*v),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, EncodeError> {
        match self {
            DCValue::Bool(v) => Ok(*v),
            DCValue::Int(v) => Ok(*v != 0),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], EncodeError> {
        match self {
            DCValue::Bytes(b) => Ok(b),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_array(&self) -> Result<&[DCValue], EncodeError> {
        match self {
            DCValue::Array(v) => Ok(v),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_struct(&self) -> Result<&[DCValue], EncodeError> {
        match self {
            DCValue::Struct(v) => Ok(v),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }

    pub fn as_switch(&self) -> Result<&[DCValue], EncodeError> {
        match self {
            DCValue::Switch(v) => Ok(v),
            _ => Err(EncodeError::WrongArity { expected: 1, got: 0 }),
        }
    }
}

impl From<i64> for DCValue {
    fn from(v: i64) -> Self {
        DCValue::Int(v)
    }
}

impl From<u64> for DCValue {
    fn from(v: u64) -> Self {
        DCValue::UInt(v)
    }
}

impl From<f64> for DCValue {
    fn from(v: f64) -> Self {
        DCValue::Float(v)
    }
}

impl From<bool> for DCValue {
    fn from(v: bool) -> Self {
        DCValue::Bool(v)
    }
}

impl From<&str> for DCValue {
    fn from(v: &str) -> Self {
        DCValue::Bytes(v.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for DCValue {
    fn from(v: Vec<u8>) -> Self {
        DCValue::Bytes(v)
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn int_converts_to_float_for_float_parameters() {
        let v = DCValue::Int(2);
        assert_eq!(v.as_f64().unwrap(), 2.0);
    }

    #[test]
    fn bytes_from_str_is_utf8() {
        let v: DCValue = "hello".into();
        assert_eq!(v.as_bytes().unwrap(), b"hello");
    }

    #[test]
    fn int_and_uint_of_the_same_value_compare_equal() {
        assert_eq!(DCValue::Int(4), DCValue::UInt(4));
        assert_eq!(DCValue::UInt(4), DCValue::Int(4));
        assert_ne!(DCValue::Int(-1), DCValue::UInt(1));
    }
}
