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

//! The builtin primitive type tags a [`crate::dcparameter::Parameter`] can
//! carry, and the handful of queries the codec and hash generator need
//! about them (fixed wire size, numeric signedness, array-ness).

use std::fmt;

/// Every builtin DC primitive, numbered to match the hash generator's
/// `DCTypes` contract. `Invalid` is a sentinel used only when hashing a
/// dtype the hasher cannot otherwise identify (never produced by a
/// successful parse).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DCTypeEnum {
    TInt8 = 0,
    TInt16 = 1,
    TInt32 = 2,
    TInt64 = 3,
    TUInt8 = 4,
    TUInt16 = 5,
    TUInt32 = 6,
    TUInt64 = 7,
    TFloat64 = 8,
    TString = 9,
    TBlob = 10,
    TBlob32 = 11,
    TInt16Array = 12,
    TInt32Array = 13,
    TUInt16Array = 14,
    TUInt32Array = 15,
    TInt8Array = 16,
    TUInt8Array = 17,
    TUInt32Uint8Array = 18,
    TChar = 19,
    TInvalid = 20,
}

impl DCTypeEnum {
    /// Parses a builtin type-tag keyword as it appears in DC source.
    pub fn from_keyword(name: &str) -> Option<Self> {
        use DCTypeEnum::*;
        Some(match name {
            "int8" => TInt8,
            "int16" => TInt16,
            "int32" => TInt32,
            "int64" => TInt64,
            "uint8" => TUInt8,
            "uint16" => TUInt16,
            "uint32" => TUInt32,
            "uint64" => TUInt64,
            "float64" => TFloat64,
            "char" => TChar,
            "string" => TString,
            "blob" => TBlob,
            "blob32" => TBlob32,
            "int16array" => TInt16Array,
            "int32array" => TInt32Array,
            "uint16array" => TUInt16Array,
            "uint32array" => TUInt32Array,
            "int8array" => TInt8Array,
            "uint8array" => TUInt8Array,
            "uint32uint8array" => TUInt32Uint8Array,
            _ => return None,
        })
    }

    pub fn is_legacy_array(&self) -> bool {
        matches!(
            self,
            DCTypeEnum::TInt16Array
                | DCTypeEnum::TInt32Array
                | DCTypeEnum::TUInt16Array
                | DCTypeEnum::TUInt32Array
                | DCTypeEnum::TInt8Array
                | DCTypeEnum::TUInt8Array
                | DCTypeEnum::TUInt32Uint8Array
        )
    }

    pub fn is_sized(&self) -> bool {
        matches!(self, DCTypeEnum::TString | DCTypeEnum::TBlob | DCTypeEnum::TBlob32)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DCTypeEnum::TInt8
                | DCTypeEnum::TInt16
                | DCTypeEnum::TInt32
                | DCTypeEnum::TInt64
                | DCTypeEnum::TInt16Array
                | DCTypeEnum::TInt32Array
                | DCTypeEnum::TInt8Array
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, DCTypeEnum::TFloat64)
    }

    /// `Some(n)` iff every legal value of this builtin tag occupies
    /// exactly `n` bytes on the wire. `None` for the sized/variable-length
    /// family and for the legacy array tags (which are always arrays,
    /// never a single scalar on their own).
    pub fn fixed_byte_size(&self) -> Option<usize> {
        use DCTypeEnum::*;
        match self {
            TInt8 | TUInt8 | TChar => Some(1),
            TInt16 | TUInt16 => Some(2),
            TInt32 | TUInt32 => Some(4),
            TInt64 | TUInt64 | TFloat64 => Some(8),
            _ => None,
        }
    }

    /// Byte width of a single legacy-array element, matching the
    /// original's `struct.pack` hack for `uint32uint8array`.
    pub fn legacy_element_byte_size(&self) -> Option<usize> {
        use DCTypeEnum::*;
        match self {
            TInt8Array | TUInt8Array => Some(1),
            TInt16Array | TUInt16Array => Some(2),
            TInt32Array | TUInt32Array => Some(4),
            TUInt32Uint8Array => Some(5),
            _ => None,
        }
    }
}

impl fmt::Display for DCTypeEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DCTypeEnum::*;
        let name = match self {
            TInt8 => "int8",
            TInt16 => "int16",
            TInt32 => "int32",
            TInt64 => "int64",
            TUInt8 => "uint8",
            TUInt16 => "uint16",
            TUInt32 => "uint32",
            TUInt64 => "uint64",
            TFloat64 => "float64",
            TString => "string",
            TBlob => "blob",
            TBlob32 => "blob32",
            TInt16Array => "int16array",
            TInt32Array => "int32array",
            TUInt16Array => "uint16array",
            TUInt32Array => "uint32array",
            TInt8Array => "int8array",
            TUInt8Array => "uint8array",
            TUInt32Uint8Array => "uint32uint8array",
            TChar => "char",
            TInvalid => "invalid",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn keyword_roundtrips_through_display() {
        for kw in [
            "int8", "uint64", "float64", "char", "string", "blob", "blob32", "int16array",
            "uint32uint8array",
        ] {
            let ty = DCTypeEnum::from_keyword(kw).unwrap();
            assert_eq!(ty.to_string(), kw);
        }
    }

    #[test]
    fn fixed_byte_size_only_for_plain_scalars() {
        assert_eq!(DCTypeEnum::TUInt32.fixed_byte_size(), Some(4));
        assert_eq!(DCTypeEnum::TString.fixed_byte_size(), None);
        assert_eq!(DCTypeEnum::TUInt32Uint8Array.fixed_byte_size(), None);
    }

    #[test]
    fn uint32uint8array_element_is_five_bytes() {
        assert_eq!(DCTypeEnum::TUInt32Uint8Array.legacy_element_byte_size(), Some(5));
    }

    #[test]
    fn discriminants_match_the_python_original_numbering() {
        assert_eq!(DCTypeEnum::TInt8 as i32, 0);
        assert_eq!(DCTypeEnum::TFloat64 as i32, 8);
        assert_eq!(DCTypeEnum::TBlob32 as i32, 11);
        assert_eq!(DCTypeEnum::TUInt32Uint8Array as i32, 18);
        assert_eq!(DCTypeEnum::TChar as i32, 19);
        assert_eq!(DCTypeEnum::TInvalid as i32, 20);
    }
}
