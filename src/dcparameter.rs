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

//! [`Parameter`]: the value types a field can carry on the wire —
//! primitive scalars, sized byte strings, N-dimensional arrays (including
//! the legacy packed-array tags), nested structs/dclasses, and switch
//! (tagged union) discriminants.

use crate::dcfile::DCFile;
use crate::dcnumeric::{FRange, IRange};
use crate::dctype::DCTypeEnum;
use crate::datagram::{Datagram, DatagramIterator};
use crate::error::{DecodeError, EncodeError};
use crate::hashgen::HashGenerator;
use crate::value::DCValue;

/// `flags == !0` is the "omit from hash" sentinel used by fields; no
/// real field ever sets every bit.
pub const FLAGS_UNSET: u32 = !0;

/// A single parameter value kind. Per SPEC_FULL.md §9, the Int/Float/Char
/// and Sized (string/blob/blob32) families are collapsed into one
/// `Primitive` variant, tagged by the underlying [`DCTypeEnum`].
#[derive(Debug, Clone)]
pub enum Parameter {
    Primitive(SimpleParameter),
    Array(ArrayParameter),
    Struct(StructParameter),
    Switch(SwitchParameter),
}

impl Parameter {
    pub fn identifier(&self) -> &str {
        match self {
            Parameter::Primitive(p) => &p.identifier,
            Parameter::Array(p) => &p.identifier,
            Parameter::Struct(p) => &p.identifier,
            Parameter::Switch(p) => &p.identifier,
        }
    }

    pub fn default(&self) -> Option<&DCValue> {
        match self {
            Parameter::Primitive(p) => p.default.as_ref(),
            Parameter::Array(p) => p.default.as_ref(),
            Parameter::Struct(p) => p.default.as_ref(),
            Parameter::Switch(_) => None,
        }
    }

    pub fn pack_default(&self, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        match self.default() {
            Some(v) => self.pack_value(v, dg, dcfile),
            None => Ok(()),
        }
    }

    pub fn pack_value(&self, value: &DCValue, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        match self {
            Parameter::Primitive(p) => p.pack_value(value, dg),
            Parameter::Array(p) => p.pack_value(value, dg, dcfile),
            Parameter::Struct(p) => p.pack_value(value, dg, dcfile),
            Parameter::Switch(p) => p.pack_value(value, dg, dcfile),
        }
    }

    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        match self {
            Parameter::Primitive(p) => p.unpack_value(dgi),
            Parameter::Array(p) => p.unpack_value(dgi, dcfile),
            Parameter::Struct(p) => p.unpack_value(dgi, dcfile),
            Parameter::Switch(p) => p.unpack_value(dgi, dcfile),
        }
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<u8>, DecodeError> {
        match self {
            Parameter::Primitive(p) => p.unpack_bytes(dgi),
            Parameter::Array(p) => p.unpack_bytes(dgi),
            Parameter::Struct(p) => p.unpack_bytes(dgi, dcfile),
            Parameter::Switch(p) => p.unpack_bytes(dgi, dcfile),
        }
    }

    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        match self {
            Parameter::Primitive(p) => p.generate_hash(hash_gen),
            Parameter::Array(p) => p.generate_hash(hash_gen, dcfile),
            Parameter::Struct(p) => p.generate_hash(hash_gen, dcfile),
            Parameter::Switch(p) => p.generate_hash(hash_gen, dcfile),
        }
    }

    pub fn fixed_byte_size(&self) -> Option<usize> {
        match self {
            Parameter::Primitive(p) => p.fixed_byte_size,
            Parameter::Array(p) => p.total_fixed_byte_size(),
            Parameter::Struct(_) => None,
            Parameter::Switch(_) => None,
        }
    }
}

/// Packs a single scalar integer/float/char value, applying the
/// Int-over-float divisor-and-truncate rule from SPEC_FULL.md §4.3.
fn pack_scalar(dtype: DCTypeEnum, value: &DCValue, divisor: i64, dg: &mut Datagram) -> Result<(), EncodeError> {
    use DCTypeEnum::*;

    let as_int = |v: &DCValue, divisor: i64| -> Result<i64, EncodeError> {
        Ok(match v {
            DCValue::Float(f) => (*f * divisor as f64).trunc() as i64,
            other => other.as_i64()?,
        })
    };

    match dtype {
        TInt8 => dg.add_i8(as_int(value, divisor)? as i8)?,
        TInt16 => dg.add_i16(as_int(value, divisor)? as i16)?,
        TInt32 => dg.add_i32(as_int(value, divisor)? as i32)?,
        TInt64 => dg.add_i64(as_int(value, divisor)?)?,
        TUInt8 | TChar => dg.add_u8(as_int(value, divisor)? as u8)?,
        TUInt16 => dg.add_u16(as_int(value, divisor)? as u16)?,
        TUInt32 => dg.add_u32(as_int(value, divisor)? as u32)?,
        TUInt64 => dg.add_u64(as_int(value, divisor)? as u64)?,
        TFloat64 => dg.add_float64(value.as_f64()?)?,
        _ => return Err(EncodeError::WrongArity { expected: 1, got: 0 }),
    }
    Ok(())
}

fn unpack_scalar(dtype: DCTypeEnum, dgi: &mut DatagramIterator) -> Result<DCValue, DecodeError> {
    use DCTypeEnum::*;

    Ok(match dtype {
        TInt8 => DCValue::Int(dgi.read_i8()? as i64),
        TInt16 => DCValue::Int(dgi.read_i16()? as i64),
        TInt32 => DCValue::Int(dgi.read_i32()? as i64),
        TInt64 => DCValue::Int(dgi.read_i64()?),
        TUInt8 | TChar => DCValue::UInt(dgi.read_u8()? as u64),
        TUInt16 => DCValue::UInt(dgi.read_u16()? as u64),
        TUInt32 => DCValue::UInt(dgi.read_u32()? as u64),
        TUInt64 => DCValue::UInt(dgi.read_u64()?),
        TFloat64 => DCValue::Float(dgi.read_float64()?),
        _ => return Err(DecodeError::UnexpectedEof),
    })
}

/// Packs a length-prefixed byte string. `blob32` uses a `u32` prefix on
/// both pack and unpack; `string`/`blob` use `u16` on both — the
/// corrected intent of the original's inverted `unpack_value` (see
/// DESIGN.md).
fn pack_sized(dtype: DCTypeEnum, bytes: &[u8], dg: &mut Datagram) -> Result<(), EncodeError> {
    if dtype == DCTypeEnum::TBlob32 {
        dg.add_string32(bytes)?;
    } else {
        dg.add_string16(bytes)?;
    }
    Ok(())
}

fn unpack_sized(dtype: DCTypeEnum, dgi: &mut DatagramIterator) -> Result<Vec<u8>, DecodeError> {
    Ok(if dtype == DCTypeEnum::TBlob32 {
        dgi.get_string32()?
    } else {
        dgi.get_string16()?
    })
}

/// `uint32uint8array`'s element codec: the original's `struct.pack('<IB', *value)`
/// hack, wrapping a `(u32, u8)` pair per element.
fn pack_legacy_element(dtype: DCTypeEnum, value: &DCValue, divisor: i64, dg: &mut Datagram) -> Result<(), EncodeError> {
    if dtype == DCTypeEnum::TUInt32Uint8Array {
        let pair = value.as_array()?;
        let a = pair.first().ok_or(EncodeError::WrongArity { expected: 2, got: 0 })?.as_i64()? as u32;
        let b = pair.get(1).ok_or(EncodeError::WrongArity { expected: 2, got: 1 })?.as_i64()? as u8;
        dg.add_u32(a)?;
        dg.add_u8(b)?;
        return Ok(());
    }

    // Other Xarray tags pack as their underlying scalar (e.g. `int8array`
    // packs each element as a plain `int8`).
    let scalar_dtype = DCTypeEnum::from_keyword(dtype.to_string().trim_end_matches("array")).unwrap_or(dtype);
    pack_scalar(scalar_dtype, value, divisor, dg)
}

fn unpack_legacy_element(dtype: DCTypeEnum, dgi: &mut DatagramIterator) -> Result<DCValue, DecodeError> {
    if dtype == DCTypeEnum::TUInt32Uint8Array {
        let a = dgi.read_u32()?;
        let b = dgi.read_u8()?;
        return Ok(DCValue::Array(vec![DCValue::UInt(a as u64), DCValue::UInt(b as u64)]));
    }

    let scalar_dtype = DCTypeEnum::from_keyword(dtype.to_string().trim_end_matches("array")).unwrap_or(dtype);
    unpack_scalar(scalar_dtype, dgi)
}

/// Int/Float/Char/Sized(string,blob,blob32) scalar parameter.
#[derive(Debug, Clone)]
pub struct SimpleParameter {
    pub dtype: DCTypeEnum,
    pub int_ranges: Vec<IRange>,
    pub float_ranges: Vec<FRange>,
    pub modulus: Option<f64>,
    pub divisor: i64,
    pub identifier: String,
    pub default: Option<DCValue>,
    pub fixed_byte_size: Option<usize>,
}

impl SimpleParameter {
    pub fn new(dtype: DCTypeEnum) -> Self {
        let fixed_byte_size = Self::compute_fixed_byte_size(dtype, &[], &[]);
        Self {
            dtype,
            int_ranges: Vec::new(),
            float_ranges: Vec::new(),
            modulus: None,
            divisor: 1,
            identifier: String::new(),
            default: None,
            fixed_byte_size,
        }
    }

    fn compute_fixed_byte_size(dtype: DCTypeEnum, int_ranges: &[IRange], float_ranges: &[FRange]) -> Option<usize> {
        if let Some(size) = dtype.fixed_byte_size() {
            return Some(size);
        }
        if int_ranges.len() == 1 && int_ranges[0].is_single_point() {
            return Some(int_ranges[0].min as usize);
        }
        if float_ranges.len() == 1 && float_ranges[0].is_single_point() {
            return Some(float_ranges[0].min as usize);
        }
        None
    }

    pub fn recompute_fixed_byte_size(&mut self) {
        self.fixed_byte_size = Self::compute_fixed_byte_size(self.dtype, &self.int_ranges, &self.float_ranges);
    }

    pub fn pack_value(&self, value: &DCValue, dg: &mut Datagram) -> Result<(), EncodeError> {
        if self.dtype.is_sized() {
            let bytes = value.as_bytes()?;
            if bytes.len() > u32::MAX as usize {
                return Err(EncodeError::Overflow(crate::error::OverflowError::LengthPrefixOverflow(bytes.len())));
            }
            return pack_sized(self.dtype, bytes, dg);
        }
        pack_scalar(self.dtype, value, self.divisor, dg)
    }

    pub fn unpack_value(&self, dgi: &mut DatagramIterator) -> Result<DCValue, DecodeError> {
        if self.dtype.is_sized() {
            return Ok(DCValue::Bytes(unpack_sized(self.dtype, dgi)?));
        }
        unpack_scalar(self.dtype, dgi)
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator) -> Result<Vec<u8>, DecodeError> {
        if let Some(size) = self.fixed_byte_size {
            return Ok(dgi.read_data(size)?);
        }
        // Variable-length sized type: length prefix plus payload, copied raw.
        let width = if self.dtype == DCTypeEnum::TBlob32 { 4 } else { 2 };
        let prefix = dgi.read_data(width)?;
        let len = if width == 4 {
            u32::from_le_bytes(prefix.clone().try_into().unwrap()) as usize
        } else {
            u16::from_le_bytes(prefix.clone().try_into().unwrap()) as usize
        };
        let payload = dgi.read_data(len)?;
        Ok([prefix, payload].concat())
    }

    /// Uses floor(x·divisor) for integer-typed ranges, floor(x·divisor + 0.5)
    /// (nearest) for float-typed ranges, per SPEC_FULL.md §4.5.
    pub fn generate_hash(&self, hash_gen: &mut HashGenerator) {
        hash_gen.add_int(self.dtype as i32);
        hash_gen.add_int(self.divisor as i32);

        if let Some(modulus) = self.modulus {
            hash_gen.add_int((self.divisor as f64 * modulus).floor() as i32);
        }

        if !self.int_ranges.is_empty() {
            hash_gen.add_int(self.int_ranges.len() as i32);
            for r in &self.int_ranges {
                hash_gen.add_int((r.min * self.divisor) as i32);
                hash_gen.add_int((r.max * self.divisor) as i32);
            }
        } else if !self.float_ranges.is_empty() {
            hash_gen.add_int(self.float_ranges.len() as i32);
            for r in &self.float_ranges {
                hash_gen.add_int((r.min * self.divisor as f64 + 0.5).floor() as i32);
                hash_gen.add_int((r.max * self.divisor as f64 + 0.5).floor() as i32);
            }
        }
    }
}

/// The element kind packed by one leaf of an [`ArrayParameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayElementKind {
    Primitive(DCTypeEnum),
    Sized(DCTypeEnum),
    Legacy(DCTypeEnum),
    /// Index into `DCFile.classes`.
    Struct(usize),
}

/// A (possibly multi-dimensional) array parameter. `arange` lists
/// dimensions outermost-first; an empty `arange` means one implicit
/// variable-length dimension (the case for a legacy array dtype with no
/// explicit `[n]` clause in the DC source). `int_ranges`/`float_ranges`/
/// `modulus`/`divisor` are the element type's own value constraints
/// (e.g. the `(0-100)`/`/10` of `int32(0-100)/10 foo[5]`), carried
/// separately from `arange`'s per-dimension length constraints.
#[derive(Debug, Clone)]
pub struct ArrayParameter {
    pub element: ArrayElementKind,
    pub identifier: String,
    pub default: Option<DCValue>,
    pub arange: Vec<Vec<IRange>>,
    pub int_ranges: Vec<IRange>,
    pub float_ranges: Vec<FRange>,
    pub modulus: Option<f64>,
    pub divisor: i64,
    /// Per-dimension fixed element count, `None` if that dimension (or
    /// the element itself) is variable-length. Only ever non-empty when
    /// the element has a fixed byte size.
    pub fixed_array_size: Option<Vec<Option<i64>>>,
    pub element_fixed_byte_size: Option<usize>,
}

impl ArrayParameter {
    pub fn new(element: ArrayElementKind, arange: Vec<Vec<IRange>>) -> Self {
        Self::with_element_constraints(element, arange, Vec::new(), Vec::new(), None, 1)
    }

    pub fn with_element_constraints(
        element: ArrayElementKind,
        arange: Vec<Vec<IRange>>,
        int_ranges: Vec<IRange>,
        float_ranges: Vec<FRange>,
        modulus: Option<f64>,
        divisor: i64,
    ) -> Self {
        let element_fixed_byte_size = match element {
            ArrayElementKind::Primitive(t) => t.fixed_byte_size(),
            ArrayElementKind::Sized(_) => None,
            ArrayElementKind::Legacy(t) => t.legacy_element_byte_size(),
            ArrayElementKind::Struct(_) => None,
        };

        let fixed_array_size = if element_fixed_byte_size.is_some() && !arange.is_empty() {
            Some(
                arange
                    .iter()
                    .map(|dim| {
                        if dim.len() == 1 && dim[0].is_single_point() {
                            Some(dim[0].min)
                        } else {
                            None
                        }
                    })
                    .collect(),
            )
        } else {
            None
        };

        Self {
            element,
            identifier: String::new(),
            default: None,
            arange,
            int_ranges,
            float_ranges,
            modulus,
            divisor,
            fixed_array_size,
            element_fixed_byte_size,
        }
    }

    /// Reconstructs the element's own `SimpleParameter` view — the same
    /// scalar this array's `divisor`/ranges/modulus were parsed against —
    /// for hashing and for the scalar pack/unpack path.
    fn element_as_simple(&self, t: DCTypeEnum) -> SimpleParameter {
        let mut simple = SimpleParameter::new(t);
        simple.int_ranges = self.int_ranges.clone();
        simple.float_ranges = self.float_ranges.clone();
        simple.modulus = self.modulus;
        simple.divisor = self.divisor;
        simple.recompute_fixed_byte_size();
        simple
    }

    fn dimension_count(&self) -> usize {
        self.arange.len().max(1)
    }

    fn length_prefix_width(&self) -> usize {
        if matches!(self.element, ArrayElementKind::Sized(DCTypeEnum::TBlob32)) {
            4
        } else {
            2
        }
    }

    fn dimension_is_fixed(&self, dim: usize) -> bool {
        matches!(&self.fixed_array_size, Some(sizes) if sizes.get(dim).copied().flatten().is_some())
    }

    fn total_fixed_byte_size(&self) -> Option<usize> {
        let sizes = self.fixed_array_size.as_ref()?;
        let mut total = self.element_fixed_byte_size?;
        for size in sizes {
            total *= (*size)? as usize;
        }
        Some(total)
    }

    pub fn pack_value(&self, value: &DCValue, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        let top = value.as_array()?;
        self.pack_dimension(top, self.dimension_count() - 1, dg, dcfile)
    }

    fn pack_dimension(&self, items: &[DCValue], dim: usize, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        let fixed = self.dimension_is_fixed(dim);
        let header_pos = if fixed {
            None
        } else {
            Some(dg.add_buffer(self.length_prefix_width() as u16)?)
        };
        let payload_start = dg.tell();

        if dim > 0 {
            for item in items {
                self.pack_dimension(item.as_array()?, dim - 1, dg, dcfile)?;
            }
        } else {
            for item in items {
                self.pack_element(item, dg, dcfile)?;
            }
        }

        if let Some(pos) = header_pos {
            let data_size = dg.tell() - payload_start;
            if self.length_prefix_width() == 4 {
                dg.set_at(pos as usize, &(data_size as u32).to_le_bytes());
            } else {
                dg.set_at(pos as usize, &(data_size as u16).to_le_bytes());
            }
        }
        Ok(())
    }

    fn pack_element(&self, item: &DCValue, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        match self.element {
            ArrayElementKind::Primitive(t) => pack_scalar(t, item, self.divisor, dg),
            ArrayElementKind::Sized(t) => pack_sized(t, item.as_bytes()?, dg),
            ArrayElementKind::Legacy(t) => pack_legacy_element(t, item, self.divisor, dg),
            ArrayElementKind::Struct(idx) => {
                let dclass = dcfile.class(idx).ok_or(EncodeError::MissingArgument(self.identifier.clone()))?;
                dclass.pack_values(item.as_struct()?, dg, dcfile)
            }
        }
    }

    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        let (elements, _) = self.unpack_dimension(dgi, self.dimension_count() - 1, dcfile)?;
        Ok(DCValue::Array(elements))
    }

    fn unpack_dimension(
        &self,
        dgi: &mut DatagramIterator,
        dim: usize,
        dcfile: &DCFile,
    ) -> Result<(Vec<DCValue>, usize), DecodeError> {
        let mut elements = Vec::new();

        let (mut remaining, total_consumed, fixed) = if self.dimension_is_fixed(dim) {
            let count = self.fixed_array_size.as_ref().unwrap()[dim].unwrap() as usize;
            let byte_size = count * self.element_fixed_byte_size.unwrap_or(0);
            (byte_size, byte_size, true)
        } else {
            let width = self.length_prefix_width();
            let length = if width == 4 { dgi.read_u32()? as usize } else { dgi.read_u16()? as usize };
            if length == 0 {
                return Ok((elements, 0));
            }
            (length, length + width, false)
        };

        if dim > 0 {
            while remaining > 0 {
                let (sub, consumed) = self.unpack_dimension(dgi, dim - 1, dcfile)?;
                elements.push(DCValue::Array(sub));
                remaining = remaining.saturating_sub(consumed);
            }
        } else {
            while remaining > 0 {
                let before = dgi.tell();
                let element = self.unpack_element(dgi, dcfile)?;
                let consumed = dgi.tell() - before;
                remaining = remaining.saturating_sub(consumed);
                elements.push(element);
            }
        }
        let _ = fixed;
        Ok((elements, total_consumed))
    }

    fn unpack_element(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        match self.element {
            ArrayElementKind::Primitive(t) => unpack_scalar(t, dgi),
            ArrayElementKind::Sized(t) => Ok(DCValue::Bytes(unpack_sized(t, dgi)?)),
            ArrayElementKind::Legacy(t) => unpack_legacy_element(t, dgi),
            ArrayElementKind::Struct(idx) => {
                let dclass = dcfile.class(idx).ok_or(DecodeError::UnexpectedEof)?;
                Ok(DCValue::Struct(dclass.unpack_value(dgi, dcfile)?))
            }
        }
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator) -> Result<Vec<u8>, DecodeError> {
        let dim = self.dimension_count() - 1;
        if self.dimension_is_fixed(dim) {
            let count = self.fixed_array_size.as_ref().unwrap()[dim].unwrap() as usize;
            return Ok(dgi.read_data(count * self.element_fixed_byte_size.unwrap_or(0))?);
        }

        let width = self.length_prefix_width();
        let prefix = dgi.read_data(width)?;
        let len = if width == 4 {
            u32::from_le_bytes(prefix.clone().try_into().unwrap()) as usize
        } else {
            u16::from_le_bytes(prefix.clone().try_into().unwrap()) as usize
        };
        let payload = dgi.read_data(len)?;
        Ok([prefix, payload].concat())
    }

    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        match self.element {
            ArrayElementKind::Primitive(t) | ArrayElementKind::Legacy(t) | ArrayElementKind::Sized(t) => {
                self.element_as_simple(t).generate_hash(hash_gen);
            }
            ArrayElementKind::Struct(idx) => {
                if let Some(dclass) = dcfile.class(idx) {
                    dclass.generate_hash(hash_gen, dcfile);
                }
            }
        }

        for dimension in self.arange.iter().rev() {
            if !dimension.is_empty() {
                hash_gen.add_int(dimension.len() as i32);
                for r in dimension {
                    hash_gen.add_int(r.min as i32);
                    hash_gen.add_int(r.max as i32);
                }
            }
        }
    }
}

/// A nested struct or dclass value, referenced by index into the owning
/// [`DCFile`]'s class arena.
#[derive(Debug, Clone)]
pub struct StructParameter {
    pub dclass_index: usize,
    pub identifier: String,
    pub default: Option<DCValue>,
}

impl StructParameter {
    pub fn pack_value(&self, value: &DCValue, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        let dclass = dcfile
            .class(self.dclass_index)
            .ok_or_else(|| EncodeError::MissingArgument(self.identifier.clone()))?;
        dclass.pack_values(value.as_struct()?, dg, dcfile)
    }

    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        let dclass = dcfile.class(self.dclass_index).ok_or(DecodeError::UnexpectedEof)?;
        Ok(DCValue::Struct(dclass.unpack_value(dgi, dcfile)?))
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<u8>, DecodeError> {
        let dclass = dcfile.class(self.dclass_index).ok_or(DecodeError::UnexpectedEof)?;
        dclass.unpack_bytes(dgi, dcfile)
    }

    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        if let Some(dclass) = dcfile.class(self.dclass_index) {
            dclass.generate_hash(hash_gen, dcfile);
        }
    }
}

/// One `case N: ... break;` (or `default: ...`) arm of a switch. Parsed
/// fall-through (a case with no `break`) has already had the default
/// case's parameters appended by parse time, so `parameters` here is
/// always the case's complete packing list.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub value: DCValue,
    pub parameters: Vec<Parameter>,
    pub breaked: bool,
}

/// A tagged union: a discriminant parameter followed by the parameter
/// list of whichever case matches the discriminant's value.
#[derive(Debug, Clone)]
pub struct SwitchParameter {
    pub identifier: String,
    pub discriminant: Box<Parameter>,
    pub cases: Vec<SwitchCase>,
    pub default_case: Option<Vec<Parameter>>,
}

impl SwitchParameter {
    pub fn pack_value(&self, value: &DCValue, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        let items = value.as_switch()?;
        let (switched, rest) = items.split_first().ok_or(EncodeError::WrongArity { expected: 1, got: 0 })?;

        self.discriminant.pack_value(switched, dg, dcfile)?;

        let params = self
            .cases
            .iter()
            .find(|c| &c.value == switched)
            .map(|c| &c.parameters)
            .or(self.default_case.as_ref())
            .ok_or(EncodeError::UnmatchedSwitchDiscriminant)?;

        for (item, parameter) in rest.iter().zip(params.iter()) {
            parameter.pack_value(item, dg, dcfile)?;
        }
        Ok(())
    }

    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        let switched = self.discriminant.unpack_value(dgi, dcfile)?;

        let params = self
            .cases
            .iter()
            .find(|c| c.value == switched)
            .map(|c| &c.parameters)
            .or(self.default_case.as_ref())
            .ok_or(DecodeError::UnexpectedEof)?;

        let mut out = vec![switched];
        for parameter in params {
            out.push(parameter.unpack_value(dgi, dcfile)?);
        }
        Ok(DCValue::Switch(out))
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<u8>, DecodeError> {
        let start = dgi.tell();
        let switched = self.discriminant.unpack_value(dgi, dcfile)?;
        let end = dgi.tell();
        // re-read the discriminant's raw bytes via a fresh iterator window
        let mut peek = dgi.clone();
        peek.seek(start);
        let discriminant_bytes = peek.read_data(end - start)?;

        let params = self
            .cases
            .iter()
            .find(|c| c.value == switched)
            .map(|c| &c.parameters)
            .or(self.default_case.as_ref())
            .ok_or(DecodeError::UnexpectedEof)?;

        let mut rest_bytes = Vec::new();
        for parameter in params {
            rest_bytes.extend(parameter.unpack_bytes(dgi, dcfile)?);
        }
        Ok([discriminant_bytes, rest_bytes].concat())
    }

    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        hash_gen.add_string(&self.identifier);
        self.discriminant.generate_hash(hash_gen, dcfile);

        hash_gen.add_int(self.cases.len() as i32);
        for case in &self.cases {
            let mut buf = Datagram::new();
            let _ = self.discriminant.pack_value(&case.value, &mut buf, dcfile);
            hash_gen.add_bytes(&buf.get_data());

            hash_gen.add_int(case.parameters.len() as i32 + 1);
            self.discriminant.generate_hash(hash_gen, dcfile);
            for parameter in &case.parameters {
                parameter.generate_hash(hash_gen, dcfile);
            }
        }

        if let Some(default_case) = &self.default_case {
            hash_gen.add_int(default_case.len() as i32 + 1);
            self.discriminant.generate_hash(hash_gen, dcfile);
            for parameter in default_case {
                parameter.generate_hash(hash_gen, dcfile);
            }
        }
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dcfile::DCFile;

    #[test]
    fn uint32_round_trips() {
        let dcfile = DCFile::new();
        let p = Parameter::Primitive(SimpleParameter::new(DCTypeEnum::TUInt32));
        let mut dg = Datagram::new();
        p.pack_value(&DCValue::UInt(2828), &mut dg, &dcfile).unwrap();
        assert_eq!(dg.get_data(), vec![0x0C, 0x0B, 0x00, 0x00]);

        let mut dgi = dg.iterator();
        assert_eq!(p.unpack_value(&mut dgi, &dcfile).unwrap(), DCValue::UInt(2828));
    }

    #[test]
    fn sized_string_round_trips() {
        let dcfile = DCFile::new();
        let p = Parameter::Primitive(SimpleParameter::new(DCTypeEnum::TString));
        let mut dg = Datagram::new();
        p.pack_value(&"hello".into(), &mut dg, &dcfile).unwrap();
        assert_eq!(dg.get_data(), vec![0x05, 0x00, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn legacy_uint32uint8array_packs_as_documented() {
        let dcfile = DCFile::new();
        let param = ArrayParameter::new(ArrayElementKind::Legacy(DCTypeEnum::TUInt32Uint8Array), Vec::new());
        let p = Parameter::Array(param);

        let value = DCValue::Array(vec![
            DCValue::Array(vec![DCValue::Int(1), DCValue::Int(2)]),
            DCValue::Array(vec![DCValue::Int(3), DCValue::Int(4)]),
            DCValue::Array(vec![DCValue::Int(5), DCValue::Int(6)]),
        ]);

        let mut dg = Datagram::new();
        p.pack_value(&value, &mut dg, &dcfile).unwrap();

        let expected: Vec<u8> = vec![
            0x0F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x03, 0x00, 0x00, 0x00, 0x04, 0x05, 0x00, 0x00, 0x00, 0x06,
        ];
        assert_eq!(dg.get_data(), expected);
    }

    #[test]
    fn array_element_divisor_applies_to_each_packed_element() {
        let dcfile = DCFile::new();
        let param = ArrayParameter::with_element_constraints(
            ArrayElementKind::Primitive(DCTypeEnum::TInt32),
            vec![vec![IRange::point(2)]],
            Vec::new(),
            Vec::new(),
            None,
            10,
        );
        let p = Parameter::Array(param);

        let mut dg = Datagram::new();
        p.pack_value(
            &DCValue::Array(vec![DCValue::Float(1.5), DCValue::Float(-2.0)]),
            &mut dg,
            &dcfile,
        )
        .unwrap();

        // 1.5 * 10 = 15, -2.0 * 10 = -20, each as a fixed int32.
        assert_eq!(
            dg.get_data(),
            vec![0x0F, 0x00, 0x00, 0x00, 0xEC, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn array_element_constraints_change_the_schema_hash() {
        let dcfile = DCFile::new();
        let plain = ArrayParameter::new(ArrayElementKind::Primitive(DCTypeEnum::TInt32), vec![vec![IRange::point(5)]]);
        let divided = ArrayParameter::with_element_constraints(
            ArrayElementKind::Primitive(DCTypeEnum::TInt32),
            vec![vec![IRange::point(5)]],
            Vec::new(),
            Vec::new(),
            None,
            10,
        );

        let mut plain_hash = HashGenerator::new();
        plain.generate_hash(&mut plain_hash, &dcfile);

        let mut divided_hash = HashGenerator::new();
        divided.generate_hash(&mut divided_hash, &dcfile);

        assert_ne!(plain_hash.get_hash(), divided_hash.get_hash());
    }
}
