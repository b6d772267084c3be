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

//! [`Field`]: a named member of a [`crate::dclass::DClass`] — a single
//! parameter, a named method ("atomic field") with its own parameter
//! tuple, or a molecular field composed from already-declared siblings.

use crate::dcfile::DCFile;
use crate::dckeyword::calc_flags;
use crate::dcparameter::{Parameter, FLAGS_UNSET};
use crate::datagram::{Datagram, DatagramIterator};
use crate::error::{DecodeError, EncodeError};
use crate::hashgen::HashGenerator;
use crate::value::DCValue;

/// The three field shapes a [`crate::dclass::DClass`] can declare, per
/// SPEC_FULL.md §3.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Parameter { parameter: Parameter, is_struct_field: bool },
    Atomic { parameters: Vec<Parameter> },
    /// Indices into [`DCFile`]'s global field arena, resolved at
    /// `DClass::add_field` time from the parser's textual subfield names.
    Molecular { subfields: Vec<usize> },
}

/// A single DC field: a parameter member, an atomic (method-shaped)
/// field, or a molecular composite. Carries the DCFile-global field
/// number assigned on insertion and the historic-keyword flag word.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub number: u16,
    pub keywords: Vec<String>,
    pub flags: u32,
    pub kind: FieldKind,
}

impl Field {
    pub fn new_parameter(parameter: Parameter, is_struct_field: bool, keywords: Vec<String>) -> Self {
        let name = parameter.identifier().to_string();
        let flags = calc_flags(&keywords);
        Self {
            name,
            number: 0,
            keywords,
            flags,
            kind: FieldKind::Parameter { parameter, is_struct_field },
        }
    }

    pub fn new_atomic(name: impl Into<String>, parameters: Vec<Parameter>, keywords: Vec<String>) -> Self {
        let flags = calc_flags(&keywords);
        Self {
            name: name.into(),
            number: 0,
            keywords,
            flags,
            kind: FieldKind::Atomic { parameters },
        }
    }

    pub fn new_molecular(name: impl Into<String>, subfields: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            number: 0,
            keywords: Vec::new(),
            flags: 0,
            kind: FieldKind::Molecular { subfields },
        }
    }

    pub fn is_molecular(&self) -> bool {
        matches!(self.kind, FieldKind::Molecular { .. })
    }

    pub fn is_struct_field(&self) -> bool {
        matches!(self.kind, FieldKind::Parameter { is_struct_field: true, .. })
    }

    fn has_keyword_bit(&self, bit: u32) -> bool {
        self.flags & bit != 0
    }

    pub fn is_required(&self) -> bool {
        self.has_keyword_bit(0x0001)
    }
    pub fn is_broadcast(&self) -> bool {
        self.has_keyword_bit(0x0002)
    }
    pub fn is_ownrecv(&self) -> bool {
        self.has_keyword_bit(0x0004)
    }
    pub fn is_ram(&self) -> bool {
        self.has_keyword_bit(0x0008)
    }
    pub fn is_db(&self) -> bool {
        self.has_keyword_bit(0x0010)
    }
    pub fn is_clsend(&self) -> bool {
        self.has_keyword_bit(0x0020)
    }
    pub fn is_clrecv(&self) -> bool {
        self.has_keyword_bit(0x0040)
    }
    pub fn is_ownsend(&self) -> bool {
        self.has_keyword_bit(0x0080)
    }
    pub fn is_airecv(&self) -> bool {
        self.has_keyword_bit(0x0100)
    }

    /// Number of positional arguments this field's `pack_value`/
    /// `unpack_value` exchange as a tuple (1 for a parameter field, the
    /// parameter count for an atomic field, the sum of the subfields'
    /// counts for a molecular field).
    pub fn num_args(&self, dcfile: &DCFile) -> usize {
        match &self.kind {
            FieldKind::Parameter { .. } => 1,
            FieldKind::Atomic { parameters } => parameters.len(),
            FieldKind::Molecular { subfields } => subfields
                .iter()
                .filter_map(|&idx| dcfile.field(idx))
                .map(|f| f.num_args(dcfile))
                .sum(),
        }
    }

    /// Packs `args` (one `DCValue` per parameter, in declared order)
    /// against this field. Molecular fields cannot be packed directly —
    /// they are always the concatenation of their siblings' own packs.
    pub fn pack_args(&self, args: &[DCValue], dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        match &self.kind {
            FieldKind::Parameter { parameter, .. } => {
                let value = args
                    .first()
                    .or(parameter.default())
                    .ok_or_else(|| EncodeError::MissingArgument(self.name.clone()))?;
                parameter.pack_value(value, dg, dcfile)
            }
            FieldKind::Atomic { parameters } => {
                if args.len() != parameters.len() {
                    return Err(EncodeError::WrongArity {
                        expected: parameters.len(),
                        got: args.len(),
                    });
                }
                for (parameter, arg) in parameters.iter().zip(args.iter()) {
                    parameter.pack_value(arg, dg, dcfile)?;
                }
                Ok(())
            }
            FieldKind::Molecular { .. } => Err(EncodeError::MolecularFieldPackedDirectly),
        }
    }

    /// Packs this field's declared default (an atomic field with no
    /// default packs nothing, matching the original's `pack_default`).
    pub fn pack_default(&self, dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        match &self.kind {
            FieldKind::Parameter { parameter, .. } => parameter.pack_default(dg, dcfile),
            FieldKind::Atomic { .. } | FieldKind::Molecular { .. } => Ok(()),
        }
    }

    /// Unpacks this field's full argument tuple. Molecular fields
    /// concatenate each subfield's own unpacked argument list, in order.
    pub fn unpack_args(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<DCValue>, DecodeError> {
        match &self.kind {
            FieldKind::Parameter { parameter, .. } => Ok(vec![parameter.unpack_value(dgi, dcfile)?]),
            FieldKind::Atomic { parameters } => {
                parameters.iter().map(|p| p.unpack_value(dgi, dcfile)).collect()
            }
            FieldKind::Molecular { subfields } => {
                let mut out = Vec::new();
                for &idx in subfields {
                    let field = dcfile.field(idx).ok_or(DecodeError::UnexpectedEof)?;
                    out.extend(field.unpack_args(dgi, dcfile)?);
                }
                Ok(out)
            }
        }
    }

    /// Unpacks this field's argument tuple, wrapped as a single value —
    /// a bare value for a one-parameter field, an array of values
    /// otherwise.
    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<DCValue, DecodeError> {
        let mut args = self.unpack_args(dgi, dcfile)?;
        if args.len() == 1 {
            Ok(args.remove(0))
        } else {
            Ok(DCValue::Array(args))
        }
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<u8>, DecodeError> {
        match &self.kind {
            FieldKind::Parameter { parameter, .. } => parameter.unpack_bytes(dgi, dcfile),
            FieldKind::Atomic { parameters } => {
                let mut out = Vec::new();
                for parameter in parameters {
                    out.extend(parameter.unpack_bytes(dgi, dcfile)?);
                }
                Ok(out)
            }
            FieldKind::Molecular { subfields } => {
                let mut out = Vec::new();
                for &idx in subfields {
                    let field = dcfile.field(idx).ok_or(DecodeError::UnexpectedEof)?;
                    out.extend(field.unpack_bytes(dgi, dcfile)?);
                }
                Ok(out)
            }
        }
    }

    /// Per SPEC_FULL.md §4.5. A parameter field hashes only its (optional)
    /// flags and its parameter — name/number are folded in for atomic and
    /// molecular fields only, matching the reference hash exactly.
    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        match &self.kind {
            FieldKind::Parameter {
                parameter,
                is_struct_field,
            } => {
                if !is_struct_field && !self.keywords.is_empty() && self.flags != FLAGS_UNSET {
                    hash_gen.add_int(self.flags as i32);
                }
                parameter.generate_hash(hash_gen, dcfile);
            }
            FieldKind::Atomic { parameters } => {
                hash_gen.add_string(&self.name);
                hash_gen.add_int(self.number as i32);
                hash_gen.add_int(parameters.len() as i32);
                for parameter in parameters {
                    parameter.generate_hash(hash_gen, dcfile);
                }
                if self.flags != FLAGS_UNSET {
                    hash_gen.add_int(self.flags as i32);
                }
            }
            FieldKind::Molecular { subfields } => {
                hash_gen.add_string(&self.name);
                hash_gen.add_int(self.number as i32);
                hash_gen.add_int(subfields.len() as i32);
                for &idx in subfields {
                    if let Some(field) = dcfile.field(idx) {
                        field.generate_hash(hash_gen, dcfile);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dcfile::DCFile;
    use crate::dctype::DCTypeEnum;
    use crate::dcparameter::SimpleParameter;

    #[test]
    fn parameter_field_round_trips_single_value() {
        let dcfile = DCFile::new();
        let mut param = SimpleParameter::new(DCTypeEnum::TUInt16);
        param.identifier = "health".to_string();
        let field = Field::new_parameter(Parameter::Primitive(param), false, vec!["required".to_string()]);

        assert!(field.is_required());
        assert_eq!(field.num_args(&dcfile), 1);

        let mut dg = Datagram::new();
        field.pack_args(&[DCValue::UInt(42)], &mut dg, &dcfile).unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(field.unpack_value(&mut dgi, &dcfile).unwrap(), DCValue::UInt(42));
    }

    #[test]
    fn atomic_field_packs_parameter_tuple() {
        let dcfile = DCFile::new();
        let field = Field::new_atomic(
            "setXY",
            vec![
                Parameter::Primitive(SimpleParameter::new(DCTypeEnum::TInt16)),
                Parameter::Primitive(SimpleParameter::new(DCTypeEnum::TInt16)),
            ],
            vec![],
        );

        let mut dg = Datagram::new();
        field
            .pack_args(&[DCValue::Int(10), DCValue::Int(-5)], &mut dg, &dcfile)
            .unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(
            field.unpack_value(&mut dgi, &dcfile).unwrap(),
            DCValue::Array(vec![DCValue::Int(10), DCValue::Int(-5)])
        );
    }

    #[test]
    fn molecular_field_cannot_be_packed_directly() {
        let dcfile = DCFile::new();
        let field = Field::new_molecular("setXY", vec![]);
        let mut dg = Datagram::new();
        assert_eq!(
            field.pack_args(&[], &mut dg, &dcfile),
            Err(EncodeError::MolecularFieldPackedDirectly)
        );
    }
}
