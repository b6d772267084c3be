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

//! Data model for `dclass`/`struct` definitions in the DC file. Stores
//! DC fields and tracks class hierarchy.

use std::collections::{HashMap, HashSet};

use crate::dcfield::{Field, FieldKind};
use crate::dcfile::DCFile;
use crate::datagram::{Datagram, DatagramIterator};
use crate::error::{DecodeError, EncodeError};
use crate::hashgen::HashGenerator;
use crate::value::DCValue;

/// A DCFile-global field index paired with its unpacked value, returned
/// by the `receive_update*` family in place of the original's reflective
/// `setattr`/method-call dispatch onto an arbitrary host object.
pub type FieldUpdate = (usize, DCValue);

/// Represents a Distributed Class (or `struct`) defined in the DC file.
/// Holds indices into the owning [`DCFile`]'s field arena rather than
/// owning its fields directly, and indices into `DCFile.classes` for its
/// parents, so that `DClass`/`Field` cross-references never need
/// `Rc<RefCell<_>>`.
#[derive(Debug, Clone)]
pub struct DClass {
    pub name: String,
    pub is_struct: bool,
    /// `None` for a struct (structs never receive a wire-visible class
    /// number) or before this class has been registered with a DCFile.
    pub number: Option<u16>,
    pub parents: Vec<usize>,
    /// The one field whose name equals the struct's own name, if any.
    /// Never placed in the global field arena, matching the original.
    pub constructor: Option<Field>,
    /// This class's own declared fields (declaration order), as global
    /// indices into `DCFile.fields`.
    pub fields: Vec<usize>,
    /// The flattened field list produced by `build_inherited_fields`:
    /// parents' surviving fields followed by this class's own, with
    /// same-named parent fields shadowed out.
    pub inherited_fields: Vec<usize>,
    pub fields_by_name: HashMap<String, usize>,
}

impl DClass {
    pub fn new(name: impl Into<String>, is_struct: bool, parents: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            is_struct,
            number: None,
            parents,
            constructor: None,
            fields: Vec::new(),
            inherited_fields: Vec::new(),
            fields_by_name: HashMap::new(),
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn field_index_by_name(&self, name: &str) -> Option<usize> {
        self.fields_by_name.get(name).copied()
    }

    /// Flattens this class's visible field list from its parents'
    /// already-flattened lists plus this class's own fields, in the
    /// order the original's `build_inherited_fields` produces: parent
    /// fields first (skipping a name already claimed by an earlier
    /// parent), then this class's own fields, each of which shadows
    /// (removes) any inherited field sharing its name.
    ///
    /// Must be called in declaration order, after each parent's own
    /// `build_inherited_fields` has already run.
    pub fn build_inherited_fields(&mut self, dcfile: &DCFile) {
        let mut namespace: HashSet<String> = HashSet::new();
        let mut inherited = Vec::new();

        let parents = self.parents.clone();
        for parent_idx in parents {
            let Some(parent) = dcfile.class(parent_idx) else { continue };
            for &field_idx in &parent.inherited_fields {
                let name = dcfile.field(field_idx).map(|f| f.name.clone()).unwrap_or_default();
                if name.is_empty() {
                    inherited.push(field_idx);
                } else if !namespace.contains(&name) {
                    inherited.push(field_idx);
                    namespace.insert(name.clone());
                    self.fields_by_name.insert(name, field_idx);
                }
            }
        }

        let own_fields = self.fields.clone();
        for field_idx in own_fields {
            let name = dcfile.field(field_idx).map(|f| f.name.clone()).unwrap_or_default();
            if name.is_empty() {
                inherited.push(field_idx);
                continue;
            }
            if namespace.contains(&name) {
                self.shadow_inherited_field(&mut inherited, dcfile, &name);
            }
            self.fields_by_name.insert(name.clone(), field_idx);
            inherited.push(field_idx);
            namespace.insert(name);
        }

        self.inherited_fields = inherited;
    }

    fn shadow_inherited_field(&self, inherited: &mut Vec<usize>, dcfile: &DCFile, name: &str) {
        if let Some(pos) = inherited
            .iter()
            .position(|&idx| dcfile.field(idx).map(|f| f.name == name).unwrap_or(false))
        {
            inherited.remove(pos);
        }
    }

    /// Packs this class's own declared fields (not inherited ones) from
    /// `values`, one `DCValue` per field in declaration order — the
    /// positional substitute for the original's `pack_value(obj)`, which
    /// reflected `getattr(obj, field.name)` per field.
    pub fn pack_values(&self, values: &[DCValue], dg: &mut Datagram, dcfile: &DCFile) -> Result<(), EncodeError> {
        if values.len() != self.fields.len() {
            return Err(EncodeError::WrongArity {
                expected: self.fields.len(),
                got: values.len(),
            });
        }

        for (&field_idx, value) in self.fields.iter().zip(values.iter()) {
            let field = dcfile
                .field(field_idx)
                .ok_or_else(|| EncodeError::MissingArgument(self.name.clone()))?;

            match (value, &field.kind) {
                (DCValue::Array(inner), FieldKind::Atomic { .. } | FieldKind::Molecular { .. }) => {
                    field.pack_args(inner, dg, dcfile)?
                }
                (single, _) => field.pack_args(std::slice::from_ref(single), dg, dcfile)?,
            }
        }
        Ok(())
    }

    /// Unpacks this class's own declared fields, one `DCValue` per field,
    /// in declaration order — the positional substitute for the
    /// original's `unpack_value`.
    pub fn unpack_value(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<DCValue>, DecodeError> {
        self.fields
            .iter()
            .map(|&idx| {
                let field = dcfile.field(idx).ok_or(DecodeError::UnexpectedEof)?;
                field.unpack_value(dgi, dcfile)
            })
            .collect()
    }

    pub fn unpack_bytes(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        for &idx in &self.fields {
            let field = dcfile.field(idx).ok_or(DecodeError::UnexpectedEof)?;
            out.extend(field.unpack_bytes(dgi, dcfile)?);
        }
        Ok(out)
    }

    /// Reads one (field index, value) update off the wire — the field
    /// index chooses which of `DCFile.fields` to decode with.
    pub fn receive_update(&self, dgi: &mut DatagramIterator, dcfile: &DCFile) -> Result<FieldUpdate, DecodeError> {
        let field_index = dgi.read_u16()? as usize;
        let field = dcfile.field(field_index).ok_or(DecodeError::UnexpectedEof)?;
        Ok((field_index, field.unpack_value(dgi, dcfile)?))
    }

    /// Unpacks every non-molecular, required+broadcast field in
    /// `inherited_fields` order — the fields a STATESERVER_OBJECT_UPDATE
    /// broadcasts unconditionally.
    pub fn receive_update_broadcast_required(
        &self,
        dgi: &mut DatagramIterator,
        dcfile: &DCFile,
    ) -> Result<Vec<FieldUpdate>, DecodeError> {
        self.unpack_matching(dgi, dcfile, |f| !f.is_molecular() && f.is_required() && f.is_broadcast())
    }

    /// Unpacks every non-molecular, required field — used for the
    /// generate message an owner client receives, which includes
    /// required fields regardless of `broadcast`.
    pub fn receive_update_broadcast_required_owner(
        &self,
        dgi: &mut DatagramIterator,
        dcfile: &DCFile,
    ) -> Result<Vec<FieldUpdate>, DecodeError> {
        self.unpack_matching(dgi, dcfile, |f| !f.is_molecular() && f.is_required())
    }

    /// Unpacks every non-molecular, required field, in `inherited_fields`
    /// order — the fixed-size prefix of a GENERATE_WITH_REQUIRED message.
    pub fn receive_update_all_required(
        &self,
        dgi: &mut DatagramIterator,
        dcfile: &DCFile,
    ) -> Result<Vec<FieldUpdate>, DecodeError> {
        self.unpack_matching(dgi, dcfile, |f| !f.is_molecular() && f.is_required())
    }

    fn unpack_matching(
        &self,
        dgi: &mut DatagramIterator,
        dcfile: &DCFile,
        predicate: impl Fn(&Field) -> bool,
    ) -> Result<Vec<FieldUpdate>, DecodeError> {
        let mut out = Vec::new();
        for &idx in &self.inherited_fields {
            if let Some(field) = dcfile.field(idx) {
                if predicate(field) {
                    out.push((idx, field.unpack_value(dgi, dcfile)?));
                }
            }
        }
        Ok(out)
    }

    /// Reads the trailing "other fields" section of a GENERATE_WITH_REQUIRED_OTHER
    /// or UPDATE_OTHER message: a `u16` count followed by that many
    /// (field index, value) updates.
    pub fn receive_update_other(
        &self,
        dgi: &mut DatagramIterator,
        dcfile: &DCFile,
    ) -> Result<Vec<FieldUpdate>, DecodeError> {
        let num_fields = dgi.read_u16()? as usize;
        (0..num_fields).map(|_| self.receive_update(dgi, dcfile)).collect()
    }

    /// Per SPEC_FULL.md §4.5: name; `1` if struct; parent count then each
    /// parent's class number; the constructor, if any; then own field
    /// count and each own field, in that exact sequential order (not
    /// nested inside the parent loop).
    pub fn generate_hash(&self, hash_gen: &mut HashGenerator, dcfile: &DCFile) {
        hash_gen.add_string(&self.name);
        if self.is_struct {
            hash_gen.add_int(1);
        }

        hash_gen.add_int(self.parents.len() as i32);
        for &parent_idx in &self.parents {
            if let Some(parent) = dcfile.class(parent_idx) {
                hash_gen.add_int(parent.number.map(|n| n as i32).unwrap_or(-1));
            }
        }

        if let Some(constructor) = &self.constructor {
            constructor.generate_hash(hash_gen, dcfile);
        }

        hash_gen.add_int(self.fields.len() as i32);
        for &idx in &self.fields {
            if let Some(field) = dcfile.field(idx) {
                field.generate_hash(hash_gen, dcfile);
            }
        }
    }
}

impl std::fmt::Display for DClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_struct {
            write!(f, "struct {}", self.name)
        } else {
            write!(f, "dclass {}", self.name)
        }
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dcparameter::{Parameter, SimpleParameter};
    use crate::dctype::DCTypeEnum;

    #[test]
    fn own_fields_pack_and_unpack_positionally() {
        let mut dcfile = DCFile::new();
        let class_idx = dcfile.add_class(DClass::new("Point", true, vec![])).unwrap();

        let mut x = SimpleParameter::new(DCTypeEnum::TInt16);
        x.identifier = "x".to_string();
        let mut y = SimpleParameter::new(DCTypeEnum::TInt16);
        y.identifier = "y".to_string();

        dcfile
            .add_field_to_class(class_idx, Field::new_parameter(Parameter::Primitive(x), true, vec![]))
            .unwrap();
        dcfile
            .add_field_to_class(class_idx, Field::new_parameter(Parameter::Primitive(y), true, vec![]))
            .unwrap();

        let class = dcfile.class(class_idx).unwrap().clone();
        let mut dg = Datagram::new();
        class
            .pack_values(&[DCValue::Int(4), DCValue::Int(-8)], &mut dg, &dcfile)
            .unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(
            class.unpack_value(&mut dgi, &dcfile).unwrap(),
            vec![DCValue::Int(4), DCValue::Int(-8)]
        );
    }

    #[test]
    fn child_field_shadows_same_named_parent_field() {
        let mut dcfile = DCFile::new();
        let base_idx = dcfile.add_class(DClass::new("Base", false, vec![])).unwrap();

        let mut hp = SimpleParameter::new(DCTypeEnum::TUInt16);
        hp.identifier = "hp".to_string();
        dcfile
            .add_field_to_class(base_idx, Field::new_parameter(Parameter::Primitive(hp), false, vec!["required".to_string()]))
            .unwrap();

        let child_idx = dcfile.add_class(DClass::new("Child", false, vec![base_idx])).unwrap();
        let mut hp2 = SimpleParameter::new(DCTypeEnum::TUInt32);
        hp2.identifier = "hp".to_string();
        dcfile
            .add_field_to_class(child_idx, Field::new_parameter(Parameter::Primitive(hp2), false, vec!["required".to_string()]))
            .unwrap();

        dcfile.build_all_inherited_fields();

        let child = dcfile.class(child_idx).unwrap();
        assert_eq!(child.inherited_fields.len(), 1);
        let kept = dcfile.field(child.inherited_fields[0]).unwrap();
        assert!(matches!(&kept.kind, FieldKind::Parameter { parameter: Parameter::Primitive(p), .. } if p.dtype == DCTypeEnum::TUInt32));
    }
}
