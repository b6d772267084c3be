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

//! [`DCFile`] owns every class, field and typedef parsed from one or more
//! DC sources. It is the arena every cross-reference in this crate
//! (parameter struct references, molecular subfields, typedef chains) is
//! expressed as an index into, rather than a borrowed reference or an
//! `Rc<RefCell<_>>` — see DESIGN.md for the rationale.

use std::collections::HashMap;

use crate::dclass::DClass;
use crate::dconfig::{DCFileConfig, DCFileConfigAccessor};
use crate::dcfield::{Field, FieldKind};
use crate::dcimport::ImportDecl;
use crate::dckeyword::DCKeywordList;
use crate::dctype::DCTypeEnum;
use crate::dctypedef::TypeDef;
use crate::error::ParseError;
use crate::globals::DCFileHash;
use crate::hashgen::HashGenerator;

/// Either half of what a type name can resolve to: a builtin primitive
/// tag, or a struct/dclass by index into [`DCFile::classes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedType {
    Builtin(DCTypeEnum),
    Class(usize),
}

/// The result of walking a chain of typedefs down to its root: the final
/// builtin/class the chain bottoms out at, plus the accumulated
/// constraints (ranges, modulus, divisor, array dimensions) collected
/// along the way, leaf-first (see [`TypeDef::accumulate`]).
#[derive(Debug, Clone)]
pub struct ResolvedTypeInfo {
    pub base: ResolvedType,
    pub constraints: TypeDef,
}

#[derive(Debug, Clone, Copy)]
enum NamespaceEntry {
    Class(usize),
    TypeDef(usize),
}

/// Owns every class, field and typedef belonging to one parsed schema
/// (possibly assembled from several DC source files via `parse_dc_files`).
#[derive(Debug, Default)]
pub struct DCFile {
    pub classes: Vec<DClass>,
    /// Every non-constructor field across every class, in the order each
    /// was declared. A field's position here is its DCFile-global
    /// `number`, and is what molecular fields and struct/array parameter
    /// references address.
    pub fields: Vec<Field>,
    pub typedefs: Vec<TypeDef>,
    pub keywords: DCKeywordList,
    pub config: DCFileConfig,
    /// `import`/`from ... import ...` declarations, in source order. Never
    /// resolved or loaded by this crate; retained for round-tripping.
    pub imports: Vec<ImportDecl>,
    namespace: HashMap<String, NamespaceEntry>,
}

impl DCFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&self, index: usize) -> Option<&DClass> {
        self.classes.get(index)
    }

    pub fn class_mut(&mut self, index: usize) -> Option<&mut DClass> {
        self.classes.get_mut(index)
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn class_by_name(&self, name: &str) -> Option<usize> {
        match self.namespace.get(name) {
            Some(NamespaceEntry::Class(idx)) => Some(*idx),
            _ => None,
        }
    }

    pub fn typedef_by_name(&self, name: &str) -> Option<usize> {
        match self.namespace.get(name) {
            Some(NamespaceEntry::TypeDef(idx)) => Some(*idx),
            _ => None,
        }
    }

    /// `typedef new_type old_type(...)`. Later declarations of the same
    /// `new_type` overwrite the namespace entry, matching the original
    /// (which keeps only the latest `WeakValueDictionary` assignment).
    pub fn add_typedef(&mut self, typedef: TypeDef) -> usize {
        let idx = self.typedefs.len();
        self.namespace.insert(typedef.new_type.clone(), NamespaceEntry::TypeDef(idx));
        self.typedefs.push(typedef);
        idx
    }

    /// Registers a class. Silently refuses (returning `None`, adding
    /// nothing) if the name already exists in the namespace — the
    /// original's `add_class` does the same rather than raising.
    /// A non-struct dclass is assigned the next sequential class number;
    /// a struct keeps `number == None` forever.
    pub fn add_class(&mut self, mut dclass: DClass) -> Option<usize> {
        if self.namespace.contains_key(&dclass.name) {
            return None;
        }
        if !dclass.is_struct {
            dclass.number = Some(self.classes.len() as u16);
        }
        let idx = self.classes.len();
        self.namespace.insert(dclass.name.clone(), NamespaceEntry::Class(idx));
        self.classes.push(dclass);
        Some(idx)
    }

    /// Adds `field` to the class at `class_idx`. If `field.name` equals
    /// the class's own name (only legal on a struct), it becomes that
    /// struct's constructor and is never placed in the global field
    /// arena — mirrors the original's early-return special case.
    /// Otherwise the field is pushed into the global arena, assigned the
    /// next sequential field number, and linked into the class's own
    /// field list; returns the field's global index.
    pub fn add_field_to_class(&mut self, class_idx: usize, field: Field) -> Result<Option<usize>, ParseError> {
        let (class_name, is_struct) = {
            let class = self.classes.get(class_idx).ok_or_else(|| ParseError::NotDefined(format!("class #{class_idx}")))?;
            (class.name.clone(), class.is_struct)
        };

        if !field.name.is_empty() && field.name == class_name {
            if !is_struct {
                return Err(ParseError::FieldRequiresStruct);
            }
            let class = &mut self.classes[class_idx];
            if class.constructor.is_some() {
                return Err(ParseError::DuplicateConstructor(field.name));
            }
            if !matches!(field.kind, FieldKind::Atomic { .. }) {
                return Err(ParseError::ConstructorMustBeAtomic);
            }
            class.constructor = Some(field);
            return Ok(None);
        }

        if !field.name.is_empty() && self.classes[class_idx].fields_by_name.contains_key(&field.name) {
            return Err(ParseError::DuplicateFieldName(field.name));
        }

        let mut field = field;
        field.number = self.fields.len() as u16;
        let name = field.name.clone();
        self.fields.push(field);
        let idx = self.fields.len() - 1;

        let class = &mut self.classes[class_idx];
        if !name.is_empty() {
            class.fields_by_name.insert(name, idx);
        }
        class.fields.push(idx);

        Ok(Some(idx))
    }

    /// Runs `DClass::build_inherited_fields` over every class in
    /// declaration order. Must be called once all classes and fields
    /// have been added and every class's parents already precede it —
    /// the ordering `parse_dc`'s builder produces naturally, since a
    /// dclass can only list an already-declared class as a parent.
    pub fn build_all_inherited_fields(&mut self) {
        for i in 0..self.classes.len() {
            let mut class = self.classes[i].clone();
            class.build_inherited_fields(self);
            self.classes[i] = class;
        }
    }

    /// Runs `DClass::build_inherited_fields` for a single class. The
    /// parser calls this immediately after each class's body closes, so a
    /// later class's molecular field can address a field this class
    /// inherited from an already-closed parent.
    pub fn build_inherited_fields_for(&mut self, class_idx: usize) {
        if let Some(mut class) = self.classes.get(class_idx).cloned() {
            class.build_inherited_fields(self);
            self.classes[class_idx] = class;
        }
    }

    /// Walks `identifier` through the typedef chain to its root builtin
    /// or struct/dclass, accumulating ranges/modulus/divisor/array
    /// dimensions leaf-first along the way (see [`TypeDef::accumulate`]).
    pub fn resolve_type(&self, identifier: &str) -> Result<ResolvedTypeInfo, ParseError> {
        let mut current = identifier.to_string();
        let mut acc: Option<TypeDef> = None;
        let mut visited = std::collections::HashSet::new();

        loop {
            if let Some(builtin) = DCTypeEnum::from_keyword(&current) {
                return Ok(ResolvedTypeInfo {
                    base: ResolvedType::Builtin(builtin),
                    constraints: acc.unwrap_or_else(|| TypeDef::new("", "")),
                });
            }

            if !visited.insert(current.clone()) {
                return Err(ParseError::CyclicTypedef(identifier.to_string()));
            }

            match self.namespace.get(&current) {
                Some(NamespaceEntry::TypeDef(idx)) => {
                    let typedef = &self.typedefs[*idx];
                    acc = Some(match acc {
                        Some(prev) => prev.accumulate(typedef),
                        None => typedef.clone(),
                    });
                    current = typedef.old_type.clone();
                }
                Some(NamespaceEntry::Class(idx)) => {
                    return Ok(ResolvedTypeInfo {
                        base: ResolvedType::Class(*idx),
                        constraints: acc.unwrap_or_else(|| TypeDef::new("", "")),
                    });
                }
                None => return Err(ParseError::UnknownType(current)),
            }
        }
    }

    /// Per SPEC_FULL.md §4.5: `add_int(1)` (format version), then the
    /// class count, then each class's own hash in declaration order.
    pub fn generate_hash(&self, hash_gen: &mut HashGenerator) {
        hash_gen.add_int(1);
        hash_gen.add_int(self.classes.len() as i32);
        for class in &self.classes {
            class.generate_hash(hash_gen, self);
        }
    }

    pub fn hash(&self) -> DCFileHash {
        let mut hash_gen = HashGenerator::default();
        self.generate_hash(&mut hash_gen);
        hash_gen.get_hash()
    }
}

impl DCFileConfigAccessor for DCFile {
    fn get_dc_config(&self) -> &DCFileConfig {
        &self.config
    }
}

impl std::fmt::Display for DCFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for class in &self.classes {
            writeln!(f, "{class}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dcnumeric::IRange;

    #[test]
    fn duplicate_class_name_is_silently_refused() {
        let mut dcfile = DCFile::new();
        assert!(dcfile.add_class(DClass::new("Avatar", false, vec![])).is_some());
        assert!(dcfile.add_class(DClass::new("Avatar", false, vec![])).is_none());
        assert_eq!(dcfile.classes.len(), 1);
    }

    #[test]
    fn struct_classes_never_receive_a_class_number() {
        let mut dcfile = DCFile::new();
        let idx = dcfile.add_class(DClass::new("Vec3", true, vec![])).unwrap();
        assert_eq!(dcfile.class(idx).unwrap().number, None);

        let idx2 = dcfile.add_class(DClass::new("Avatar", false, vec![])).unwrap();
        assert_eq!(dcfile.class(idx2).unwrap().number, Some(0));
    }

    #[test]
    fn resolve_type_walks_typedef_chain_to_builtin() {
        let mut dcfile = DCFile::new();
        let mut speed = TypeDef::new("Speed", "int16");
        speed.divisor = 1;
        dcfile.add_typedef(speed);

        let mut velocity = TypeDef::new("Velocity", "Speed");
        velocity.divisor = 10;
        dcfile.add_typedef(velocity);

        let resolved = dcfile.resolve_type("Velocity").unwrap();
        assert_eq!(resolved.base, ResolvedType::Builtin(DCTypeEnum::TInt16));
        assert_eq!(resolved.constraints.divisor, 10);
    }

    #[test]
    fn resolve_type_rejects_a_cyclic_typedef_chain() {
        let mut dcfile = DCFile::new();
        dcfile.add_typedef(TypeDef::new("A", "B"));
        dcfile.add_typedef(TypeDef::new("B", "A"));

        assert!(matches!(dcfile.resolve_type("A"), Err(ParseError::CyclicTypedef(ref s)) if s == "A"));
    }

    #[test]
    fn resolve_type_finds_a_struct_reference() {
        let mut dcfile = DCFile::new();
        let idx = dcfile.add_class(DClass::new("Vec3", true, vec![])).unwrap();
        dcfile.add_typedef(TypeDef::new("Position", "Vec3"));

        let resolved = dcfile.resolve_type("Position").unwrap();
        assert_eq!(resolved.base, ResolvedType::Class(idx));
    }

    #[test]
    fn array_dimensions_accumulate_outer_first_through_chain() {
        let mut dcfile = DCFile::new();
        let mut row = TypeDef::new("Row", "uint8");
        row.aranges = vec![vec![IRange::point(8)]];
        dcfile.add_typedef(row);

        let mut grid = TypeDef::new("Grid", "Row");
        grid.aranges = vec![vec![IRange::point(4)]];
        dcfile.add_typedef(grid);

        let resolved = dcfile.resolve_type("Grid").unwrap();
        assert_eq!(resolved.constraints.aranges.len(), 2);
        assert_eq!(resolved.constraints.aranges[0][0], IRange::point(8));
        assert_eq!(resolved.constraints.aranges[1][0], IRange::point(4));
    }
}
