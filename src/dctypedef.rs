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

//! `typedef` aliasing. A typedef names a builtin tag, another typedef, or
//! a struct/dclass, optionally layering numeric ranges, a modulus, a
//! divisor and array dimensions on top — all of which accumulate as a
//! chain of typedefs is walked down to its root. See [`crate::dcfile::DCFile::resolve_type`].

use crate::dcnumeric::{FRange, IRange};

/// A single `typedef new_type old_type(...)` declaration.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub new_type: String,
    /// Name of the type being aliased: a builtin tag keyword, another
    /// typedef's `new_type`, or a struct/dclass name. Resolved against
    /// the owning [`crate::dcfile::DCFile`]'s namespace, not stored here.
    pub old_type: String,
    pub int_ranges: Vec<IRange>,
    pub float_ranges: Vec<FRange>,
    pub modulus: Option<f64>,
    pub divisor: i64,
    /// Array dimensions layered on by trailing `[n]`/`[a-b]` clauses on
    /// the typedef itself, each entry a list of point/range constraints
    /// for that dimension.
    pub aranges: Vec<Vec<IRange>>,
}

impl TypeDef {
    pub fn new(new_type: impl Into<String>, old_type: impl Into<String>) -> Self {
        Self {
            new_type: new_type.into(),
            old_type: old_type.into(),
            int_ranges: Vec::new(),
            float_ranges: Vec::new(),
            modulus: None,
            divisor: 1,
            aranges: Vec::new(),
        }
    }

    /// Merges `other`'s constraints onto `self`'s as the resolver walks
    /// one more link down a typedef chain: `other` is further from the
    /// leaf reference than `self`, so `self`'s explicit constraints
    /// always win and `other`'s array dimensions are prepended (outer
    /// dimensions declared closer to the leaf typedef come first).
    pub fn accumulate(mut self, other: &TypeDef) -> Self {
        if self.int_ranges.is_empty() {
            self.int_ranges = other.int_ranges.clone();
        }
        if self.float_ranges.is_empty() {
            self.float_ranges = other.float_ranges.clone();
        }
        if self.modulus.is_none() {
            self.modulus = other.modulus;
        }
        if self.divisor == 1 {
            self.divisor = other.divisor;
        }
        let mut aranges = other.aranges.clone();
        aranges.extend(self.aranges.clone());
        self.aranges = aranges;
        self
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn accumulate_prefers_leaf_constraints() {
        let mut leaf = TypeDef::new("Velocity", "Speed");
        leaf.divisor = 10;

        let mut root = TypeDef::new("Speed", "int16");
        root.divisor = 1;
        root.modulus = Some(2.0);

        let merged = leaf.accumulate(&root);
        assert_eq!(merged.divisor, 10);
        assert_eq!(merged.modulus, Some(2.0));
    }

    #[test]
    fn accumulate_concatenates_array_dimensions_outer_first() {
        let mut leaf = TypeDef::new("Grid", "Row");
        leaf.aranges = vec![vec![IRange::point(4)]];

        let mut root = TypeDef::new("Row", "uint8");
        root.aranges = vec![vec![IRange::point(8)]];

        let merged = leaf.accumulate(&root);
        assert_eq!(merged.aranges.len(), 2);
        assert_eq!(merged.aranges[0][0], IRange::point(8));
        assert_eq!(merged.aranges[1][0], IRange::point(4));
    }
}
