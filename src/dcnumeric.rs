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

//! Inclusive numeric ranges attached to integer and float parameters by
//! a `(a-b, c-d)` constraint clause, or expanded from a single literal.

/// An inclusive integer range. A bare literal `n` in the DC source
/// expands to `IRange { min: n, max: n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IRange {
    pub min: i64,
    pub max: i64,
}

impl IRange {
    pub fn point(n: i64) -> Self {
        Self { min: n, max: n }
    }

    /// True if this range names exactly one value, the condition an
    /// array dimension needs to be reported `fixed_array_size`.
    pub fn is_single_point(&self) -> bool {
        self.min == self.max
    }
}

/// An inclusive floating-point range, same literal-expansion rule as
/// [`IRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FRange {
    pub min: f64,
    pub max: f64,
}

impl FRange {
    pub fn point(n: f64) -> Self {
        Self { min: n, max: n }
    }

    pub fn is_single_point(&self) -> bool {
        self.min == self.max
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn single_literal_expands_to_point_range() {
        let r = IRange::point(5);
        assert_eq!(r, IRange { min: 5, max: 5 });
        assert!(r.is_single_point());
    }

    #[test]
    fn non_degenerate_range_is_not_a_single_point() {
        let r = IRange { min: 0, max: 10 };
        assert!(!r.is_single_point());
    }
}
