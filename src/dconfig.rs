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

//! Defines the configuration bits that influence how a [`crate::dcfile::DCFile`]
//! builds its inheritance graph. These never affect the wire format or the
//! schema hash; they only change how fields are resolved during parsing.

use std::fmt;

/// Parser-wide configuration switches. Defaults match Panda's own
/// historical DC parser defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DCFileConfig {
    /// If disabled, a dclass inheriting from more than one base is a
    /// semantic error.
    pub dc_multiple_inheritance: bool,
    /// If enabled, inherited fields are ordered by the order their
    /// defining dclass appears across the parsed DC files, rather than
    /// strictly by base-list declaration order.
    pub dc_sort_inheritance_by_file: bool,
    /// If enabled, a dclass's inherited field list collapses duplicate
    /// diamond-inheritance ancestors to a single copy.
    pub dc_virtual_inheritance: bool,
}

impl Default for DCFileConfig {
    fn default() -> Self {
        Self {
            dc_multiple_inheritance: true,
            dc_sort_inheritance_by_file: true,
            dc_virtual_inheritance: true,
        }
    }
}

impl fmt::Display for DCFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/* DCFileConfig")?;
        writeln!(f, " * dc-multiple-inheritance = {}", self.dc_multiple_inheritance)?;
        writeln!(
            f,
            " * dc-sort-inheritance-by-file = {}",
            self.dc_sort_inheritance_by_file
        )?;
        writeln!(f, " * dc-virtual-inheritance = {}", self.dc_virtual_inheritance)?;
        write!(f, " */")
    }
}

/// Implemented by types that carry a [`DCFileConfig`], so the parser and
/// type model can read it without caring about its owner's concrete type.
pub trait DCFileConfigAccessor {
    fn get_dc_config(&self) -> &DCFileConfig;
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn default_config_matches_historical_defaults() {
        let config = DCFileConfig::default();
        assert!(config.dc_multiple_inheritance);
        assert!(config.dc_sort_inheritance_by_file);
        assert!(config.dc_virtual_inheritance);
    }
}
