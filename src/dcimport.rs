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

//! `import`/`from ... import ...` declarations. Parsed and retained on
//! [`crate::dcfile::DCFile`] for round-tripping `Display`, per SPEC_FULL.md
//! §4.7 — resolving the referenced Python/Panda3D view classes is an
//! application-level concern outside this crate.

use std::fmt;

/// A single imported symbol, with its optional `/View` suffix list
/// (e.g. `AnonymousContact/UD` imports the `UD` view of `AnonymousContact`).
#[derive(Debug, Clone)]
pub struct ImportSymbol {
    pub name: String,
    pub views: Vec<String>,
}

impl fmt::Display for ImportSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for view in &self.views {
            write!(f, "/{view}")?;
        }
        Ok(())
    }
}

/// `from module.path import Symbol/View, Symbol2` or `import module.path`.
/// A star-import (`from module.path import *`) has `star == true` and an
/// empty `symbols` list.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub module_path: String,
    pub symbols: Vec<ImportSymbol>,
    pub star: bool,
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.star {
            return write!(f, "from {} import *", self.module_path);
        }
        if self.symbols.is_empty() {
            return write!(f, "import {}", self.module_path);
        }
        write!(f, "from {} import ", self.module_path)?;
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn star_import_displays_without_symbols() {
        let decl = ImportDecl {
            module_path: "game.ai".to_string(),
            symbols: vec![],
            star: true,
        };
        assert_eq!(decl.to_string(), "from game.ai import *");
    }

    #[test]
    fn symbol_with_views_displays_slash_suffixes() {
        let symbol = ImportSymbol {
            name: "DistributedAvatar".to_string(),
            views: vec!["AI".to_string(), "OV".to_string()],
        };
        assert_eq!(symbol.to_string(), "DistributedAvatar/AI/OV");
    }
}
