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

//! Field keywords: the nine historic keywords that map to fixed bit
//! positions in a field's flag word, plus user-declared `keyword` names
//! that exist for disambiguation at parse time but never set a flag bit.

use multimap::MultiMap;

/// Bit position of each historic keyword in a field's flags. A keyword
/// outside this set (declared via a `keyword` statement in the DC file)
/// never contributes to the flag word.
pub fn historic_keyword_flag(name: &str) -> Option<u32> {
    Some(match name {
        "required" => 0x0001,
        "broadcast" => 0x0002,
        "ownrecv" => 0x0004,
        "ram" => 0x0008,
        "db" => 0x0010,
        "clsend" => 0x0020,
        "clrecv" => 0x0040,
        "ownsend" => 0x0080,
        "airecv" => 0x0100,
        _ => return None,
    })
}

pub fn is_historic_keyword(name: &str) -> bool {
    historic_keyword_flag(name).is_some()
}

/// Computes the OR of every historic keyword's bit among `keywords`,
/// ignoring any non-historic (user-declared) name.
pub fn calc_flags<S: AsRef<str>>(keywords: &[S]) -> u32 {
    keywords.iter().fold(0, |flags, kw| {
        flags | historic_keyword_flag(kw.as_ref()).unwrap_or(0)
    })
}

/// A user-declared `keyword name;` statement. Recorded in
/// [`crate::dcfile::DCFile`] so the parser can tell a bare keyword
/// apart from a field identifier, but it never carries a flag bit of
/// its own.
#[derive(Debug, Clone)]
pub struct KeywordDef {
    pub name: String,
}

/// Name-indexed collection of a DCFile's custom keyword declarations.
#[derive(Debug, Default)]
pub struct DCKeywordList {
    by_name: MultiMap<String, KeywordDef>,
}

impl DCKeywordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.by_name.insert(name.clone(), KeywordDef { name });
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn historic_keywords_have_fixed_bit_positions() {
        assert_eq!(historic_keyword_flag("required"), Some(0x0001));
        assert_eq!(historic_keyword_flag("airecv"), Some(0x0100));
        assert_eq!(historic_keyword_flag("my_custom_keyword"), None);
    }

    #[test]
    fn calc_flags_ors_historic_bits_and_ignores_unknown() {
        let flags = calc_flags(&["required", "broadcast", "my_custom_keyword"]);
        assert_eq!(flags, 0x0001 | 0x0002);
    }

    #[test]
    fn keyword_list_tracks_declared_names() {
        let mut list = DCKeywordList::new();
        list.add("encrypted");
        assert!(list.contains("encrypted"));
        assert!(!list.contains("required"));
    }
}
