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

//! Recursive-descent parser producing a [`DCFile`] directly from DC source
//! text — see SPEC_FULL.md §4.7 for the grammar this is grounded on. The
//! grammar is not LL(1): whether a leading `IDENT` starts a parameter field
//! (a type name) or an atomic field (a method name) depends on whether that
//! name is already a registered builtin/typedef/class, so the parser
//! consults the [`DCFile`] being built as it goes, exactly as the language's
//! reference parser does.

pub mod lexer;

use lexer::{Lexer, Token};
use log::{debug, trace, warn};

use crate::dcfile::{DCFile, ResolvedType};
use crate::dckeyword::is_historic_keyword;
use crate::dclass::DClass;
use crate::dcfield::Field;
use crate::dcimport::{ImportDecl, ImportSymbol};
use crate::dcnumeric::{FRange, IRange};
use crate::dcparameter::{
    ArrayElementKind, ArrayParameter, Parameter, SimpleParameter, StructParameter, SwitchCase, SwitchParameter,
};
use crate::dctype::DCTypeEnum;
use crate::dctypedef::TypeDef;
use crate::error::ParseError;
use crate::value::DCValue;

/// Parses a complete DC schema from source text into a frozen [`DCFile`].
pub fn parse_dc(source: &str) -> Result<DCFile, ParseError> {
    Parser::new(source)?.parse_file()
}

enum Num {
    Int(i64),
    Float(f64),
}

struct SwitchCaseBuilder {
    value: Option<DCValue>,
    parameters: Vec<Parameter>,
    breaked: bool,
    is_default: bool,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
    offset: usize,
    dcfile: DCFile,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let (token, offset) = lexer.next_token()?;
        Ok(Self {
            lexer,
            token,
            offset,
            dcfile: DCFile::new(),
        })
    }

    fn bump(&mut self) -> Result<(), ParseError> {
        let (token, offset) = self.lexer.next_token()?;
        self.token = token;
        self.offset = offset;
        Ok(())
    }

    fn err(&self, expected: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            offset: self.offset,
            expected: expected.into(),
            found: self.token.describe(),
        }
    }

    fn eat(&mut self, tok: &Token) -> Result<bool, ParseError> {
        if &self.token == tok {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), ParseError> {
        if self.token == tok {
            self.bump()
        } else {
            Err(self.err(tok.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.token.clone() {
            Token::Ident(s) => {
                self.bump()?;
                Ok(s)
            }
            _ => Err(self.err("an identifier")),
        }
    }

    fn is_known_type(&self, name: &str) -> bool {
        DCTypeEnum::from_keyword(name).is_some()
            || self.dcfile.typedef_by_name(name).is_some()
            || self.dcfile.class_by_name(name).is_some()
    }

    // ---------- top level ----------

    fn parse_file(mut self) -> Result<DCFile, ParseError> {
        loop {
            let Token::Ident(keyword) = self.token.clone() else {
                if self.token == Token::Eof {
                    break;
                }
                return Err(self.err("a top-level declaration"));
            };
            match keyword.as_str() {
                "keyword" => self.parse_keyword_decl()?,
                "typedef" => self.parse_typedef_decl()?,
                "struct" => self.parse_class_decl(true)?,
                "dclass" => self.parse_class_decl(false)?,
                "from" | "import" => self.parse_import_decl()?,
                _ => return Err(self.err("`keyword`, `typedef`, `struct`, `dclass` or `import`")),
            }
        }

        self.dcfile.build_all_inherited_fields();
        debug!(
            "parse complete: {} class(es), {} field(s)",
            self.dcfile.classes.len(),
            self.dcfile.fields.len()
        );
        Ok(self.dcfile)
    }

    fn parse_keyword_decl(&mut self) -> Result<(), ParseError> {
        self.bump()?; // 'keyword'
        let name = self.expect_ident()?;
        self.expect(Token::Semicolon)?;
        if is_historic_keyword(&name) {
            warn!("re-declaring historic keyword `{name}` has no effect on its flag bit");
        }
        trace!("registered keyword `{name}`");
        self.dcfile.keywords.add(name);
        Ok(())
    }

    fn parse_typedef_decl(&mut self) -> Result<(), ParseError> {
        self.bump()?; // 'typedef'
        let old_type = self.expect_ident()?;
        let (int_ranges, float_ranges) = self.parse_optional_range()?;
        let divisor = self.parse_optional_divisor()?;
        let modulus = self.parse_optional_modulus()?;
        let new_type = self.expect_ident()?;
        let aranges = self.parse_array_ranges()?;
        self.expect(Token::Semicolon)?;

        if self.is_known_type(&new_type) {
            warn!("typedef `{new_type}` shadows an existing type name");
        }

        let mut typedef = TypeDef::new(new_type.clone(), old_type);
        typedef.int_ranges = int_ranges;
        typedef.float_ranges = float_ranges;
        typedef.divisor = divisor.unwrap_or(1);
        typedef.modulus = modulus;
        typedef.aranges = aranges;

        trace!("registered typedef `{new_type}`");
        self.dcfile.add_typedef(typedef);
        Ok(())
    }

    fn parse_import_decl(&mut self) -> Result<(), ParseError> {
        let Token::Ident(keyword) = self.token.clone() else {
            unreachable!("caller already matched an Ident");
        };

        if keyword == "from" {
            self.bump()?;
            let module_path = self.parse_module_path()?;
            let next = self.expect_ident()?;
            if next != "import" {
                return Err(self.err("`import`"));
            }

            if let Token::Ident(star) = self.token.clone() {
                if star == "*" {
                    self.bump()?;
                    trace!("registered star import from `{module_path}`");
                    self.dcfile.imports.push(ImportDecl {
                        module_path,
                        symbols: Vec::new(),
                        star: true,
                    });
                    return Ok(());
                }
            }

            let mut symbols = vec![self.parse_import_symbol()?];
            while self.eat(&Token::Comma)? {
                symbols.push(self.parse_import_symbol()?);
            }
            trace!("registered import of {} symbol(s) from `{module_path}`", symbols.len());
            self.dcfile.imports.push(ImportDecl {
                module_path,
                symbols,
                star: false,
            });
            Ok(())
        } else {
            self.bump()?; // 'import'
            let module_path = self.parse_module_path()?;
            trace!("registered bare import of `{module_path}`");
            self.dcfile.imports.push(ImportDecl {
                module_path,
                symbols: Vec::new(),
                star: false,
            });
            Ok(())
        }
    }

    fn parse_module_path(&mut self) -> Result<String, ParseError> {
        let mut path = self.expect_ident()?;
        while self.eat(&Token::Dot)? {
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        Ok(path)
    }

    fn parse_import_symbol(&mut self) -> Result<ImportSymbol, ParseError> {
        let name = self.expect_ident()?;
        let mut views = Vec::new();
        while self.eat(&Token::ForwardSlash)? {
            views.push(self.expect_ident()?);
        }
        Ok(ImportSymbol { name, views })
    }

    // ---------- class / struct ----------

    fn parse_class_decl(&mut self, is_struct: bool) -> Result<(), ParseError> {
        self.bump()?; // 'dclass'/'struct'
        let name = self.expect_ident()?;
        let parent_names = self.parse_base_list()?;

        if parent_names.len() > 1 && !self.dcfile.config.dc_multiple_inheritance {
            return Err(ParseError::MultipleInheritanceDisabled);
        }

        let mut parent_indices = Vec::with_capacity(parent_names.len());
        for parent_name in &parent_names {
            let idx = self
                .dcfile
                .class_by_name(parent_name)
                .ok_or_else(|| ParseError::NotDefined(parent_name.clone()))?;
            parent_indices.push(idx);
        }

        let class_idx = self
            .dcfile
            .add_class(DClass::new(name.clone(), is_struct, parent_indices.clone()))
            .ok_or_else(|| ParseError::DuplicateClassName(name.clone()))?;

        // Pre-seed the parents' visible field names so a molecular or
        // constructor declaration inside this class's own body can
        // immediately resolve a sibling inherited from an already-closed
        // parent. `build_inherited_fields_for` below recomputes the
        // authoritative `inherited_fields`/`fields_by_name` once this
        // class's own fields are final.
        let mut seed = Vec::new();
        for &parent_idx in &parent_indices {
            if let Some(parent) = self.dcfile.class(parent_idx) {
                seed.extend(parent.fields_by_name.iter().map(|(k, v)| (k.clone(), *v)));
            }
        }
        if let Some(class) = self.dcfile.class_mut(class_idx) {
            for (name, idx) in seed {
                class.fields_by_name.entry(name).or_insert(idx);
            }
        }

        self.expect(Token::OpenBrace)?;
        while self.token != Token::CloseBrace {
            let field = self.parse_field_decl(class_idx, &name, is_struct)?;
            self.expect(Token::Semicolon)?;
            self.dcfile.add_field_to_class(class_idx, field)?;
        }
        self.expect(Token::CloseBrace)?;
        self.expect(Token::Semicolon)?;

        self.dcfile.build_inherited_fields_for(class_idx);

        let field_count = self.dcfile.class(class_idx).map(|c| c.fields.len()).unwrap_or(0);
        debug!(
            "registered {} `{name}` with {field_count} own field(s)",
            if is_struct { "struct" } else { "dclass" }
        );
        Ok(())
    }

    fn parse_base_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        if self.eat(&Token::Colon)? {
            names.push(self.expect_ident()?);
            while self.eat(&Token::Comma)? {
                names.push(self.expect_ident()?);
            }
        }
        Ok(names)
    }

    fn parse_field_decl(&mut self, class_idx: usize, class_name: &str, is_struct: bool) -> Result<Field, ParseError> {
        let Token::Ident(name) = self.token.clone() else {
            return Err(self.err("a field declaration"));
        };

        // Constructor: `ClassName(params) keywords?`, legal only on a struct.
        if is_struct && name == class_name {
            self.bump()?;
            if self.token != Token::OpenParen {
                return Err(self.err("`(` to begin a struct constructor"));
            }
            let parameters = self.parse_parameter_list()?;
            let keywords = self.parse_keyword_list()?;
            return Ok(Field::new_atomic(name, parameters, keywords));
        }

        self.bump()?; // consume the leading identifier

        if self.token == Token::Colon {
            self.bump()?;
            let mut subfield_names = vec![self.expect_ident()?];
            while self.eat(&Token::Comma)? {
                subfield_names.push(self.expect_ident()?);
            }
            let mut subfields = Vec::with_capacity(subfield_names.len());
            for subfield_name in &subfield_names {
                let idx = self
                    .dcfile
                    .class(class_idx)
                    .and_then(|c| c.field_index_by_name(subfield_name))
                    .ok_or_else(|| ParseError::NotDefined(subfield_name.clone()))?;
                subfields.push(idx);
            }
            return Ok(Field::new_molecular(name, subfields));
        }

        if self.token == Token::OpenParen && !self.is_known_type(&name) && name != "switch" {
            let parameters = self.parse_parameter_list()?;
            let keywords = self.parse_keyword_list()?;
            return Ok(Field::new_atomic(name, parameters, keywords));
        }

        // `name` was actually the leading type name of a parameter field.
        let parameter = self.parse_parameter_from_type(name)?;
        let keywords = self.parse_keyword_list()?;
        Ok(Field::new_parameter(parameter, is_struct, keywords))
    }

    fn parse_keyword_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut keywords = Vec::new();
        while let Token::Ident(s) = self.token.clone() {
            self.bump()?;
            keywords.push(s);
        }
        Ok(keywords)
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.expect(Token::OpenParen)?;
        let mut params = Vec::new();
        if self.token != Token::CloseParen {
            loop {
                let type_name = self.expect_ident()?;
                params.push(self.parse_parameter_from_type(type_name)?);
                if !self.eat(&Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::CloseParen)?;
        Ok(params)
    }

    // ---------- parameters ----------

    fn parse_parameter_from_type(&mut self, type_name: String) -> Result<Parameter, ParseError> {
        if type_name == "switch" {
            return self.parse_switch_parameter();
        }

        let resolved = self.dcfile.resolve_type(&type_name)?;

        let mut int_ranges = resolved.constraints.int_ranges.clone();
        let mut float_ranges = resolved.constraints.float_ranges.clone();
        let mut divisor = resolved.constraints.divisor;
        let mut modulus = resolved.constraints.modulus;
        let base_aranges = resolved.constraints.aranges.clone();

        let (inline_ints, inline_floats) = self.parse_optional_range()?;
        if !inline_ints.is_empty() {
            int_ranges = inline_ints;
        }
        if !inline_floats.is_empty() {
            float_ranges = inline_floats;
        }
        if let Some(d) = self.parse_optional_divisor()? {
            divisor = d;
        }
        if let Some(m) = self.parse_optional_modulus()? {
            modulus = Some(m);
        }

        let explicit_dims = self.parse_array_ranges()?;
        let mut arange = base_aranges;
        arange.extend(explicit_dims);

        let mut parameter = match resolved.base {
            ResolvedType::Builtin(dtype) => {
                if !arange.is_empty() || dtype.is_legacy_array() {
                    let element = if dtype.is_legacy_array() {
                        ArrayElementKind::Legacy(dtype)
                    } else if dtype.is_sized() {
                        ArrayElementKind::Sized(dtype)
                    } else {
                        ArrayElementKind::Primitive(dtype)
                    };
                    Parameter::Array(ArrayParameter::with_element_constraints(
                        element, arange, int_ranges, float_ranges, modulus, divisor,
                    ))
                } else {
                    let mut simple = SimpleParameter::new(dtype);
                    simple.int_ranges = int_ranges;
                    simple.float_ranges = float_ranges;
                    simple.modulus = modulus;
                    simple.divisor = divisor;
                    simple.recompute_fixed_byte_size();
                    Parameter::Primitive(simple)
                }
            }
            ResolvedType::Class(class_idx) => {
                if !arange.is_empty() {
                    Parameter::Array(ArrayParameter::new(ArrayElementKind::Struct(class_idx), arange))
                } else {
                    Parameter::Struct(StructParameter {
                        dclass_index: class_idx,
                        identifier: String::new(),
                        default: None,
                    })
                }
            }
        };

        // A trailing identifier names this parameter, unless it's actually
        // a keyword about to be consumed by the caller's `keyword_list`.
        if let Token::Ident(s) = self.token.clone() {
            if !is_historic_keyword(&s) && !self.dcfile.keywords.contains(&s) {
                self.bump()?;
                set_parameter_identifier(&mut parameter, s);
            }
        }

        if self.eat(&Token::Equals)? {
            let default_value = self.parse_literal_value()?;
            set_parameter_default(&mut parameter, default_value);
        }

        Ok(parameter)
    }

    fn parse_switch_parameter(&mut self) -> Result<Parameter, ParseError> {
        self.bump()?; // 'switch'

        let identifier = if let Token::Ident(s) = self.token.clone() {
            self.bump()?;
            s
        } else {
            String::new()
        };

        self.expect(Token::OpenParen)?;
        let disc_type_name = self.expect_ident()?;
        let discriminant = self.parse_parameter_from_type(disc_type_name)?;
        self.expect(Token::CloseParen)?;
        self.expect(Token::OpenBrace)?;

        let mut builders: Vec<SwitchCaseBuilder> = Vec::new();
        let mut seen_default = false;

        while self.token != Token::CloseBrace {
            let Token::Ident(keyword) = self.token.clone() else {
                return Err(self.err("`case` or `default`"));
            };

            if keyword == "case" {
                self.bump()?;
                let value = self.parse_literal_value()?;
                self.expect(Token::Colon)?;
                if builders.iter().any(|b| !b.is_default && b.value.as_ref() == Some(&value)) {
                    return Err(ParseError::DuplicateCaseValue);
                }
                builders.push(SwitchCaseBuilder {
                    value: Some(value),
                    parameters: Vec::new(),
                    breaked: false,
                    is_default: false,
                });
            } else if keyword == "default" {
                self.bump()?;
                self.expect(Token::Colon)?;
                if seen_default {
                    return Err(ParseError::DuplicateDefaultCase);
                }
                seen_default = true;
                builders.push(SwitchCaseBuilder {
                    value: None,
                    parameters: Vec::new(),
                    breaked: false,
                    is_default: true,
                });
            } else {
                return Err(self.err("`case` or `default`"));
            }

            loop {
                match self.token.clone() {
                    Token::Ident(s) if s == "break" => {
                        self.bump()?;
                        self.expect(Token::Semicolon)?;
                        builders.last_mut().unwrap().breaked = true;
                        break;
                    }
                    Token::Ident(s) if s == "case" || s == "default" => break,
                    Token::CloseBrace => break,
                    Token::Ident(type_name) => {
                        let parameter = self.parse_parameter_from_type(type_name)?;
                        self.parse_keyword_list()?;
                        self.expect(Token::Semicolon)?;
                        builders.last_mut().unwrap().parameters.push(parameter);
                    }
                    _ => return Err(self.err("a field declaration, `break`, `case` or `default`")),
                }
            }
        }
        self.expect(Token::CloseBrace)?;

        let default_case: Option<Vec<Parameter>> = builders.iter().find(|b| b.is_default).map(|b| b.parameters.clone());

        let mut cases = Vec::new();
        for builder in builders.into_iter().filter(|b| !b.is_default) {
            let mut parameters = builder.parameters;
            if !builder.breaked {
                if let Some(default_params) = &default_case {
                    parameters.extend(default_params.clone());
                }
            }
            cases.push(SwitchCase {
                value: builder.value.expect("case builder always carries a value"),
                parameters,
                breaked: builder.breaked,
            });
        }

        trace!("registered switch with {} case(s)", cases.len());
        Ok(Parameter::Switch(SwitchParameter {
            identifier,
            discriminant: Box::new(discriminant),
            cases,
            default_case,
        }))
    }

    // ---------- numeric/array sub-grammars ----------

    fn parse_signed_number(&mut self) -> Result<Num, ParseError> {
        let negative = self.eat(&Token::Minus)?;
        match self.token.clone() {
            Token::Int(n) => {
                self.bump()?;
                Ok(Num::Int(if negative { -n } else { n }))
            }
            Token::Float(f) => {
                self.bump()?;
                Ok(Num::Float(if negative { -f } else { f }))
            }
            _ => Err(self.err("a number literal")),
        }
    }

    fn parse_optional_range(&mut self) -> Result<(Vec<IRange>, Vec<FRange>), ParseError> {
        if self.token != Token::OpenParen {
            return Ok((Vec::new(), Vec::new()));
        }
        self.bump()?;

        let mut ints = Vec::new();
        let mut floats = Vec::new();
        loop {
            let first = self.parse_signed_number()?;
            let second = if self.eat(&Token::Minus)? {
                Some(self.parse_signed_number()?)
            } else {
                None
            };
            match (first, second) {
                (Num::Int(a), None) => ints.push(IRange::point(a)),
                (Num::Int(a), Some(Num::Int(b))) => ints.push(IRange { min: a, max: b }),
                (Num::Float(a), None) => floats.push(FRange::point(a)),
                (Num::Float(a), Some(Num::Float(b))) => floats.push(FRange { min: a, max: b }),
                (Num::Int(a), Some(Num::Float(b))) => floats.push(FRange { min: a as f64, max: b }),
                (Num::Float(a), Some(Num::Int(b))) => floats.push(FRange { min: a, max: b as f64 }),
            }
            if !self.eat(&Token::Comma)? {
                break;
            }
        }
        self.expect(Token::CloseParen)?;
        Ok((ints, floats))
    }

    fn parse_optional_divisor(&mut self) -> Result<Option<i64>, ParseError> {
        if self.token != Token::ForwardSlash {
            return Ok(None);
        }
        self.bump()?;
        let negative = self.eat(&Token::Minus)?;
        let n = match self.token.clone() {
            Token::Int(n) => {
                self.bump()?;
                if negative {
                    -n
                } else {
                    n
                }
            }
            _ => return Err(self.err("a divisor integer")),
        };
        if n <= 0 {
            return Err(ParseError::InvalidDivisor);
        }
        Ok(Some(n))
    }

    fn parse_optional_modulus(&mut self) -> Result<Option<f64>, ParseError> {
        if self.token != Token::Percent {
            return Ok(None);
        }
        self.bump()?;
        let negative = self.eat(&Token::Minus)?;
        let v = match self.token.clone() {
            Token::Int(n) => {
                self.bump()?;
                n as f64
            }
            Token::Float(f) => {
                self.bump()?;
                f
            }
            _ => return Err(self.err("a modulus value")),
        };
        let v = if negative { -v } else { v };
        if v < 0.0 {
            return Err(ParseError::InvalidModulus);
        }
        Ok(Some(v))
    }

    /// Parses zero or more `[n]`/`[a-b]`/`[]` dimension clauses, in source
    /// (outer-to-inner) order, and returns them reversed so that index
    /// `len - 1` is the outermost dimension — the convention
    /// [`crate::dcparameter::ArrayParameter`] packs/unpacks against (its
    /// recursion starts at `dimension_count() - 1`).
    fn parse_array_ranges(&mut self) -> Result<Vec<Vec<IRange>>, ParseError> {
        let mut dims = Vec::new();
        while self.token == Token::OpenBracket {
            self.bump()?;
            let mut items = Vec::new();
            if self.token != Token::CloseBracket {
                loop {
                    let first = self.parse_signed_number()?;
                    let second = if self.eat(&Token::Minus)? {
                        Some(self.parse_signed_number()?)
                    } else {
                        None
                    };
                    let (min, max) = match (first, second) {
                        (Num::Int(a), None) => (a, a),
                        (Num::Int(a), Some(Num::Int(b))) => (a, b),
                        _ => return Err(self.err("an integer array dimension")),
                    };
                    items.push(IRange { min, max });
                    if !self.eat(&Token::Comma)? {
                        break;
                    }
                }
            }
            self.expect(Token::CloseBracket)?;
            dims.push(items);
        }
        dims.reverse();
        Ok(dims)
    }

    fn parse_literal_value(&mut self) -> Result<DCValue, ParseError> {
        if self.token == Token::OpenBrace {
            self.bump()?;
            let mut items = Vec::new();
            if self.token != Token::CloseBrace {
                loop {
                    items.push(self.parse_literal_value()?);
                    if !self.eat(&Token::Comma)? {
                        break;
                    }
                }
            }
            self.expect(Token::CloseBrace)?;
            return Ok(DCValue::Array(items));
        }

        let negative = self.eat(&Token::Minus)?;
        let value = match self.token.clone() {
            Token::Int(n) => {
                self.bump()?;
                DCValue::Int(if negative { -n } else { n })
            }
            Token::Float(f) => {
                self.bump()?;
                DCValue::Float(if negative { -f } else { f })
            }
            Token::Str(s) => {
                self.bump()?;
                DCValue::Bytes(s.into_bytes())
            }
            Token::Char(c) => {
                self.bump()?;
                DCValue::UInt(c as u64)
            }
            Token::Ident(s) if s == "true" => {
                self.bump()?;
                DCValue::Bool(true)
            }
            Token::Ident(s) if s == "false" => {
                self.bump()?;
                DCValue::Bool(false)
            }
            _ => return Err(self.err("a literal value")),
        };
        Ok(value)
    }
}

fn set_parameter_identifier(parameter: &mut Parameter, identifier: String) {
    match parameter {
        Parameter::Primitive(p) => p.identifier = identifier,
        Parameter::Array(p) => p.identifier = identifier,
        Parameter::Struct(p) => p.identifier = identifier,
        Parameter::Switch(p) => p.identifier = identifier,
    }
}

fn set_parameter_default(parameter: &mut Parameter, default: DCValue) {
    match parameter {
        Parameter::Primitive(p) => p.default = Some(default),
        Parameter::Array(p) => p.default = Some(default),
        Parameter::Struct(p) => p.default = Some(default),
        Parameter::Switch(_) => {}
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;
    use crate::dctype::DCTypeEnum;

    #[test]
    fn parses_a_minimal_dclass_with_a_required_field() {
        let dcfile = parse_dc("dclass Avatar { setHp(uint16 hp) broadcast required; };").unwrap();
        assert_eq!(dcfile.classes.len(), 1);
        let class = &dcfile.classes[0];
        assert_eq!(class.name, "Avatar");
        assert_eq!(class.fields.len(), 1);
        let field = dcfile.field(class.fields[0]).unwrap();
        assert!(field.is_broadcast());
        assert!(field.is_required());
    }

    #[test]
    fn parses_typedef_chain_and_resolves_builtin() {
        let dcfile = parse_dc(
            "typedef uint32 doId;
             dclass Obj { doId id; };",
        )
        .unwrap();
        let field = dcfile.field(dcfile.classes[0].fields[0]).unwrap();
        assert!(matches!(
            &field.kind,
            crate::dcfield::FieldKind::Parameter {
                parameter: Parameter::Primitive(p),
                ..
            } if p.dtype == DCTypeEnum::TUInt32
        ));
    }

    #[test]
    fn parses_molecular_field_referencing_inherited_siblings() {
        let dcfile = parse_dc(
            "dclass Base {
                setX(int16 x) broadcast required;
                setY(int16 y) broadcast required;
             };
             dclass Child : Base {
                setXY : setX, setY;
             };",
        )
        .unwrap();

        let child = dcfile.class_by_name("Child").and_then(|idx| dcfile.class(idx)).unwrap();
        let molecular_idx = child.field_index_by_name("setXY").unwrap();
        let molecular = dcfile.field(molecular_idx).unwrap();
        assert!(molecular.is_molecular());
        assert_eq!(molecular.num_args(&dcfile), 2);
    }

    #[test]
    fn parses_switch_with_fallthrough_and_five_cases() {
        let dcfile = parse_dc(
            "struct BuffData {
                switch(uint16) {
                    case 0:
                        break;
                    case 1:
                        uint8 val1;
                        break;
                    case 2:
                        uint8 val1;
                        uint8 val2;
                        break;
                    case 3:
                        uint8 val1;
                        break;
                    case 4:
                        int16/100 val1;
                        break;
                };
             };",
        )
        .unwrap();

        let class = &dcfile.classes[0];
        let field = dcfile.field(class.fields[0]).unwrap();
        let crate::dcfield::FieldKind::Parameter {
            parameter: Parameter::Switch(switch),
            ..
        } = &field.kind
        else {
            panic!("expected a switch parameter field");
        };
        assert_eq!(switch.cases.len(), 5);
        assert!(switch.default_case.is_none());
        assert_eq!(switch.cases[4].value, DCValue::UInt(4));
        assert!(switch.cases[0].breaked);

        assert_eq!(dcfile.hash(), 56286);
    }

    #[test]
    fn parses_legacy_array_field_without_explicit_brackets() {
        let dcfile = parse_dc("dclass Obj { fieldTest3(uint32uint8array) broadcast required; };").unwrap();
        let field = dcfile.field(dcfile.classes[0].fields[0]).unwrap();
        let crate::dcfield::FieldKind::Atomic { parameters } = &field.kind else {
            panic!("expected an atomic field");
        };
        assert!(matches!(&parameters[0], Parameter::Array(a) if matches!(a.element, ArrayElementKind::Legacy(_))));
    }

    #[test]
    fn duplicate_class_name_is_a_parse_error() {
        let err = parse_dc("dclass A { }; dclass A { };").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateClassName(ref name) if name == "A"));
    }

    #[test]
    fn import_declarations_round_trip_through_display() {
        let dcfile = parse_dc(
            "from game.ai import AnonymousContact/UD
             from game.world import *
             dclass AnonymousContact { login(string user) clsend airecv; };",
        )
        .unwrap();
        assert_eq!(dcfile.imports.len(), 2);
        assert_eq!(dcfile.imports[0].to_string(), "from game.ai import AnonymousContact/UD");
        assert_eq!(dcfile.imports[1].to_string(), "from game.world import *");
    }
}
