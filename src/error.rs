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

//! Error types shared by the parser, type model and codec.

use crate::datagram::DgError;
use thiserror::Error;

/// Grammar violations and semantic errors raised while parsing a DC file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error at byte {offset}: expected {expected}, found {found}")]
    Syntax {
        offset: usize,
        expected: String,
        found: String,
    },
    #[error("unknown type name `{0}`")]
    UnknownType(String),
    #[error("cyclic typedef detected while resolving `{0}`")]
    CyclicTypedef(String),
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
    #[error("duplicate class/struct name `{0}`")]
    DuplicateClassName(String),
    #[error("duplicate case value in switch")]
    DuplicateCaseValue,
    #[error("default case is already defined")]
    DuplicateDefaultCase,
    #[error("a non-network field cannot be stored on a dclass")]
    FieldRequiresStruct,
    #[error("duplicate constructor for `{0}`")]
    DuplicateConstructor(String),
    #[error("constructor fields must be atomic fields")]
    ConstructorMustBeAtomic,
    #[error("divisor must be strictly positive")]
    InvalidDivisor,
    #[error("modulus must not be negative")]
    InvalidModulus,
    #[error("`{0}` is not defined")]
    NotDefined(String),
    #[error("multiple inheritance is not allowed by this DCFile's configuration")]
    MultipleInheritanceDisabled,
}

/// A numeric or sized-string write that does not fit in its declared
/// wire width.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OverflowError {
    #[error("value does not fit in the declared width")]
    ValueOutOfRange,
    #[error("length {0} exceeds the length prefix's range")]
    LengthPrefixOverflow(usize),
}

/// Errors raised while packing a value against a schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("missing required argument with no default for `{0}`")]
    MissingArgument(String),
    #[error("wrong argument count: expected {expected}, got {got}")]
    WrongArity { expected: usize, got: usize },
    #[error("molecular fields cannot be packed directly")]
    MolecularFieldPackedDirectly,
    #[error("switch discriminant value has no matching case and no default case")]
    UnmatchedSwitchDiscriminant,
    #[error(transparent)]
    Overflow(#[from] OverflowError),
    #[error(transparent)]
    Datagram(#[from] DgError),
}

/// Errors raised while unpacking a value against a schema.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read past the end of the datagram")]
    UnexpectedEof,
    #[error("variable-length prefix exceeds the remaining bytes")]
    LengthPrefixExceedsBuffer,
    #[error(transparent)]
    Datagram(#[from] DgError),
}

/// Top-level error for the file-reading entry points
/// (`parse_dc_file`/`parse_dc_files`), wrapping I/O failures alongside
/// parse failures.
#[derive(Debug, Error)]
pub enum DCReadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
