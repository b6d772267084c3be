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

//! # dclang
//!
//! Lexer, parser, in-memory type model and binary wire codec for the DC
//! network object schema language: the contract a client, AI/state-server
//! and database agree on for which distributed objects exist, which
//! fields they carry, and how those fields are packed onto the wire.
//!
//! ### Feature Flags
//! - **`full`**: enables all feature flags.
//! - **`datagram`**: the `Datagram`/`DatagramIterator` byte buffer used to
//!   pack and unpack wire values.
//! - **`dcfile`**: the DC lexer, parser and schema type model. Currently
//!   depends on `datagram` for packing field values, so in practice both
//!   are enabled together.

#![allow(clippy::module_inception)]
#![deny(unused_extern_crates)]

#[macro_use]
extern crate cfg_if;

pub mod globals;

#[cfg(feature = "datagram")]
pub mod datagram;

cfg_if! {
    if #[cfg(feature = "dcfile")] {
        mod parser;
        pub mod dcfield;
        pub mod dcfile;
        pub mod dcimport;
        pub mod dckeyword;
        pub mod dclass;
        pub mod dconfig;
        pub mod dcnumeric;
        pub mod dcparameter;
        pub mod dctype;
        pub mod dctypedef;
        pub mod error;
        mod hashgen;
        pub mod value;

        #[cfg(feature = "datagram")]
        pub mod envelope;

        use std::fs;
        use std::path::Path;

        pub use dcfile::DCFile;
        pub use error::DCReadError;
        pub use parser::parse_dc;
    }
}

/// Returns false if a [`log`] logger is not initialized.
fn logger_initialized() -> bool {
    use log::Level::*;

    let levels: &[log::Level] = &[Error, Warn, Info, Debug, Trace];
    levels.iter().any(|level| log::log_enabled!(*level))
}

/// Installs a [`pretty_env_logger`] logger if the process has none yet.
fn init_logger() {
    if logger_initialized() {
        return;
    }
    pretty_env_logger::init();
}

/// Reads and parses a single DC file from disk.
#[cfg(feature = "dcfile")]
pub fn parse_dc_file(path: impl AsRef<Path>) -> Result<DCFile, DCReadError> {
    init_logger();
    let source = fs::read_to_string(path)?;
    Ok(parse_dc(&source)?)
}

/// Reads and parses a set of DC files as one concatenated schema, in the
/// order given — later files may `typedef`/`struct`/`dclass` against names
/// declared by earlier ones, mirroring how a multi-file DC schema is
/// always read as a single logical unit.
#[cfg(feature = "dcfile")]
pub fn parse_dc_files(paths: &[impl AsRef<Path>]) -> Result<DCFile, DCReadError> {
    init_logger();

    let mut source = String::new();
    for path in paths {
        source.push_str(&fs::read_to_string(path)?);
        source.push('\n');
    }
    Ok(parse_dc(&source)?)
}

#[cfg(all(test, feature = "dcfile"))]
mod unit_testing {
    use super::*;
    #[test]
    fn parse_dc_file_reads_and_parses_from_disk() {
        let tmp = tempfile_for_test("typedef uint32 doId;\n");
        let dcfile = parse_dc_file(tmp.path()).unwrap();
        assert!(dcfile.typedef_by_name("doId").is_some());
    }

    #[test]
    fn parse_dc_files_concatenates_in_order() {
        let a = tempfile_for_test("typedef uint32 doId;\n");
        let b = tempfile_for_test("dclass Foo {\n  setPos(doId id) required broadcast;\n};\n");
        let dcfile = parse_dc_files(&[a.path(), b.path()]).unwrap();
        assert!(dcfile.class_by_name("Foo").is_some());
    }

    fn tempfile_for_test(contents: &str) -> tempfile_shim::NamedTempFile {
        tempfile_shim::NamedTempFile::new(contents)
    }

    /// Minimal stand-in for a temp-file so this test module doesn't need
    /// an extra dev-dependency for two small fixture files.
    mod tempfile_shim {
        use std::fs::{self, File};
        use std::io::Write;
        use std::path::{Path, PathBuf};

        pub struct NamedTempFile {
            path: PathBuf,
        }

        impl NamedTempFile {
            pub fn new(contents: &str) -> Self {
                use std::sync::atomic::{AtomicUsize, Ordering};
                static COUNTER: AtomicUsize = AtomicUsize::new(0);

                let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
                let mut path = std::env::temp_dir();
                path.push(format!("dclang-test-{}-{unique}.dc", std::process::id()));
                let mut file = File::create(&path).unwrap();
                file.write_all(contents.as_bytes()).unwrap();
                Self { path }
            }

            pub fn path(&self) -> &Path {
                &self.path
            }
        }

        impl Drop for NamedTempFile {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.path);
            }
        }
    }
}
