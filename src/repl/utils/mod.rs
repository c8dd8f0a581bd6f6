//! # Utils Module
//!
//! Parsing of `.http` files and variable substitution.

pub mod http_parser;
pub mod variables;

pub use http_parser::{
    canonical_json, load_entries, parse, parse_dir, parse_file, parse_with, LoadError,
    ParseError, ParserOptions,
};
