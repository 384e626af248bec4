//! # UCI Parser
//!
//! A lexer and parser for the UCI (Unified Configuration Interface) text
//! format used by OpenWrt-style systems.
//!
//! ## Overview
//!
//! A UCI file describes one package made of typed, optionally named
//! sections. Each section holds scalar options and list options:
//!
//! ```text
//! package network
//!
//! Config interface 'lan'
//!     option proto 'static'
//!     list dns '8.8.8.8'
//!     list dns '8.8.4.4'
//! ```
//!
//! Parsing is a one-way pipeline. The [`lexer`] turns text into a lazy
//! sequence of position-tagged lexemes, the [`parser`] groups lexemes into
//! one statement per keyword line, and the [`config`] builder folds the
//! statements into a [`Config`] tree. Every stage is demand-driven: a
//! consumer that stops pulling stops all work.
//!
//! ## Basic Usage
//!
//! ```rust
//! use uci::parse;
//!
//! let config = parse("mwan3", r#"
//! Config globals 'globals'
//!     option mmx_mask '0x3F00'
//!
//! Config interface 'wan'
//!     list track_ip '8.8.4.4'
//!     list track_ip '8.8.8.8'
//! "#)?;
//!
//! let mask = config.get("globals").and_then(|s| s.get("mmx_mask"));
//! assert_eq!(mask.and_then(|o| o.value()), Some("0x3F00"));
//!
//! let track_ip = &config.get("wan").unwrap().get("track_ip").unwrap().values;
//! assert_eq!(track_ip, &["8.8.4.4", "8.8.8.8"]);
//! # Ok::<(), uci::UciError>(())
//! ```
//!
//! ## Unnamed Sections
//!
//! Sections without a name are called `@<type>[<n>]`, where `n` counts the
//! earlier unnamed sections of the same type:
//!
//! ```rust
//! let config = uci::parse("system", "Config timeserver\nConfig timeserver ntp\nConfig timeserver\n")?;
//! let names: Vec<_> = config.sections.iter().map(|s| s.name.as_str()).collect();
//! assert_eq!(names, ["@timeserver[0]", "ntp", "@timeserver[1]"]);
//! # Ok::<(), uci::UciError>(())
//! ```
//!
//! ## Lexemes and Statements
//!
//! ```rust
//! use uci::{ItemKind, TokenKind, scan, statements};
//!
//! let kinds: Vec<_> = scan("demo", "option answer 42").map(|i| i.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [ItemKind::Begin, ItemKind::Option, ItemKind::Ident, ItemKind::String, ItemKind::End]
//! );
//!
//! let first = statements("demo", "option answer 42").next().unwrap();
//! assert_eq!(first.kind, TokenKind::Option);
//! assert_eq!(first.value(1), Some("42"));
//! ```
//!
//! ## Error Handling
//!
//! The first failure ends the parse; no partial tree is returned. Every
//! error kind has a predicate:
//!
//! ```rust
//! use uci::parse;
//!
//! let err = parse("broken", "Config foo \"bar\n").unwrap_err();
//! assert!(err.is_parse_error());
//! assert_eq!(
//!     err.to_string(),
//!     "Parse error: broken:1:12: unterminated quoted string"
//! );
//! ```

pub mod config;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod store;

#[cfg(test)]
mod fixtures;

// Re-export main types and functions
pub use config::{Config, ConfigBuilder, OptionKind, Section, UciOption, parse};
pub use dump::{DumpConfig, parse_traced};
pub use error::{
    ParseError, Position, UciError, is_config_already_loaded, is_option_kind_mismatch,
    is_parse_error, is_section_type_mismatch, is_unknown_option_kind,
};
pub use lexer::{Item, ItemKind, ScanState, Scanner, scan, transition};
pub use parser::{Statements, Token, TokenKind, aggregate, statements};
pub use store::ConfigStore;
