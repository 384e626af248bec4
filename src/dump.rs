//! Opt-in diagnostic output for the parse pipeline
//!
//! Which stages are printed is an explicit [`DumpConfig`] value handed to
//! [`parse_traced`]; nothing here reads the environment. Output goes to
//! `tracing` at debug level under the `uci::dump` target.

use crate::config::{Config, parse};
use crate::error::UciError;
use crate::lexer::scan;
use crate::parser::statements;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Pipeline stages selected for dumping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpConfig {
    /// Every lexeme
    pub lex: bool,
    /// Every statement
    pub token: bool,
    /// The finished tree as JSON
    pub serialized: bool,
}

impl DumpConfig {
    pub fn all() -> Self {
        Self {
            lex: true,
            token: true,
            serialized: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lex || self.token || self.serialized
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dump stage {0:?}, expected lex, token, serialized, json or all")]
pub struct UnknownDumpStage(pub String);

impl FromStr for DumpConfig {
    type Err = UnknownDumpStage;

    /// Parses a comma separated stage list such as `lex,token` or `all`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = DumpConfig::default();
        for field in s.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match field {
                "all" => config = DumpConfig::all(),
                "lex" => config.lex = true,
                "token" => config.token = true,
                "serialized" | "json" => config.serialized = true,
                other => return Err(UnknownDumpStage(other.to_string())),
            }
        }
        Ok(config)
    }
}

/// Parses like [`parse`], logging the stages `dump` selects.
///
/// The result is exactly what [`parse`] returns for the same input.
pub fn parse_traced(name: &str, input: &str, dump: &DumpConfig) -> Result<Config, UciError> {
    if dump.lex {
        for item in scan(name, input) {
            debug!(target: "uci::dump", source = name, "{}", item);
        }
    }
    if dump.token {
        for token in statements(name, input) {
            debug!(target: "uci::dump", source = name, "{}", token);
        }
    }

    let config = parse(name, input)?;

    if dump.serialized {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => debug!(target: "uci::dump", source = name, "{}", json),
            Err(err) => warn!(target: "uci::dump", source = name, %err, "cannot serialize config"),
        }
    }
    Ok(config)
}
