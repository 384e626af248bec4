//! Configuration tree and the builder that folds statements into it
//!
//! A [`Config`] is one UCI package: an ordered list of [`Section`]s, each
//! with insertion-ordered [`UciOption`]s. [`parse`] runs the whole pipeline
//! and either returns a complete tree or the first error; a partially built
//! tree is never handed out.

use crate::error::{ParseError, Position, UciError};
use crate::parser::{Token, TokenKind, statements};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Whether an option holds a single value or a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptionKind {
    /// `option name value`
    #[default]
    Option,
    /// `list name value`, repeated
    List,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKind::Option => "option",
            OptionKind::List => "list",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = UciError;

    /// Decodes the external spelling; an empty string means `option`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "option" => Ok(OptionKind::Option),
            "list" => Ok(OptionKind::List),
            other => Err(UciError::UnknownOptionKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = Option::<Cow<'de, str>>::deserialize(deserializer)?;
        match repr {
            None => Ok(OptionKind::Option),
            Some(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A named option inside a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UciOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    /// Exactly one value for [`OptionKind::Option`]; source order for lists
    pub values: Vec<String>,
}

impl UciOption {
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            values: Vec::new(),
        }
    }

    /// The first value, which is the value of a scalar option
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn is_list(&self) -> bool {
        self.kind == OptionKind::List
    }
}

/// A typed section with its options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Explicit name, or `@<type>[<n>]` for unnamed sections
    pub name: String,
    #[serde(rename = "type")]
    pub section_type: String,
    /// True when `name` was generated
    pub anonymous: bool,
    pub options: IndexMap<String, UciOption>,
}

impl Section {
    pub fn new(section_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section_type: section_type.into(),
            anonymous: false,
            options: IndexMap::new(),
        }
    }

    /// Creates the `index`-th unnamed section of `section_type`
    pub fn unnamed(section_type: impl Into<String>, index: usize) -> Self {
        let section_type = section_type.into();
        Self {
            name: format!("@{}[{}]", section_type, index),
            section_type,
            anonymous: true,
            options: IndexMap::new(),
        }
    }

    pub fn get(&self, option: &str) -> Option<&UciOption> {
        self.options.get(option)
    }

    /// The name as written in the source, if any
    pub fn explicit_name(&self) -> Option<&str> {
        (!self.anonymous).then_some(self.name.as_str())
    }

    /// Sets a scalar option, replacing an earlier scalar of the same name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        let option = self
            .options
            .entry(name.to_string())
            .or_insert_with(|| UciOption::new(name, OptionKind::Option));
        if option.kind != OptionKind::Option {
            return Err(kind_mismatch(&self.name, name, OptionKind::Option, option.kind));
        }
        option.values.clear();
        option.values.push(value.to_string());
        Ok(())
    }

    /// Appends to a list option, creating it on first use.
    pub fn add_list_value(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        let option = self
            .options
            .entry(name.to_string())
            .or_insert_with(|| UciOption::new(name, OptionKind::List));
        if option.kind != OptionKind::List {
            return Err(kind_mismatch(&self.name, name, OptionKind::List, option.kind));
        }
        option.values.push(value.to_string());
        Ok(())
    }
}

fn kind_mismatch(section: &str, option: &str, got: OptionKind, want: OptionKind) -> UciError {
    UciError::OptionKindMismatch {
        section: section.to_string(),
        option: option.to_string(),
        got: got.to_string(),
        want: want.to_string(),
    }
}

/// A parsed UCI package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Set by a `package` statement or when loaded into a store
    pub name: Option<String>,
    /// Label the text was parsed under
    #[serde(skip)]
    pub label: String,
    pub sections: Vec<Section>,
}

impl Config {
    /// Looks up a section by name.
    ///
    /// When several sections share a name, the last declared one wins.
    pub fn get(&self, section: &str) -> Option<&Section> {
        self.sections.iter().rev().find(|s| s.name == section)
    }

    /// Package name, falling back to the parse label
    pub fn package_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.label)
    }

    /// Looks up a section and checks its type.
    pub fn get_typed(&self, section: &str, want: &str) -> Result<Option<&Section>, UciError> {
        match self.get(section) {
            Some(found) if found.section_type != want => Err(UciError::SectionTypeMismatch {
                config: self.package_name().to_string(),
                section: section.to_string(),
                got: found.section_type.clone(),
                want: want.to_string(),
            }),
            found => Ok(found),
        }
    }

    /// Iterates over sections of one type in source order
    pub fn sections_of_type<'s>(&'s self, section_type: &'s str) -> impl Iterator<Item = &'s Section> {
        self.sections
            .iter()
            .filter(move |s| s.section_type == section_type)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Folds a statement sequence into a [`Config`]
#[derive(Debug)]
pub struct ConfigBuilder<'a> {
    name: &'a str,
    input: &'a str,
    config: Config,
    current: Option<usize>,
    unnamed: HashMap<String, usize>,
}

impl<'a> ConfigBuilder<'a> {
    /// `name` labels errors; `input` resolves lexeme offsets to positions
    pub fn new(name: &'a str, input: &'a str) -> Self {
        Self {
            name,
            input,
            config: Config {
                label: name.to_string(),
                ..Config::default()
            },
            current: None,
            unnamed: HashMap::new(),
        }
    }

    /// Consumes statements up to the end marker.
    ///
    /// The first error statement or structural inconsistency aborts the
    /// build and the partial tree is dropped.
    pub fn build<I>(mut self, tokens: I) -> Result<Config, UciError>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        for token in tokens {
            match token.kind {
                TokenKind::Package => self.package(&token)?,
                TokenKind::Section => self.section(&token)?,
                TokenKind::Option => self.option(&token)?,
                TokenKind::List => self.list(&token)?,
                TokenKind::Error => {
                    let message = token.value(0).unwrap_or("unknown scanner error");
                    return Err(self.error_at(message, token.pos()).into());
                }
                TokenKind::End => {
                    debug!(
                        name = self.name,
                        sections = self.config.sections.len(),
                        "parsed config"
                    );
                    return Ok(self.config);
                }
            }
        }
        Err(self.error_at("statements ended without end of input", None).into())
    }

    fn package(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        let name = self.operand(token, 0)?;
        if let Some(existing) = &self.config.name {
            return Err(self.error_at(
                format!(
                    "duplicate package statement {}, package already named {}",
                    name, existing
                ),
                token.pos(),
            ));
        }
        self.config.name = Some(name.to_string());
        Ok(())
    }

    fn section(&mut self, token: &Token<'_>) -> Result<(), ParseError> {
        let section_type = self.operand(token, 0)?;
        let section = match token.value(1).filter(|name| !name.is_empty()) {
            Some(name) => Section::new(section_type, name),
            None => {
                let count = self.unnamed.entry(section_type.to_string()).or_insert(0);
                let section = Section::unnamed(section_type, *count);
                *count += 1;
                section
            }
        };
        debug!(section_type, name = %section.name, "opening section");
        self.config.sections.push(section);
        self.current = Some(self.config.sections.len() - 1);
        Ok(())
    }

    fn option(&mut self, token: &Token<'_>) -> Result<(), UciError> {
        let (name, value) = (self.operand(token, 0)?, self.operand(token, 1)?);
        self.current_section(token)?.set_option(name, value)
    }

    fn list(&mut self, token: &Token<'_>) -> Result<(), UciError> {
        let (name, value) = (self.operand(token, 0)?, self.operand(token, 1)?);
        self.current_section(token)?.add_list_value(name, value)
    }

    fn current_section(&mut self, token: &Token<'_>) -> Result<&mut Section, ParseError> {
        match self.current {
            Some(idx) => Ok(&mut self.config.sections[idx]),
            None => Err(self.error_at(
                format!("{} statement outside of a section", token.kind),
                token.pos(),
            )),
        }
    }

    fn operand<'t>(&self, token: &'t Token<'_>, idx: usize) -> Result<&'t str, ParseError> {
        token
            .value(idx)
            .ok_or_else(|| self.error_at(format!("malformed {} statement", token.kind), token.pos()))
    }

    fn error_at(&self, message: impl Into<String>, pos: Option<usize>) -> ParseError {
        let err = ParseError::new(message).with_source_name(self.name);
        match pos {
            Some(offset) => err.with_position(Position::at_offset(self.input, offset)),
            None => err,
        }
    }
}

/// Parses UCI text into a configuration tree.
///
/// `name` labels diagnostics and names the config when no `package`
/// statement does.
pub fn parse(name: &str, input: &str) -> Result<Config, UciError> {
    ConfigBuilder::new(name, input).build(statements(name, input))
}
