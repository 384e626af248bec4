//! Error types and position tracking for UCI parsing
//!
//! Every stage of the pipeline reports failures through [`UciError`]. Each
//! variant has a matching predicate, both as a method and as a free function
//! that also sees through wrapping errors via [`std::error::Error::source`].

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Computes the position of a byte offset within `input`.
    ///
    /// Offsets past the end, or inside a multi-byte character, are clamped
    /// back to the nearest preceding character boundary.
    pub fn at_offset(input: &str, offset: usize) -> Self {
        let mut end = offset.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let mut pos = Self::new();
        pos.advance_by(&input[..end]);
        pos
    }

    /// Advances the position by one character
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }

    /// Advances the position by multiple characters
    pub fn advance_by(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Main error type for UCI operations
#[derive(Debug, Error)]
pub enum UciError {
    /// Lexical or grammatical failure
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// External option-kind representation that is neither `option` nor `list`
    #[error("unknown option type {kind}")]
    UnknownOptionKind { kind: String },

    /// A package name was loaded into a store twice
    #[error("{name} already loaded")]
    ConfigAlreadyLoaded { name: String },

    /// The type-checked section accessor found a different section type
    #[error("type mismatch for {config}.{section}, got {got}, want {want}")]
    SectionTypeMismatch {
        config: String,
        section: String,
        got: String,
        want: String,
    },

    /// An option was redeclared with a different kind in the same section
    #[error("option {section}.{option} declared as {got}, previously {want}")]
    OptionKindMismatch {
        section: String,
        option: String,
        got: String,
        want: String,
    },
}

impl UciError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, UciError::Parse(_))
    }

    pub fn is_unknown_option_kind(&self) -> bool {
        matches!(self, UciError::UnknownOptionKind { .. })
    }

    pub fn is_config_already_loaded(&self) -> bool {
        matches!(self, UciError::ConfigAlreadyLoaded { .. })
    }

    pub fn is_section_type_mismatch(&self) -> bool {
        matches!(self, UciError::SectionTypeMismatch { .. })
    }

    pub fn is_option_kind_mismatch(&self) -> bool {
        matches!(self, UciError::OptionKindMismatch { .. })
    }
}

/// A lexical or grammatical failure.
///
/// The message is what the scanner or builder reported. When the error was
/// raised while parsing a named input, the label and position of the
/// offending lexeme are prefixed on display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    message: String,
    source_name: Option<String>,
    position: Option<Position>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_name: None,
            position: None,
        }
    }

    /// Attaches the label of the input being parsed
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Attaches the position of the offending lexeme
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_name, &self.position) {
            (Some(name), Some(pos)) => write!(f, "{}:{}: {}", name, pos, self.message),
            (None, Some(pos)) => write!(f, "{}: {}", pos, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

fn find_uci_error<'e>(err: &'e (dyn StdError + 'static)) -> Option<&'e UciError> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(uci) = e.downcast_ref::<UciError>() {
            return Some(uci);
        }
        current = e.source();
    }
    None
}

/// Reports whether `err`, or anything it wraps, is a parse error.
pub fn is_parse_error(err: &(dyn StdError + 'static)) -> bool {
    if find_uci_error(err).is_some_and(UciError::is_parse_error) {
        return true;
    }
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if e.is::<ParseError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Reports whether `err`, or anything it wraps, is an unknown option kind.
pub fn is_unknown_option_kind(err: &(dyn StdError + 'static)) -> bool {
    find_uci_error(err).is_some_and(UciError::is_unknown_option_kind)
}

/// Reports whether `err`, or anything it wraps, is a duplicate load.
pub fn is_config_already_loaded(err: &(dyn StdError + 'static)) -> bool {
    find_uci_error(err).is_some_and(UciError::is_config_already_loaded)
}

/// Reports whether `err`, or anything it wraps, is a section type mismatch.
pub fn is_section_type_mismatch(err: &(dyn StdError + 'static)) -> bool {
    find_uci_error(err).is_some_and(UciError::is_section_type_mismatch)
}

/// Reports whether `err`, or anything it wraps, is an option kind mismatch.
pub fn is_option_kind_mismatch(err: &(dyn StdError + 'static)) -> bool {
    find_uci_error(err).is_some_and(UciError::is_option_kind_mismatch)
}
