//! Character-level scanner for UCI text
//!
//! The scanner is an explicit state machine. [`transition`] is a pure
//! function from `(state, input, position)` to the next state, an optional
//! lexeme and the new position; [`Scanner`] drives it lazily as an iterator,
//! so a consumer that stops pulling stops all scanning work.
//!
//! A scan always begins with one [`ItemKind::Begin`] lexeme and ends with
//! exactly one [`ItemKind::End`] or [`ItemKind::Error`] lexeme.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use tracing::trace;

/// Maximum number of characters of remaining input quoted in diagnostics
const PREVIEW_LEN: usize = 10;

/// Values longer than this are shortened when an item is displayed
const DISPLAY_LEN: usize = 25;

/// Kind of a lexed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    /// Scanning failed; the item value is the error message
    Error,
    /// Start of input
    Begin,
    /// End of input
    End,
    /// `package` keyword
    Package,
    /// `Config` keyword
    Config,
    /// `option` keyword
    Option,
    /// `list` keyword
    List,
    /// Section type or option name
    Ident,
    /// Quoted or bare value
    String,
}

impl ItemKind {
    /// Builds a position-less item, as used in test fixtures
    pub fn mk(self, value: &str) -> Item<'_> {
        Item {
            kind: self,
            value: Cow::Borrowed(value),
            pos: None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemKind::Error => "Error",
            ItemKind::Begin => "BOF",
            ItemKind::End => "EOF",
            ItemKind::Package => "Package",
            ItemKind::Config => "Config",
            ItemKind::Option => "Option",
            ItemKind::List => "List",
            ItemKind::Ident => "Ident",
            ItemKind::String => "String",
        })
    }
}

/// A lexeme with the byte offset where it starts.
///
/// Keyword, identifier and string values borrow from the input. Quoted
/// strings hold the raw text between the quotes; nothing is unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item<'a> {
    pub kind: ItemKind,
    pub value: Cow<'a, str>,
    /// Byte offset into the input, `None` for synthetic items
    pub pos: Option<usize>,
}

impl<'a> Item<'a> {
    pub fn new(kind: ItemKind, value: impl Into<Cow<'a, str>>, pos: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            pos: Some(pos),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ItemKind::Error
    }
}

impl fmt::Display for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shortened = if self.kind != ItemKind::Error {
            self.value
                .char_indices()
                .nth(DISPLAY_LEN)
                .map(|(idx, _)| &self.value[..idx])
        } else {
            None
        };

        write!(f, "({} ", self.kind)?;
        match shortened {
            Some(head) => write!(f, "{:?}...", head)?,
            None => write!(f, "{:?}", self.value)?,
        }
        if let Some(pos) = self.pos {
            write!(f, " {}", pos)?;
        }
        f.write_str(")")
    }
}

/// Line-leading keywords of the UCI language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Package,
    Config,
    Option,
    List,
}

impl Keyword {
    pub const ALL: [Keyword; 4] = [
        Keyword::Package,
        Keyword::Config,
        Keyword::Option,
        Keyword::List,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Package => "package",
            Keyword::Config => "Config",
            Keyword::Option => "option",
            Keyword::List => "list",
        }
    }

    pub fn item_kind(self) -> ItemKind {
        match self {
            Keyword::Package => ItemKind::Package,
            Keyword::Config => ItemKind::Config,
            Keyword::Option => ItemKind::Option,
            Keyword::List => ItemKind::List,
        }
    }

    /// State entered right after the keyword
    fn follow_state(self) -> ScanState {
        match self {
            Keyword::Package => ScanState::Value(Slot::PackageName),
            Keyword::Config => ScanState::Ident(Slot::SectionType),
            Keyword::Option => ScanState::Ident(Slot::OptionName),
            Keyword::List => ScanState::Ident(Slot::ListName),
        }
    }
}

/// The operand a state is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    PackageName,
    SectionType,
    SectionName,
    OptionName,
    OptionValue,
    ListName,
    ListValue,
}

impl Slot {
    fn describe(self) -> &'static str {
        match self {
            Slot::PackageName => "package name",
            Slot::SectionType => "section type",
            Slot::SectionName => "section name",
            Slot::OptionName => "option name",
            Slot::OptionValue => "option value",
            Slot::ListName => "list name",
            Slot::ListValue => "list value",
        }
    }

    /// State entered after this slot's identifier
    fn after_ident(self) -> ScanState {
        match self {
            Slot::SectionType => ScanState::OptionalValue(Slot::SectionName),
            Slot::OptionName => ScanState::Value(Slot::OptionValue),
            Slot::ListName => ScanState::Value(Slot::ListValue),
            _ => ScanState::LineEnd,
        }
    }
}

/// Scanner states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing emitted yet
    Begin,
    /// At the start of a line, expecting a keyword or end of input
    LineStart,
    /// Expecting an identifier
    Ident(Slot),
    /// Expecting a required value
    Value(Slot),
    /// A value may follow before the end of the line
    OptionalValue(Slot),
    /// Statement complete; only whitespace or a comment may follow
    LineEnd,
    /// An end or error item was emitted
    Done,
}

/// Result of a single [`transition`] step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<'a> {
    pub next: ScanState,
    pub item: Option<Item<'a>>,
    pub pos: usize,
}

impl<'a> Transition<'a> {
    fn emit(next: ScanState, item: Item<'a>, pos: usize) -> Self {
        Self {
            next,
            item: Some(item),
            pos,
        }
    }

    fn silent(next: ScanState, pos: usize) -> Self {
        Self {
            next,
            item: None,
            pos,
        }
    }

    fn fail(message: impl Into<Cow<'a, str>>, pos: usize) -> Self {
        Self::emit(ScanState::Done, Item::new(ItemKind::Error, message, pos), pos)
    }
}

/// Performs one step of the scanner state machine.
pub fn transition(state: ScanState, input: &str, pos: usize) -> Transition<'_> {
    match state {
        ScanState::Begin => Transition::emit(
            ScanState::LineStart,
            Item::new(ItemKind::Begin, "", pos),
            pos,
        ),
        ScanState::LineStart => scan_line_start(input, pos),
        ScanState::Ident(slot) => scan_ident(input, pos, slot),
        ScanState::Value(slot) => scan_value(input, pos, slot, true),
        ScanState::OptionalValue(slot) => scan_value(input, pos, slot, false),
        ScanState::LineEnd => scan_line_end(input, pos),
        ScanState::Done => Transition::silent(ScanState::Done, pos),
    }
}

fn scan_line_start(input: &str, mut pos: usize) -> Transition<'_> {
    let bytes = input.as_bytes();
    loop {
        match bytes.get(pos) {
            Some(b) if b.is_ascii_whitespace() => pos += 1,
            Some(b'#') => pos = skip_comment(bytes, pos),
            Some(_) => break,
            None => {
                return Transition::emit(ScanState::Done, Item::new(ItemKind::End, "", pos), pos);
            }
        }
    }

    let rest = &input[pos..];
    for keyword in Keyword::ALL {
        let word = keyword.as_str();
        if rest.starts_with(word) && is_boundary(bytes.get(pos + word.len()).copied()) {
            let end = pos + word.len();
            return Transition::emit(
                keyword.follow_state(),
                Item::new(keyword.item_kind(), &input[pos..end], pos),
                end,
            );
        }
    }

    Transition::fail(
        format!(
            "expected keyword (package, Config, option, list) or eof, got {}",
            preview(rest)
        ),
        pos,
    )
}

fn scan_ident(input: &str, pos: usize, slot: Slot) -> Transition<'_> {
    let bytes = input.as_bytes();
    let start = skip_inline_space(bytes, pos);
    if at_line_end(bytes, start) {
        return Transition::fail(format!("incomplete {}", slot.describe()), start);
    }

    let mut end = start;
    while bytes.get(end).is_some_and(|&b| is_ident_byte(b)) {
        end += 1;
    }

    if end == start {
        return Transition::fail(
            format!("expected {}, got {}", slot.describe(), preview(&input[start..])),
            start,
        );
    }
    if !is_boundary(bytes.get(end).copied()) {
        let ch = input[end..].chars().next().unwrap_or_default();
        return Transition::fail(format!("invalid character {:?} in identifier", ch), end);
    }

    Transition::emit(
        slot.after_ident(),
        Item::new(ItemKind::Ident, &input[start..end], start),
        end,
    )
}

fn scan_value(input: &str, pos: usize, slot: Slot, required: bool) -> Transition<'_> {
    let bytes = input.as_bytes();
    let start = skip_inline_space(bytes, pos);
    if at_line_end(bytes, start) {
        if required {
            return Transition::fail(format!("incomplete {}", slot.describe()), start);
        }
        return Transition::silent(ScanState::LineEnd, start);
    }

    let scanned = match bytes[start] {
        quote @ (b'\'' | b'"') => scan_quoted(bytes, start, quote),
        _ => scan_unquoted(bytes, start),
    };
    match scanned {
        Ok((from, to, next)) => Transition::emit(
            ScanState::LineEnd,
            Item::new(ItemKind::String, &input[from..to], start),
            next,
        ),
        Err((message, at)) => Transition::fail(message, at),
    }
}

fn scan_line_end(input: &str, pos: usize) -> Transition<'_> {
    let bytes = input.as_bytes();
    let mut pos = skip_inline_space(bytes, pos);
    if bytes.get(pos) == Some(&b'#') {
        pos = skip_comment(bytes, pos);
    }
    match bytes.get(pos) {
        Some(b'\n') => Transition::silent(ScanState::LineStart, pos + 1),
        None => Transition::silent(ScanState::LineStart, pos),
        Some(_) => Transition::fail(
            format!("expected end of line, got {}", preview(&input[pos..])),
            pos,
        ),
    }
}

/// Scans a quoted string starting at the opening quote.
///
/// Returns the value bounds and the position after the closing quote. A
/// backslash always pairs with the following byte, so an escaped quote does
/// not terminate the string and backslash-newline stays in the value.
fn scan_quoted(
    bytes: &[u8],
    start: usize,
    quote: u8,
) -> Result<(usize, usize, usize), (&'static str, usize)> {
    let mut i = start + 1;
    while let Some(&b) = bytes.get(i) {
        if b == quote {
            return Ok((start + 1, i, i + 1));
        }
        i += if b == b'\\' { 2 } else { 1 };
    }
    Err(("unterminated quoted string", start))
}

fn scan_unquoted(bytes: &[u8], start: usize) -> Result<(usize, usize, usize), (&'static str, usize)> {
    let mut i = start;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'\\' => match bytes.get(i + 1) {
                None => return Err(("unterminated unquoted string", i)),
                Some(b'\n') => {
                    // the continuation line's indentation stays in the value
                    i = skip_inline_space(bytes, i + 2);
                    if i >= bytes.len() {
                        return Err(("unterminated unquoted string", i));
                    }
                }
                Some(_) => i += 2,
            },
            b'#' => break,
            _ if b.is_ascii_whitespace() => break,
            _ => i += 1,
        }
    }
    Ok((start, i, i))
}

fn skip_inline_space(bytes: &[u8], mut pos: usize) -> usize {
    while bytes
        .get(pos)
        .is_some_and(|&b| b != b'\n' && b.is_ascii_whitespace())
    {
        pos += 1;
    }
    pos
}

/// Skips from a `#` up to, not including, the next newline
fn skip_comment(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |n| pos + n)
}

fn at_line_end(bytes: &[u8], pos: usize) -> bool {
    matches!(bytes.get(pos), None | Some(b'\n') | Some(b'#'))
}

fn is_boundary(b: Option<u8>) -> bool {
    match b {
        None | Some(b'#') => true,
        Some(b) => b.is_ascii_whitespace(),
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Quotes at most [`PREVIEW_LEN`] characters of `rest`, marking truncation with `…`
fn preview(rest: &str) -> String {
    match rest.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => format!("{:?}", format!("{}…", &rest[..idx])),
        None => format!("{:?}", rest),
    }
}

/// Lazy lexeme sequence over an input buffer
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    name: &'a str,
    input: &'a str,
    state: ScanState,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner; `name` only labels trace output
    pub fn new(name: &'a str, input: &'a str) -> Self {
        Self {
            name,
            input,
            state: ScanState::Begin,
            pos: 0,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Current byte offset of the cursor
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Item<'a>;

    fn next(&mut self) -> Option<Item<'a>> {
        while self.state != ScanState::Done {
            let step = transition(self.state, self.input, self.pos);
            self.state = step.next;
            self.pos = step.pos;
            if let Some(item) = step.item {
                trace!(name = self.name, "lexed {}", item);
                return Some(item);
            }
        }
        None
    }
}

impl FusedIterator for Scanner<'_> {}

/// Starts scanning `input`; `name` only labels diagnostics.
pub fn scan<'a>(name: &'a str, input: &'a str) -> Scanner<'a> {
    Scanner::new(name, input)
}
