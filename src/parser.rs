//! Statement aggregation
//!
//! Regroups the scanner's lexemes into one [`Token`] per keyword occurrence.
//! The keyword lexeme itself is dropped and the lexemes that followed it are
//! kept in order. Error and end lexemes pass through as singleton
//! statements. No semantic validation happens here.

use crate::lexer::{Item, ItemKind, Scanner, scan};
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::iter::FusedIterator;
use tracing::trace;

/// Kind of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Error,
    End,
    /// `package <string>`
    Package,
    /// `Config <ident> [<string>]`
    Section,
    /// `option <ident> <string>`
    Option,
    /// `list <ident> <string>`
    List,
}

impl TokenKind {
    /// Builds a statement from fixture items
    pub fn mk<'a>(self, items: impl IntoIterator<Item = Item<'a>>) -> Token<'a> {
        Token {
            kind: self,
            items: items.into_iter().collect(),
        }
    }

    fn for_keyword(kind: ItemKind) -> Option<Self> {
        match kind {
            ItemKind::Package => Some(TokenKind::Package),
            ItemKind::Config => Some(TokenKind::Section),
            ItemKind::Option => Some(TokenKind::Option),
            ItemKind::List => Some(TokenKind::List),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Error => "error",
            TokenKind::End => "eof",
            TokenKind::Package => "package",
            TokenKind::Section => "Config",
            TokenKind::Option => "option",
            TokenKind::List => "list",
        })
    }
}

/// Lexemes following a keyword; no statement carries more than two
pub type TokenItems<'a> = SmallVec<[Item<'a>; 2]>;

/// A statement: its kind and the lexemes that followed the keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub items: TokenItems<'a>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            items: SmallVec::new(),
        }
    }

    fn singleton(kind: TokenKind, item: Item<'a>) -> Self {
        let mut token = Self::new(kind);
        token.items.push(item);
        token
    }

    /// Whether the statement has every operand its keyword requires
    pub fn is_complete(&self) -> bool {
        let n = self.items.len();
        match self.kind {
            TokenKind::Package => n == 1,
            TokenKind::Section => n == 1 || n == 2,
            TokenKind::Option | TokenKind::List => n == 2,
            TokenKind::Error | TokenKind::End => true,
        }
    }

    /// Byte offset of the first lexeme, if known
    pub fn pos(&self) -> Option<usize> {
        self.items.first().and_then(|item| item.pos)
    }

    /// Value of the `idx`-th lexeme
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.items.get(idx).map(|item| item.value.as_ref())
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind)?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("]")
    }
}

/// Lazy statement sequence over a lexeme sequence
#[derive(Debug, Clone)]
pub struct Statements<'a, I> {
    items: I,
    pending: Option<Token<'a>>,
    queued: Option<Token<'a>>,
    done: bool,
}

impl<'a, I> Statements<'a, I>
where
    I: Iterator<Item = Item<'a>>,
{
    pub fn new(items: I) -> Self {
        Self {
            items,
            pending: None,
            queued: None,
            done: false,
        }
    }

    /// Ends the sequence with `last`, flushing the pending statement first
    /// when `flush` accepts it.
    fn finish(&mut self, last: Token<'a>, flush: fn(&Token<'a>) -> bool) -> Option<Token<'a>> {
        self.done = true;
        match self.pending.take().filter(flush) {
            Some(pending) => {
                self.queued = Some(last);
                Some(pending)
            }
            None => Some(last),
        }
    }

    fn pull(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.queued.take() {
            return Some(token);
        }
        if self.done {
            return None;
        }

        loop {
            let Some(item) = self.items.next() else {
                self.done = true;
                return self.pending.take();
            };

            match item.kind {
                ItemKind::Begin => {}
                ItemKind::End => {
                    return self.finish(Token::singleton(TokenKind::End, item), |_| true);
                }
                ItemKind::Error => {
                    // incomplete statements never reach the builder
                    return self.finish(Token::singleton(TokenKind::Error, item), Token::is_complete);
                }
                ItemKind::Ident | ItemKind::String => match self.pending.as_mut() {
                    Some(token) => token.items.push(item),
                    None => {
                        let message = format!("unexpected {} outside of a statement", item.kind);
                        let error = Item {
                            kind: ItemKind::Error,
                            value: message.into(),
                            pos: item.pos,
                        };
                        return self.finish(Token::singleton(TokenKind::Error, error), |_| false);
                    }
                },
                keyword => {
                    if let Some(kind) = TokenKind::for_keyword(keyword)
                        && let Some(previous) = self.pending.replace(Token::new(kind))
                    {
                        return Some(previous);
                    }
                }
            }
        }
    }
}

impl<'a, I> Iterator for Statements<'a, I>
where
    I: Iterator<Item = Item<'a>>,
{
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.pull()?;
        trace!("statement {}", token);
        Some(token)
    }
}

impl<'a, I> FusedIterator for Statements<'a, I> where I: Iterator<Item = Item<'a>> {}

/// Groups an arbitrary lexeme sequence into statements
pub fn aggregate<'a, I>(items: I) -> Statements<'a, I::IntoIter>
where
    I: IntoIterator<Item = Item<'a>>,
{
    Statements::new(items.into_iter())
}

/// Scans `input` and groups the lexemes into statements
pub fn statements<'a>(name: &'a str, input: &'a str) -> Statements<'a, Scanner<'a>> {
    Statements::new(scan(name, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    /// Collects statements, dropping the end marker and lexeme positions
    fn tokens(input: &str) -> Vec<Token<'_>> {
        statements("test", input)
            .filter(|token| token.kind != TokenKind::End)
            .map(|mut token| {
                for item in token.items.iter_mut() {
                    item.pos = None;
                }
                token
            })
            .collect()
    }

    fn ident(v: &str) -> Item<'_> {
        ItemKind::Ident.mk(v)
    }

    fn string(v: &str) -> Item<'_> {
        ItemKind::String.mk(v)
    }

    #[test]
    fn test_empty() {
        assert_eq!(tokens(EMPTY_INPUT_1), vec![]);
        assert_eq!(tokens(EMPTY_INPUT_2), vec![]);

        let all: Vec<_> = statements("test", EMPTY_INPUT_1).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, TokenKind::End);
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            tokens(SIMPLE_INPUT),
            vec![
                TokenKind::Section.mk([ident("sectiontype"), string("sectionname")]),
                TokenKind::Option.mk([ident("optionname"), string("optionvalue")]),
            ]
        );
    }

    #[test]
    fn test_export() {
        assert_eq!(
            tokens(EXPORT_INPUT),
            vec![
                TokenKind::Package.mk([string("pkgname")]),
                TokenKind::Section.mk([ident("empty")]),
                TokenKind::Section.mk([ident("squoted"), string("sqname")]),
                TokenKind::Section.mk([ident("dquoted"), string("dqname")]),
                TokenKind::Section.mk([ident("multiline"), string("line1\\\n\tline2")]),
            ]
        );
    }

    #[test]
    fn test_unquoted() {
        assert_eq!(
            tokens(UNQUOTED_INPUT),
            vec![
                TokenKind::Section.mk([ident("foo"), string("bar")]),
                TokenKind::Option.mk([ident("answer"), string("42")]),
            ]
        );
    }

    #[test]
    fn test_unnamed() {
        let got = tokens(UNNAMED_INPUT);
        assert_eq!(got.len(), 16);
        assert_eq!(got[0], TokenKind::Section.mk([ident("foo"), string("named")]));
        assert_eq!(got[4], TokenKind::Section.mk([ident("foo")]));
        assert_eq!(got[8], TokenKind::Section.mk([ident("foo")]));
        assert_eq!(got[11], TokenKind::List.mk([ident("list"), string("20")]));
        assert_eq!(got[12], TokenKind::Section.mk([ident("foo"), string("named")]));
        assert_eq!(got[13], TokenKind::Option.mk([ident("pos"), string("3")]));
    }

    #[test]
    fn test_hyphenated() {
        assert_eq!(
            tokens(HYPHENATED_INPUT),
            vec![
                TokenKind::Section.mk([ident("wifi-device"), string("wl0")]),
                TokenKind::Option.mk([ident("type"), string("broadcom")]),
                TokenKind::Option.mk([ident("channel"), string("6")]),
                TokenKind::Section.mk([ident("wifi-iface"), string("wifi0")]),
                TokenKind::Option.mk([ident("device"), string("wl0")]),
                TokenKind::Option.mk([ident("mode"), string("ap")]),
            ]
        );
    }

    #[test]
    fn test_commented() {
        assert_eq!(
            tokens(COMMENT_INPUT),
            vec![
                TokenKind::Section.mk([ident("foo")]),
                TokenKind::Option.mk([ident("opt1"), string("1")]),
                TokenKind::Option.mk([ident("opt2"), string("3")]),
                TokenKind::Option.mk([ident("opt3"), string("hello")]),
            ]
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            tokens(INVALID_INPUT),
            vec![TokenKind::Error.mk([ItemKind::Error.mk(
                "expected keyword (package, Config, option, list) or eof, got \"<?xml vers…\""
            )])]
        );
    }

    #[test]
    fn test_incomplete_package_is_dropped() {
        assert_eq!(
            tokens(INCOMPLETE_PACKAGE),
            vec![TokenKind::Error.mk([ItemKind::Error.mk("incomplete package name")])]
        );
    }

    #[test]
    fn test_unterminated_quoted() {
        assert_eq!(
            tokens(UNTERMINATED_QUOTED),
            vec![
                TokenKind::Section.mk([ident("foo")]),
                TokenKind::Error.mk([ItemKind::Error.mk("unterminated quoted string")]),
            ]
        );
    }

    #[test]
    fn test_unterminated_unquoted() {
        assert_eq!(
            tokens(UNTERMINATED_UNQUOTED),
            vec![
                TokenKind::Section.mk([ident("foo")]),
                TokenKind::Error.mk([ItemKind::Error.mk("unterminated unquoted string")]),
            ]
        );
    }

    #[test]
    fn test_nothing_after_error() {
        let mut stmts = statements("test", UNTERMINATED_QUOTED);
        assert_eq!(stmts.next().map(|t| t.kind), Some(TokenKind::Section));
        assert_eq!(stmts.next().map(|t| t.kind), Some(TokenKind::Error));
        assert_eq!(stmts.next(), None);
        assert_eq!(stmts.next(), None);
    }

    #[test]
    fn test_aggregate_fixture_items() {
        let items = vec![
            ItemKind::Begin.mk(""),
            ItemKind::Option.mk("option"),
            ident("a"),
            string("b"),
            ItemKind::End.mk(""),
        ];
        let got: Vec<_> = aggregate(items).collect();
        assert_eq!(
            got,
            vec![
                TokenKind::Option.mk([ident("a"), string("b")]),
                TokenKind::End.mk([ItemKind::End.mk("")]),
            ]
        );
    }

    #[test]
    fn test_stray_operand_is_an_error() {
        let got: Vec<_> = aggregate(vec![ident("oops"), ItemKind::End.mk("")]).collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].kind, TokenKind::Error);
        assert_eq!(got[0].value(0), Some("unexpected Ident outside of a statement"));
    }

    #[test]
    fn test_token_display() {
        let token = TokenKind::Section.mk([ident("foo"), string("bar")]);
        assert_eq!(token.to_string(), "Config[(Ident \"foo\") (String \"bar\")]");
        assert!(token.is_complete());
        assert!(!TokenKind::Option.mk([ident("foo")]).is_complete());
    }
}
