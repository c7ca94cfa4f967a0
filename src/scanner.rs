//! Character stream → token stream.
//!
//! The scanner pulls bytes on demand from an in-memory buffer (the source
//! file is read whole by the driver) and exposes a single `next_token`
//! operation. Line/column bookkeeping, recursive nested-comment skipping,
//! and string/number/identifier lexing all live here; everything downstream
//! only ever sees `Token`s.

use crate::error::CompileError;
use crate::token::{SourcePos, Token, TokenKind, TokenPayload, KEYWORDS};

/// Identifiers longer than this are a lexical error. Not specified by name
/// in the source language, chosen as a generous but finite bound.
pub const MAX_ID_LENGTH: usize = 256;

const INITIAL_STRING_CAPACITY: usize = 1024;

pub struct Scanner {
    bytes: Vec<u8>,
    idx: usize,
    ch: Option<u8>,
    line: u32,
    col: u32,
    pending_newline: bool,
}

impl Scanner {
    pub fn new(source: Vec<u8>) -> Self {
        let mut s = Scanner {
            bytes: source,
            idx: 0,
            ch: None,
            line: 1,
            col: 0,
            pending_newline: false,
        };
        s.next_char();
        s
    }

    /// Reads the next byte and updates line/column by observing that the
    /// *previous* character was a newline: only then does the line advance
    /// and the column reset, after which the column is bumped to account
    /// for the character just read.
    fn next_char(&mut self) {
        self.ch = self.bytes.get(self.idx).copied();
        self.idx += 1;

        if self.pending_newline {
            self.line += 1;
            self.col = 1;
            self.pending_newline = false;
        } else {
            self.col += 1;
        }
        if self.ch == Some(b'\n') {
            self.pending_newline = true;
        }
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(self.line, self.col)
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace();
        let pos = self.pos();

        let Some(c) = self.ch else {
            return Ok(Token::new(TokenKind::Eof, pos, TokenPayload::None));
        };

        if c.is_ascii_alphabetic() || c == b'_' {
            return self.process_word(pos);
        }
        if c.is_ascii_digit() {
            return self.process_number(pos);
        }
        if c == b'"' {
            self.next_char();
            return self.process_string(pos);
        }

        self.process_operator(pos)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.ch {
            if c.is_ascii_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn process_operator(&mut self, pos: SourcePos) -> Result<Token, CompileError> {
        let c = self.ch.unwrap();
        macro_rules! single {
            ($kind:expr) => {{
                self.next_char();
                Ok(Token::new($kind, pos, TokenPayload::None))
            }};
        }

        match c {
            b'=' => single!(TokenKind::Eq),
            b'#' => single!(TokenKind::Ne),
            b'+' => single!(TokenKind::Plus),
            b'*' => single!(TokenKind::Star),
            b'/' => single!(TokenKind::Slash),
            b'%' => single!(TokenKind::Percent),
            b'&' => single!(TokenKind::Ampersand),
            b'[' => single!(TokenKind::LBracket),
            b']' => single!(TokenKind::RBracket),
            b',' => single!(TokenKind::Comma),
            b')' => single!(TokenKind::RParen),
            b';' => single!(TokenKind::Semicolon),
            b'>' => {
                self.next_char();
                if self.ch == Some(b'=') {
                    self.next_char();
                    Ok(Token::new(TokenKind::Ge, pos, TokenPayload::None))
                } else {
                    Ok(Token::new(TokenKind::Gt, pos, TokenPayload::None))
                }
            }
            b'<' => {
                self.next_char();
                match self.ch {
                    Some(b'=') => {
                        self.next_char();
                        Ok(Token::new(TokenKind::Le, pos, TokenPayload::None))
                    }
                    Some(b'-') => {
                        self.next_char();
                        Ok(Token::new(TokenKind::Gets, pos, TokenPayload::None))
                    }
                    _ => Ok(Token::new(TokenKind::Lt, pos, TokenPayload::None)),
                }
            }
            b'-' => {
                self.next_char();
                if self.ch == Some(b'>') {
                    self.next_char();
                    Ok(Token::new(TokenKind::Arrow, pos, TokenPayload::None))
                } else {
                    Ok(Token::new(TokenKind::Minus, pos, TokenPayload::None))
                }
            }
            b'(' => {
                self.next_char();
                if self.ch == Some(b'*') {
                    self.next_char();
                    self.skip_comment(pos)?;
                    self.next_token()
                } else {
                    Ok(Token::new(TokenKind::LParen, pos, TokenPayload::None))
                }
            }
            other => Err(CompileError::IllegalCharacter {
                ch: other as char,
                code: other,
                pos,
            }),
        }
    }

    /// Nested comments are skipped recursively, not by a depth counter: a
    /// counter alone cannot tell `*)(*` apart in a way that lets an
    /// "unclosed comment" error point back at the outermost `(*`, since the
    /// outer position is simply the call argument that every recursive
    /// invocation shares.
    fn skip_comment(&mut self, outer_pos: SourcePos) -> Result<(), CompileError> {
        loop {
            match self.ch {
                None => return Err(CompileError::CommentNotClosed { pos: outer_pos }),
                Some(b'(') => {
                    self.next_char();
                    if self.ch == Some(b'*') {
                        self.next_char();
                        self.skip_comment(outer_pos)?;
                    }
                }
                Some(b'*') => {
                    self.next_char();
                    if self.ch == Some(b')') {
                        self.next_char();
                        return Ok(());
                    }
                }
                Some(_) => self.next_char(),
            }
        }
    }

    fn process_string(&mut self, pos: SourcePos) -> Result<Token, CompileError> {
        let mut buf = String::with_capacity(INITIAL_STRING_CAPACITY);
        loop {
            let Some(c) = self.ch else {
                return Err(CompileError::StringNotClosed { pos });
            };
            if c == b'"' {
                self.next_char();
                break;
            }
            if c < 32 {
                return Err(CompileError::NonPrintableInString {
                    code: c,
                    pos: self.pos(),
                });
            }
            if c == b'\\' {
                let escape_pos = self.pos();
                buf.push('\\');
                self.next_char();
                match self.ch {
                    Some(e @ (b'n' | b't' | b'"' | b'\\')) => {
                        buf.push(e as char);
                        self.next_char();
                    }
                    Some(e) => {
                        return Err(CompileError::IllegalEscape {
                            ch: e as char,
                            pos: escape_pos,
                        });
                    }
                    None => return Err(CompileError::StringNotClosed { pos }),
                }
                continue;
            }
            buf.push(c as char);
            self.next_char();
        }
        Ok(Token::new(TokenKind::Str, pos, TokenPayload::Str(buf)))
    }

    fn process_number(&mut self, pos: SourcePos) -> Result<Token, CompileError> {
        let mut value: i64 = 0;
        while let Some(c) = self.ch {
            if !c.is_ascii_digit() {
                break;
            }
            value = value * 10 + (c - b'0') as i64;
            if value > i32::MAX as i64 {
                return Err(CompileError::NumberTooLarge { pos });
            }
            self.next_char();
        }
        Ok(Token::new(TokenKind::Num, pos, TokenPayload::Num(value as i32)))
    }

    fn process_word(&mut self, pos: SourcePos) -> Result<Token, CompileError> {
        let mut lexeme = String::new();
        while let Some(c) = self.ch {
            if c.is_ascii_alphanumeric() || c == b'_' {
                lexeme.push(c as char);
                self.next_char();
                if lexeme.len() > MAX_ID_LENGTH {
                    return Err(CompileError::IdentifierTooLong { pos });
                }
            } else {
                break;
            }
        }

        if let Ok(i) = KEYWORDS.binary_search_by_key(&lexeme.as_str(), |(w, _)| w) {
            Ok(Token::new(KEYWORDS[i].1, pos, TokenPayload::None))
        } else {
            Ok(Token::new(TokenKind::Id, pos, TokenPayload::Id(lexeme)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut sc = Scanner::new(src.as_bytes().to_vec());
        let mut out = Vec::new();
        loop {
            let tok = sc.next_token().unwrap();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn keywords_and_identifiers() {
        let t = tokens("program foo begin end");
        assert_eq!(
            t,
            vec![
                TokenKind::Program,
                TokenKind::Id,
                TokenKind::Begin,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        let t = tokens("<= >= <- ->");
        assert_eq!(
            t,
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Gets,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_literal() {
        let mut sc = Scanner::new(b"42".to_vec());
        let tok = sc.next_token().unwrap();
        assert_eq!(tok.payload, TokenPayload::Num(42));
    }

    #[test]
    fn number_overflow_reports_at_start() {
        let mut sc = Scanner::new(b"9999999999".to_vec());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::NumberTooLarge { .. }));
        assert_eq!(err.pos(), SourcePos::new(1, 1));
    }

    #[test]
    fn string_literal_with_escapes() {
        let mut sc = Scanner::new(br#""hi\n\tthere""#.to_vec());
        let tok = sc.next_token().unwrap();
        assert_eq!(tok.payload, TokenPayload::Str("hi\\n\\tthere".to_string()));
    }

    #[test]
    fn illegal_escape_code() {
        let mut sc = Scanner::new(br#""bad \q escape""#.to_vec());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::IllegalEscape { ch: 'q', .. }));
    }

    #[test]
    fn unclosed_string() {
        let mut sc = Scanner::new(b"\"never closed".to_vec());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::StringNotClosed { .. }));
    }

    #[test]
    fn nested_comment_skipped() {
        let t = tokens("(* outer (* inner *) still outer *) chill");
        assert_eq!(t, vec![TokenKind::Chill, TokenKind::Eof]);
    }

    #[test]
    fn unclosed_nested_comment_reports_outermost_position() {
        let mut sc = Scanner::new(b"(* outer (* inner *) chill".to_vec());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::CommentNotClosed { .. }));
        assert_eq!(err.pos(), SourcePos::new(1, 1));
    }

    #[test]
    fn illegal_character() {
        let mut sc = Scanner::new(b"@".to_vec());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::IllegalCharacter { ch: '@', .. }));
    }

    #[test]
    fn identifier_too_long() {
        let long = "x".repeat(MAX_ID_LENGTH + 1);
        let mut sc = Scanner::new(long.into_bytes());
        let err = sc.next_token().unwrap_err();
        assert!(matches!(err, CompileError::IdentifierTooLong { .. }));
    }

    #[test]
    fn scanner_round_trip_preserves_lexemes_modulo_whitespace() {
        let src = "program  P\n begin\tx <- 1 ; write x end";
        let mut sc = Scanner::new(src.as_bytes().to_vec());
        let mut rebuilt = Vec::new();
        loop {
            let tok = sc.next_token().unwrap();
            if tok.kind == TokenKind::Eof {
                break;
            }
            match tok.payload {
                TokenPayload::Id(s) => rebuilt.push(s),
                TokenPayload::Num(n) => rebuilt.push(n.to_string()),
                TokenPayload::Str(s) => rebuilt.push(s),
                TokenPayload::None => rebuilt.push(tok.kind.to_string()),
            }
        }
        assert_eq!(
            rebuilt,
            vec!["program", "P", "begin", "x", "<-", "1", ";", "write", "x", "end"]
        );
    }
}
