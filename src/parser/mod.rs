//! Recursive-descent parser with integrated type checking and code
//! emission: the parser consumes tokens on demand, checks every
//! expression's type as it is built, and drives the emitter in the same
//! pass. There is no separate AST.
//!
//! The grammar is split across sibling modules the way the rules group
//! naturally:
//! - [`item_parser`] — `program`, `funcdef`, `type`
//! - [`statement_parser`] — `body`, `vardef`, `statements`, and each statement kind
//! - [`expression_parser`] — `expr`, `simple`, `term`, `factor`, `arglist`, array index

mod expression_parser;
mod item_parser;
mod statement_parser;

use crate::emit::Emitter;
use crate::error::CompileError;
use crate::scanner::Scanner;
use crate::symtab::SymbolTable;
use crate::token::{SourcePos, Token, TokenKind};
use crate::valtype::ValType;

/// Threads the scanner, its one lookahead token, the symbol table, and the
/// emitter through every parse function — the explicit owner that replaces
/// the distilled source's file-scope globals.
pub struct Parser {
    scanner: Scanner,
    token: Token,
    symtab: SymbolTable,
    emitter: Emitter,
    /// The declared return type of the subroutine currently being parsed;
    /// `None` while inside `main`, which has no return type to check `exit`
    /// expressions against.
    return_type: Option<ValType>,
}

impl Parser {
    pub fn new(source: Vec<u8>) -> Result<Self, CompileError> {
        let mut scanner = Scanner::new(source);
        let token = scanner.next_token()?;
        Ok(Parser {
            scanner,
            token,
            symtab: SymbolTable::new(),
            emitter: Emitter::new(),
            return_type: None,
        })
    }

    pub fn into_emitter(self) -> Emitter {
        self.emitter
    }

    fn pos(&self) -> SourcePos {
        self.token.pos
    }

    fn advance(&mut self) -> Result<(), CompileError> {
        self.token = self.scanner.next_token()?;
        log::debug!("token: {:?} at {}", self.token.kind, self.token.pos);
        Ok(())
    }

    /// Consumes the lookahead if it matches `kind`, else raises `Expected`.
    /// Mirrors the original's convention of reporting the error one column
    /// back, at the end of the construct that was expecting `kind`.
    fn expect(&mut self, kind: TokenKind) -> Result<(), CompileError> {
        if self.token.kind == kind {
            self.advance()
        } else {
            let mut pos = self.pos();
            pos.col = pos.col.saturating_sub(1);
            Err(CompileError::Expected {
                expected: format!("'{kind}'"),
                found: self.token.describe(),
                pos,
            })
        }
    }

    /// Consumes an identifier, returning its lexeme (the parser's only
    /// chance to retain it — the scanner's payload does not outlive the
    /// next `next_token` call).
    fn expect_id(&mut self) -> Result<String, CompileError> {
        if self.token.kind == TokenKind::Id {
            let lexeme = match &self.token.payload {
                crate::token::TokenPayload::Id(s) => s.clone(),
                _ => unreachable!("TokenKind::Id always carries TokenPayload::Id"),
            };
            self.advance()?;
            Ok(lexeme)
        } else {
            let mut pos = self.pos();
            pos.col = pos.col.saturating_sub(1);
            Err(CompileError::Expected {
                expected: "identifier".to_string(),
                found: self.token.describe(),
                pos,
            })
        }
    }

    fn check_types(
        &self,
        found: ValType,
        expected: ValType,
        pos: SourcePos,
        context: impl Into<String>,
    ) -> Result<(), CompileError> {
        if found != expected {
            Err(CompileError::IncompatibleTypes {
                expected,
                found,
                context: context.into(),
                pos,
            })
        } else {
            Ok(())
        }
    }

    fn starts_factor(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Id
                | TokenKind::Num
                | TokenKind::LParen
                | TokenKind::Not
                | TokenKind::True
                | TokenKind::False
        )
    }

    fn starts_expr(kind: TokenKind) -> bool {
        Self::starts_factor(kind) || kind == TokenKind::Minus
    }
}

/// Parses and type-checks the whole token stream, emitting Jasmin assembly
/// into the returned [`Emitter`] on success.
pub fn parse(source: Vec<u8>) -> Result<Emitter, CompileError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()?;
    Ok(parser.into_emitter())
}
