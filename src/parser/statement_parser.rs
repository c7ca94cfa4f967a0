//! `body`, `vardef`, `statements`, and the six statement kinds.

use super::Parser;
use crate::error::CompileError;
use crate::symtab::IdProp;
use crate::token::{TokenKind, TokenPayload};
use crate::valtype::ValType;

impl Parser {
    /// `body = "begin" { vardef } statements "end" .`
    pub(super) fn parse_body(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Begin)?;
        while Self::is_type_token_pub(self.token.kind) {
            self.parse_vardef()?;
        }
        self.parse_statements()?;
        self.expect(TokenKind::End)?;
        Ok(())
    }

    fn is_type_token_pub(kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Boolean | TokenKind::Integer)
    }

    /// `vardef = type id { "," id } ";" .`
    pub(super) fn parse_vardef(&mut self) -> Result<(), CompileError> {
        let ty = self.parse_type()?;
        self.parse_vardef_name(ty)?;
        while self.token.kind == TokenKind::Comma {
            self.advance()?;
            self.parse_vardef_name(ty)?;
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn parse_vardef_name(&mut self, ty: ValType) -> Result<(), CompileError> {
        let pos = self.pos();
        let name = self.expect_id()?;
        let offset = self.symtab.variables_width();
        if self.symtab.insert(name.clone(), IdProp::variable(ty, offset)) {
            Ok(())
        } else {
            Err(CompileError::MultipleDefinition { name, pos })
        }
    }

    /// `statements = "chill" | statement { ";" statement } .`
    pub(super) fn parse_statements(&mut self) -> Result<(), CompileError> {
        if Self::is_statement(self.token.kind) {
            self.parse_statement()?;
            while self.token.kind == TokenKind::Semicolon {
                self.advance()?;
                self.parse_statement()?;
            }
            Ok(())
        } else if self.token.kind == TokenKind::Chill {
            self.advance()
        } else {
            let mut pos = self.pos();
            pos.col = pos.col.saturating_sub(1);
            Err(CompileError::Expected {
                expected: "statement".to_string(),
                found: self.token.describe(),
                pos,
            })
        }
    }

    fn is_statement(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Exit
                | TokenKind::If
                | TokenKind::Id
                | TokenKind::Read
                | TokenKind::While
                | TokenKind::Write
        )
    }

    /// `statement = exit | if | name | read | while | write .`
    pub(super) fn parse_statement(&mut self) -> Result<(), CompileError> {
        match self.token.kind {
            TokenKind::Exit => self.parse_exit(),
            TokenKind::If => self.parse_if(),
            TokenKind::Id => self.parse_name(),
            TokenKind::Read => self.parse_read(),
            TokenKind::While => self.parse_while(),
            TokenKind::Write => self.parse_write(),
            _ => {
                let mut pos = self.pos();
                pos.col = pos.col.saturating_sub(1);
                Err(CompileError::Expected {
                    expected: "statement".to_string(),
                    found: self.token.describe(),
                    pos,
                })
            }
        }
    }

    /// `exit = "exit" [ expr ] .`
    pub(super) fn parse_exit(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Exit)?;
        if Self::starts_expr(self.token.kind) {
            let pos = self.pos();
            let ty = self.parse_expr()?;
            if let Some(rt) = self.return_type {
                self.check_types(ty, rt, pos, "for 'exit' expression")?;
            }
            self.emitter.gen_1("ireturn");
        } else {
            self.emitter.gen_1("return");
        }
        Ok(())
    }

    /// `if = "if" expr "then" statements { "elsif" expr "then" statements } [ "else" statements ] "end" .`
    pub(super) fn parse_if(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::If)?;
        let pos = self.pos();
        let ty = self.parse_expr()?;
        self.check_types(ty, ValType::BOOLEAN, pos, "for 'if' guard")?;

        let end_label = self.emitter.new_label();
        let mut next_label = self.emitter.new_label();
        self.emitter.emit_jump("ifeq", next_label);
        self.expect(TokenKind::Then)?;
        self.parse_statements()?;
        self.emitter.emit_jump("goto", end_label);
        self.emitter.emit_label(next_label);

        while self.token.kind == TokenKind::Elsif {
            self.advance()?;
            let pos = self.pos();
            let ty = self.parse_expr()?;
            self.check_types(ty, ValType::BOOLEAN, pos, "for 'elsif' guard")?;
            next_label = self.emitter.new_label();
            self.emitter.emit_jump("ifeq", next_label);
            self.expect(TokenKind::Then)?;
            self.parse_statements()?;
            self.emitter.emit_jump("goto", end_label);
            self.emitter.emit_label(next_label);
        }

        if self.token.kind == TokenKind::Else {
            self.advance()?;
            self.parse_statements()?;
        }
        self.expect(TokenKind::End)?;
        self.emitter.emit_label(end_label);
        Ok(())
    }

    /// `name = id ( arglist | [ "[" simple "]" ] "<-" ( expr | "array" simple ) ) .`
    pub(super) fn parse_name(&mut self) -> Result<(), CompileError> {
        let pos = self.pos();
        let name = self.expect_id()?;
        let prop = self
            .symtab
            .find(&name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownIdentifier { name: name.clone(), pos })?;

        if self.token.kind == TokenKind::LParen {
            self.parse_arglist(&name, &prop)?;
            self.emitter.gen_call(&name, &prop.params, prop.ty.as_return_type());
            if prop.ty.as_return_type().is_empty() {
                return Ok(());
            }
            // A called function used as a bare statement: its result is
            // unused, so drop it back off the operand stack.
            self.emitter.gen_1("pop");
            return Ok(());
        }

        let indexed = self.token.kind == TokenKind::LBracket;
        if indexed {
            self.emitter.gen_2("aload", prop.offset);
            self.parse_index(&name)?;
        } else if self.token.kind != TokenKind::Gets {
            let mut pos = self.pos();
            pos.col = pos.col.saturating_sub(1);
            return Err(CompileError::Expected {
                expected: "argument list or variable assignment".to_string(),
                found: self.token.describe(),
                pos,
            });
        }

        self.expect(TokenKind::Gets)?;

        if Self::starts_expr(self.token.kind) {
            let vpos = self.pos();
            let ty = self.parse_expr()?;
            let expected = if indexed { prop.ty.base_type() } else { prop.ty };
            self.check_types(ty, expected, vpos, format!("for assignment to '{name}'"))?;
            if indexed {
                self.emitter.gen_1("iastore");
            } else {
                self.emitter.gen_2("istore", prop.offset);
            }
        } else if !indexed && self.token.kind == TokenKind::Array {
            self.advance()?;
            let spos = self.pos();
            let ty = self.parse_simple()?;
            self.check_types(ty, ValType::INTEGER, spos, format!("for array size of '{name}'"))?;
            self.emitter.gen_newarray(prop.ty.base_type());
            self.emitter.gen_2("astore", prop.offset);
        } else {
            let mut pos = self.pos();
            if !indexed {
                pos.col = pos.col.saturating_sub(1);
            }
            return Err(CompileError::Expected {
                expected: "array allocation or expression".to_string(),
                found: self.token.describe(),
                pos,
            });
        }
        Ok(())
    }

    /// `read = "read" id [ "[" simple "]" ] .`
    pub(super) fn parse_read(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Read)?;
        let pos = self.pos();
        let name = self.expect_id()?;
        let prop = self
            .symtab
            .find(&name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownIdentifier { name: name.clone(), pos })?;

        if self.token.kind == TokenKind::LBracket {
            self.emitter.gen_2("aload", prop.offset);
            self.parse_index(&name)?;
            self.emitter.gen_read(prop.ty.base_type());
            self.emitter.gen_1("iastore");
        } else {
            self.emitter.gen_read(prop.ty);
            self.emitter.gen_2("istore", prop.offset);
        }
        Ok(())
    }

    /// `while = "while" expr "do" statements "end" .`
    pub(super) fn parse_while(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::While)?;
        let start_label = self.emitter.new_label();
        self.emitter.emit_label(start_label);
        let pos = self.pos();
        let ty = self.parse_expr()?;
        self.check_types(ty, ValType::BOOLEAN, pos, "for 'while' guard")?;
        let end_label = self.emitter.new_label();
        self.emitter.emit_jump("ifeq", end_label);
        self.expect(TokenKind::Do)?;
        self.parse_statements()?;
        self.emitter.emit_jump("goto", start_label);
        self.emitter.emit_label(end_label);
        self.expect(TokenKind::End)?;
        Ok(())
    }

    /// `write = "write" (string | expr) { "&" (string | expr) } .`
    pub(super) fn parse_write(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Write)?;
        self.parse_write_item()?;
        while self.token.kind == TokenKind::Ampersand {
            self.advance()?;
            self.parse_write_item()?;
        }
        Ok(())
    }

    fn parse_write_item(&mut self) -> Result<(), CompileError> {
        if self.token.kind == TokenKind::Str {
            let text = match &self.token.payload {
                TokenPayload::Str(s) => s.clone(),
                _ => unreachable!("TokenKind::Str always carries TokenPayload::Str"),
            };
            self.emitter.gen_print_string(&text);
            self.advance()
        } else if Self::starts_expr(self.token.kind) {
            let ty = self.parse_expr()?;
            self.emitter.gen_print(ty.base_type());
            Ok(())
        } else {
            let mut pos = self.pos();
            pos.col = pos.col.saturating_sub(1);
            Err(CompileError::Expected {
                expected: "expression or string".to_string(),
                found: self.token.describe(),
                pos,
            })
        }
    }
}
