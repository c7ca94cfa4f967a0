//! `expr`, `simple`, `term`, `factor`, `arglist`, and array indexing — the
//! expression grammar, with type checking and instruction emission woven
//! into the same descent.

use super::Parser;
use crate::error::CompileError;
use crate::symtab::IdProp;
use crate::token::{TokenKind, TokenPayload};
use crate::valtype::ValType;

impl Parser {
    /// `expr = simple [ relop simple ] .`
    pub(super) fn parse_expr(&mut self) -> Result<ValType, CompileError> {
        let ty = self.parse_simple()?;
        if !Self::is_relop(self.token.kind) {
            return Ok(ty);
        }
        let op = self.token.kind;
        self.advance()?;
        let pos = self.pos();
        let rty = self.parse_simple()?;
        self.check_types(rty, ty, pos, "for relational operator")?;

        let jump_op = match op {
            TokenKind::Eq => "if_icmpeq",
            TokenKind::Ne => "if_icmpne",
            TokenKind::Ge => "if_icmpge",
            TokenKind::Gt => "if_icmpgt",
            TokenKind::Le => "if_icmple",
            TokenKind::Lt => "if_icmplt",
            _ => unreachable!("is_relop guards this match"),
        };
        // A relop yields a genuine boolean VALUE (not just a branch): push
        // 1 or 0 depending on the comparison, so the result can feed any
        // context an ordinary boolean expression can (assignment, guard,
        // argument, ...).
        let true_label = self.emitter.new_label();
        let end_label = self.emitter.new_label();
        self.emitter.emit_jump(jump_op, true_label);
        self.emitter.gen_2("ldc", 0);
        self.emitter.emit_jump("goto", end_label);
        self.emitter.emit_label(true_label);
        self.emitter.gen_2("ldc", 1);
        self.emitter.emit_label(end_label);
        Ok(ValType::BOOLEAN)
    }

    fn is_relop(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Eq | TokenKind::Ne | TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge
        )
    }

    /// `simple = [ "-" ] term { addop term } .`
    pub(super) fn parse_simple(&mut self) -> Result<ValType, CompileError> {
        let negate = self.token.kind == TokenKind::Minus;
        if negate {
            self.advance()?;
        }
        let ty = self.parse_term()?;
        if negate {
            self.emitter.gen_1("ineg");
        }

        while Self::is_addop(self.token.kind) {
            let op = self.token.kind;
            self.advance()?;
            let pos = self.pos();
            let rty = self.parse_term()?;
            self.check_types(rty, ty, pos, "for binary operator")?;
            match op {
                TokenKind::Plus => self.emitter.gen_1("iadd"),
                TokenKind::Minus => self.emitter.gen_1("isub"),
                TokenKind::Or => self.emitter.gen_1("ior"),
                _ => unreachable!("is_addop guards this match"),
            }
        }
        Ok(ty)
    }

    fn is_addop(kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Plus | TokenKind::Minus | TokenKind::Or)
    }

    /// `term = factor { mulop factor } .`
    pub(super) fn parse_term(&mut self) -> Result<ValType, CompileError> {
        let ty = self.parse_factor()?;
        while Self::is_mulop(self.token.kind) {
            let op = self.token.kind;
            self.advance()?;
            let pos = self.pos();
            let rty = self.parse_factor()?;
            self.check_types(rty, ty, pos, "for binary operator")?;
            match op {
                TokenKind::Star => self.emitter.gen_1("imul"),
                TokenKind::Slash => self.emitter.gen_1("idiv"),
                TokenKind::Percent | TokenKind::Mod => self.emitter.gen_1("irem"),
                TokenKind::And => self.emitter.gen_1("iand"),
                _ => unreachable!("is_mulop guards this match"),
            }
        }
        Ok(ty)
    }

    fn is_mulop(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::Mod | TokenKind::And
        )
    }

    /// `factor = id [ arglist | "[" simple "]" ] | num | "(" expr ")" | "not" factor | "true" | "false" .`
    pub(super) fn parse_factor(&mut self) -> Result<ValType, CompileError> {
        match self.token.kind {
            TokenKind::Id => {
                let pos = self.pos();
                let name = self.expect_id()?;
                let prop = self
                    .symtab
                    .find(&name)
                    .cloned()
                    .ok_or_else(|| CompileError::UnknownIdentifier { name: name.clone(), pos })?;

                if self.token.kind == TokenKind::LParen {
                    self.parse_arglist(&name, &prop)?;
                    let ret = prop.ty.as_return_type();
                    self.emitter.gen_call(&name, &prop.params, ret);
                    Ok(ret)
                } else if self.token.kind == TokenKind::LBracket {
                    self.emitter.gen_2("aload", prop.offset);
                    self.parse_index(&name)?;
                    self.emitter.gen_1("iaload");
                    Ok(prop.ty.base_type())
                } else {
                    self.emitter.gen_2("iload", prop.offset);
                    Ok(prop.ty)
                }
            }
            TokenKind::LParen => {
                self.advance()?;
                let ty = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(ty)
            }
            TokenKind::Num => {
                let value = match self.token.payload {
                    TokenPayload::Num(n) => n,
                    _ => unreachable!("TokenKind::Num always carries TokenPayload::Num"),
                };
                self.emitter.gen_2("ldc", value);
                self.advance()?;
                Ok(ValType::INTEGER)
            }
            TokenKind::Not => {
                self.advance()?;
                let pos = self.pos();
                let ty = self.parse_factor()?;
                self.check_types(ty, ValType::BOOLEAN, pos, "for 'not' operand")?;
                self.emitter.gen_2("ixor", 1);
                Ok(ValType::BOOLEAN)
            }
            TokenKind::True => {
                self.advance()?;
                self.emitter.gen_2("ldc", 1);
                Ok(ValType::BOOLEAN)
            }
            TokenKind::False => {
                self.advance()?;
                self.emitter.gen_2("ldc", 0);
                Ok(ValType::BOOLEAN)
            }
            _ => {
                let mut pos = self.pos();
                pos.col = pos.col.saturating_sub(1);
                Err(CompileError::Expected {
                    expected: "factor".to_string(),
                    found: self.token.describe(),
                    pos,
                })
            }
        }
    }

    /// `arglist = "(" [ expr { "," expr } ] ")" .`
    pub(super) fn parse_arglist(&mut self, name: &str, prop: &IdProp) -> Result<(), CompileError> {
        self.expect(TokenKind::LParen)?;
        let mut i = 0usize;
        if Self::starts_expr(self.token.kind) {
            self.parse_arg(name, prop, i)?;
            i += 1;
            while self.token.kind == TokenKind::Comma {
                self.advance()?;
                self.parse_arg(name, prop, i)?;
                i += 1;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    fn parse_arg(&mut self, name: &str, prop: &IdProp, index: usize) -> Result<(), CompileError> {
        let pos = self.pos();
        let ty = self.parse_expr()?;
        if let Some(expected) = prop.params.get(index).copied() {
            self.check_types(ty, expected, pos, format!("for argument {} of '{name}'", index + 1))?;
        }
        Ok(())
    }

    /// Array index: `"[" simple "]"`, type-checked against `integer` and
    /// left on the stack for the caller's load/store instruction.
    pub(super) fn parse_index(&mut self, id: &str) -> Result<(), CompileError> {
        self.expect(TokenKind::LBracket)?;
        let pos = self.pos();
        let ty = self.parse_simple()?;
        self.check_types(ty, ValType::INTEGER, pos, format!("for array index of '{id}'"))?;
        self.expect(TokenKind::RBracket)?;
        Ok(())
    }
}
