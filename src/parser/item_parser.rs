//! `program`, `funcdef`, and `type` — the top-level grammar productions.

use super::Parser;
use crate::error::CompileError;
use crate::symtab::IdProp;
use crate::token::TokenKind;
use crate::valtype::ValType;

impl Parser {
    /// `program = "program" id { funcdef } body .`
    pub(super) fn parse_program(&mut self) -> Result<(), CompileError> {
        log::info!("parsing");

        self.expect(TokenKind::Program)?;
        let class_name = self.expect_id()?;
        self.emitter.set_class_name(&class_name);

        while self.token.kind == TokenKind::Define {
            self.parse_funcdef()?;
        }

        // `main`'s code buffer opens only once every `define` has closed
        // its own — the emitter holds exactly one subroutine buffer at a
        // time and a funcdef's `init_subroutine_codegen` would otherwise
        // clobber `main`'s before it ever got body instructions.
        self.emitter.init_subroutine_codegen("main", vec![], ValType::empty());
        self.parse_body()?;
        self.emitter.gen_1("return");
        self.emitter.close_subroutine_codegen(self.symtab.variables_width());
        log::info!("parsed and emitted class {class_name}");
        Ok(())
    }

    /// `funcdef = "define" id "(" [ type id { "," type id } ] ")" [ "->" type ] body .`
    pub(super) fn parse_funcdef(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Define)?;
        let name_pos = self.pos();
        let name = self.expect_id()?;
        self.expect(TokenKind::LParen)?;

        let mut params: Vec<(ValType, String)> = Vec::new();
        if Self::is_type_token(self.token.kind) {
            params.push(self.parse_param()?);
            while self.token.kind == TokenKind::Comma {
                self.advance()?;
                params.push(self.parse_param()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = if self.token.kind == TokenKind::Arrow {
            self.advance()?;
            self.parse_type()?
        } else {
            ValType::empty()
        };

        let param_types: Vec<ValType> = params.iter().map(|(t, _)| *t).collect();
        let prop = IdProp::callable(return_type, param_types.clone());

        if !self.symtab.open_subroutine(name.clone(), prop) {
            return Err(CompileError::MultipleDefinition {
                name,
                pos: name_pos,
            });
        }
        self.return_type = if return_type.base_type().is_empty() {
            None
        } else {
            Some(return_type)
        };

        self.emitter.init_subroutine_codegen(&name, param_types, return_type);
        for (ty, pname) in params {
            let offset = self.symtab.variables_width();
            if !self.symtab.insert(pname.clone(), IdProp::variable(ty, offset)) {
                return Err(CompileError::MultipleDefinition {
                    name: pname,
                    pos: name_pos,
                });
            }
        }

        self.parse_body()?;
        self.emitter.gen_1("return");
        self.emitter.close_subroutine_codegen(self.symtab.variables_width());
        self.symtab.close_subroutine();
        self.return_type = None;
        Ok(())
    }

    fn parse_param(&mut self) -> Result<(ValType, String), CompileError> {
        let ty = self.parse_type()?;
        let id = self.expect_id()?;
        Ok((ty, id))
    }

    fn is_type_token(kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Boolean | TokenKind::Integer)
    }

    /// `type = ("boolean" | "integer") [ "array" ] .`
    pub(super) fn parse_type(&mut self) -> Result<ValType, CompileError> {
        let base = match self.token.kind {
            TokenKind::Boolean => {
                self.advance()?;
                ValType::BOOLEAN
            }
            TokenKind::Integer => {
                self.advance()?;
                ValType::INTEGER
            }
            _ => {
                let mut pos = self.pos();
                pos.col = pos.col.saturating_sub(1);
                return Err(CompileError::Expected {
                    expected: "type".to_string(),
                    found: self.token.describe(),
                    pos,
                });
            }
        };
        if self.token.kind == TokenKind::Array {
            self.advance()?;
            Ok(base.as_array())
        } else {
            Ok(base)
        }
    }
}
