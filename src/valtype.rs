//! `ValType`: the bit-set type lattice for SIMPL-2021 values.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Exactly one of `BOOLEAN`/`INTEGER` is set for any typed entity.
    /// `ARRAY` may combine only with `BOOLEAN` or `INTEGER`. `CALLABLE`
    /// combines with a base type (a function) or with none (a procedure).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValType: u8 {
        const ARRAY    = 0b0001;
        const BOOLEAN  = 0b0010;
        const INTEGER  = 0b0100;
        const CALLABLE = 0b1000;
    }
}

impl ValType {
    const BASE: ValType = ValType::BOOLEAN.union(ValType::INTEGER);

    pub fn base_type(self) -> ValType {
        self & ValType::BASE
    }

    pub fn is_array(self) -> bool {
        self.contains(ValType::ARRAY)
    }

    pub fn is_boolean(self) -> bool {
        self.contains(ValType::BOOLEAN)
    }

    pub fn is_integer(self) -> bool {
        self.contains(ValType::INTEGER)
    }

    pub fn is_callable(self) -> bool {
        self.contains(ValType::CALLABLE)
    }

    /// A variable is a (possibly array) boolean or integer that is not callable.
    pub fn is_variable(self) -> bool {
        !self.is_callable() && !self.base_type().is_empty()
    }

    /// A function is callable with a declared return type.
    pub fn is_function(self) -> bool {
        self.is_callable() && !self.base_type().is_empty()
    }

    /// A procedure is callable with no return type.
    pub fn is_procedure(self) -> bool {
        self.is_callable() && self.base_type().is_empty()
    }

    pub fn as_array(self) -> ValType {
        self | ValType::ARRAY
    }

    pub fn as_callable(self) -> ValType {
        self | ValType::CALLABLE
    }

    /// Strips `CALLABLE`, leaving the return type (or `ValType::empty()` for
    /// a procedure) — used once a call's result has been pushed.
    pub fn as_return_type(self) -> ValType {
        self - ValType::CALLABLE
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = if self.is_boolean() {
            "boolean"
        } else if self.is_integer() {
            "integer"
        } else {
            "void"
        };
        if self.is_array() {
            write!(f, "{base} array")
        } else {
            write!(f, "{base}")
        }
    }
}
