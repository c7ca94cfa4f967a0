//! The two-scope symbol table: a global scope of subroutine names and a
//! current scope of the enclosing subroutine's locals and parameters.

use crate::hashtable::HashTable;
use crate::valtype::ValType;

/// An identifier's compile-time properties. For a variable, `offset` is its
/// local-variable slot (1-based; slot 0 is reserved for `main`'s argument
/// array). For a callable, `offset` is unused and `params` lists formal
/// parameter types in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct IdProp {
    pub ty: ValType,
    pub offset: u32,
    pub params: Vec<ValType>,
}

impl IdProp {
    pub fn variable(ty: ValType, offset: u32) -> Self {
        IdProp {
            ty,
            offset,
            params: Vec::new(),
        }
    }

    pub fn callable(ty: ValType, params: Vec<ValType>) -> Self {
        IdProp {
            ty: ty.as_callable(),
            offset: 0,
            params,
        }
    }

    pub fn nparams(&self) -> usize {
        self.params.len()
    }
}

/// A cyclic-shift hash: `h = rotate_left(h, 5) + b` for each byte `b`.
/// Plain additive hashing (summing byte values) is explicitly disallowed,
/// since it collides on anagrams of identifiers.
fn shift_hash(key: &str, size: usize) -> usize {
    let mut h: u32 = 0;
    for b in key.bytes() {
        h = h.rotate_left(5).wrapping_add(b as u32);
    }
    (h as usize) % size
}

pub struct SymbolTable {
    current: HashTable<IdProp>,
    saved: Option<HashTable<IdProp>>,
    curr_offset: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            current: HashTable::new(0.75, shift_hash),
            saved: None,
            curr_offset: 1,
        }
    }

    /// Inserts `id -> prop` into the current scope. Refuses duplicates.
    /// `prop.offset` must already be set by the caller (via
    /// `variables_width`) for variables; on success, a variable's insert
    /// advances `curr_offset` by one.
    pub fn insert(&mut self, id: String, prop: IdProp) -> bool {
        let is_variable = prop.ty.is_variable();
        match self.current.insert(id, prop) {
            Ok(()) => {
                if is_variable {
                    self.curr_offset += 1;
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Inserts the subroutine name into the current (global) scope, then
    /// opens a fresh current scope for its body, saving the old one.
    pub fn open_subroutine(&mut self, id: String, prop: IdProp) -> bool {
        if self.insert(id, prop) {
            let fresh = HashTable::new(0.75, shift_hash);
            self.saved = Some(std::mem::replace(&mut self.current, fresh));
            self.curr_offset = 1;
            true
        } else {
            false
        }
    }

    /// Releases the current (subroutine) scope's entries and reinstates the
    /// saved (global) scope as current.
    pub fn close_subroutine(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.current = saved;
        }
    }

    /// Searches the current scope first, then the saved (outer) scope — a
    /// hit in the outer scope is only visible if it names a callable, so
    /// subroutines are visible from nested scopes but outer variables are not.
    pub fn find(&self, id: &str) -> Option<&IdProp> {
        if let Some(p) = self.current.search(id) {
            return Some(p);
        }
        if let Some(saved) = &self.saved {
            if let Some(p) = saved.search(id) {
                if p.ty.is_callable() {
                    return Some(p);
                }
            }
        }
        None
    }

    pub fn variables_width(&self) -> u32 {
        self.curr_offset
    }

    pub fn release(self) {
        drop(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(ty: ValType, offset: u32) -> IdProp {
        IdProp::variable(ty, offset)
    }

    #[test]
    fn find_before_insert_is_none() {
        let st = SymbolTable::new();
        assert!(st.find("x").is_none());
    }

    #[test]
    fn insert_then_find_round_trips() {
        let mut st = SymbolTable::new();
        let offset = st.variables_width();
        assert!(st.insert("x".into(), var(ValType::INTEGER, offset)));
        let found = st.find("x").unwrap();
        assert_eq!(found.ty, ValType::INTEGER);
        assert_eq!(found.offset, offset);
    }

    #[test]
    fn duplicate_insert_is_refused() {
        let mut st = SymbolTable::new();
        assert!(st.insert("x".into(), var(ValType::INTEGER, 1)));
        assert!(!st.insert("x".into(), var(ValType::INTEGER, 2)));
    }

    #[test]
    fn variable_insert_advances_offset() {
        let mut st = SymbolTable::new();
        assert_eq!(st.variables_width(), 1);
        st.insert("a".into(), var(ValType::INTEGER, 1));
        assert_eq!(st.variables_width(), 2);
        st.insert("b".into(), var(ValType::BOOLEAN, 2));
        assert_eq!(st.variables_width(), 3);
    }

    #[test]
    fn callable_visible_inside_subroutine_but_variable_is_not() {
        let mut st = SymbolTable::new();
        st.insert("g".into(), var(ValType::INTEGER, 1));
        let proc = IdProp::callable(ValType::empty(), vec![ValType::INTEGER]);
        assert!(st.open_subroutine("f".into(), proc));

        // Outer callable is visible from inside the subroutine scope...
        assert!(st.find("f").is_some());
        // ...but an outer variable is not.
        assert!(st.find("g").is_none());

        st.close_subroutine();
        // After closing, outer names are visible again.
        assert!(st.find("g").is_some());
        assert!(st.find("f").is_some());
    }

    #[test]
    fn inner_names_do_not_survive_close_subroutine() {
        let mut st = SymbolTable::new();
        let proc = IdProp::callable(ValType::empty(), vec![]);
        st.open_subroutine("f".into(), proc);
        st.insert("local".into(), var(ValType::INTEGER, 1));
        assert!(st.find("local").is_some());

        st.close_subroutine();
        assert!(st.find("local").is_none());
    }

    #[test]
    fn curr_offset_resets_to_one_on_open_subroutine() {
        let mut st = SymbolTable::new();
        st.insert("a".into(), var(ValType::INTEGER, st.variables_width()));
        st.insert("b".into(), var(ValType::INTEGER, st.variables_width()));
        assert_eq!(st.variables_width(), 3);

        let proc = IdProp::callable(ValType::empty(), vec![]);
        st.open_subroutine("f".into(), proc);
        assert_eq!(st.variables_width(), 1);
    }
}
