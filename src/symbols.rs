use std::collections::HashMap;

/// Program region a defined symbol may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Text,
    Data,
    Bss,
}

/// First sequence number handed to a user symbol; the slots below it are
/// reserved for the object header. The relocation word stores sequence
/// numbers relative to this base.
pub const SYMBASE: u16 = 2;

/// Index into the symbol table. Cheap to copy; stable for the life of
/// the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymId(usize);

#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    /// sequence number in the object file symbol list
    pub num: u16,
    /// None for absolute (equated) symbols
    pub segment: Option<Segment>,
    pub value: u32,
    pub defined: bool,
}

/// Intern-by-name symbol table. Referencing a symbol before its
/// definition is the normal case in pass 1; pass 2 only reads.
#[derive(Debug, Default)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
    by_name: HashMap<String, SymId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable { SymbolTable::default() }

    /// Look up or create the entry for `name`, undefined until defined.
    pub fn intern(&mut self, name: &str) -> SymId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = SymId(self.syms.len());
        self.syms.push(Symbol {
            name: name.to_string(),
            num: SYMBASE + self.syms.len() as u16 + 1,
            segment: None,
            value: 0,
            defined: false,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Define (or redefine) a symbol at `value`. `segment` of None makes
    /// it absolute.
    pub fn define(&mut self, name: &str, segment: Option<Segment>, value: u32) -> SymId {
        let id = self.intern(name);
        let sym = &mut self.syms[id.0];
        sym.segment = segment;
        sym.value = value;
        sym.defined = true;
        id
    }

    pub fn lookup(&self, name: &str) -> Option<SymId> { self.by_name.get(name).copied() }
    pub fn get(&self, id: SymId) -> &Symbol { &self.syms[id.0] }
    pub fn len(&self) -> usize { self.syms.len() }
    pub fn is_empty(&self) -> bool { self.syms.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut tab = SymbolTable::new();
        let a = tab.intern("alpha");
        let b = tab.intern("beta");
        assert_ne!(a, b);
        assert_eq!(tab.intern("alpha"), a);
        assert_eq!(tab.len(), 2);
        assert!(!tab.get(a).defined);
    }

    #[test]
    fn sequence_numbers_count_up_from_base() {
        let mut tab = SymbolTable::new();
        let first = tab.intern("one");
        let second = tab.intern("two");
        assert_eq!(tab.get(first).num, SYMBASE + 1);
        assert_eq!(tab.get(second).num, SYMBASE + 2);
    }

    #[test]
    fn define_after_reference() {
        let mut tab = SymbolTable::new();
        let fwd = tab.intern("fwd");
        let def = tab.define("fwd", Some(Segment::Text), 0o100);
        assert_eq!(fwd, def);
        let sym = tab.get(fwd);
        assert!(sym.defined);
        assert_eq!(sym.segment, Some(Segment::Text));
        assert_eq!(sym.value, 0o100);
    }
}
