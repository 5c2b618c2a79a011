use crate::symbols::{Segment, SymId, SymbolTable, SYMBASE};

// Relocation kind bits; these are the low bits of the relocation word
// itself, so the layout is fixed by the target ABI.
/// bit 0: pc-relative reference to an 8-bit field
pub const REL_8: u16 = 0o001;
/// bits 1-3: segment tag
pub const REL_TEXT: u16 = 0o002;
pub const REL_DATA: u16 = 0o004;
pub const REL_BSS: u16 = 0o006;
pub const REL_UNDEXT: u16 = 0o010;

/// Target-specific part of one relocation, appended by pass 2 and
/// consumed later by the object writer.
#[derive(Debug, Clone, Copy)]
pub struct RelocRecord {
    pub sym: Option<SymId>,
    /// offset of the relocated field within the word; always 0 on this
    /// fixed-width target
    pub off: u16,
    pub kind: u16,
}

pub fn seg_kind(seg: Segment) -> u16 {
    match seg {
        Segment::Text => REL_TEXT,
        Segment::Data => REL_DATA,
        Segment::Bss => REL_BSS,
    }
}

/// Convert a relocation record to the target relocation word.
///
/// Bit 0 (if set) tells it's a PC-relative relocation.
///
/// Bit 1-3 are segment for relocation, as below:
/// 000    absolute number
/// 002    reference to text segment
/// 004    reference to initialized data
/// 006    reference to uninitialized data (bss)
/// 010    reference to undefined external symbol
///
/// Bit 4-15 are sequence number of referenced symbol.
pub fn rel_word(r: &RelocRecord, syms: &SymbolTable) -> u16 {
    let mut rv = r.kind;
    if let Some(id) = r.sym {
        if rv & REL_UNDEXT != 0 {
            rv |= (syms.get(id).num - SYMBASE) << 4;
        }
    }
    rv
}
