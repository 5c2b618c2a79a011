use crate::buffer::PartialInstruction;
use crate::config::Options;
use crate::error::Diagnostics;
use crate::expr::Eval;
use crate::instructions::InstrClass;
use crate::reloc::{seg_kind, RelocRecord, REL_8, REL_UNDEXT};
use crate::symbols::SymbolTable;
use crate::Error;

/// Destination for finished instruction words.
pub trait WordSink {
    fn emit_word(&mut self, w: u16);
}
impl WordSink for Vec<u16> {
    fn emit_word(&mut self, w: u16) { self.push(w) }
}

/// Pass 2: consumes the pass-1 records strictly in production order,
/// resolves any deferred expression now that all symbols are known,
/// applies the range checks, and hands the finished word to the sink.
/// Relocations are appended as a side effect.
pub struct Pass2<'a> {
    syms: &'a SymbolTable,
    opts: &'a Options,
    out: &'a mut dyn WordSink,
    diags: &'a mut Diagnostics,
    pub relocs: Vec<RelocRecord>,
    next_loc: u32,
}

impl<'a> Pass2<'a> {
    pub fn new(
        syms: &'a SymbolTable, opts: &'a Options, out: &'a mut dyn WordSink, diags: &'a mut Diagnostics,
    ) -> Pass2<'a> {
        Pass2 {
            syms,
            opts,
            out,
            diags,
            relocs: Vec::new(),
            next_loc: 0,
        }
    }

    /// Write out one instruction to the destination. Only the deferred
    /// classes have anything left to resolve; everything else was fully
    /// encoded in pass 1.
    pub fn resolve_and_emit(&mut self, p: PartialInstruction) -> Result<(), Error> {
        if p.loc != self.next_loc {
            return Err(internal_err!(
                "p2: record for location {} out of order (expected {})",
                p.loc,
                self.next_loc
            ));
        }
        self.next_loc += 1;

        let mut instr = p.opcode | p.word;
        match p.class {
            InstrClass::Ea | InstrClass::Off => {
                let e = match p.expr {
                    Some(e) => e,
                    None => return Err(internal_err!("p2: missing deferred expression at {}", p.loc)),
                };
                let ev = match e.eval(self.syms) {
                    Ok(ev) => ev,
                    Err(err) => {
                        self.diags.error(err);
                        Eval::Absolute(0)
                    }
                };
                let mut val: i64 = 0;
                match ev {
                    Eval::Undefined(id) => {
                        if !self.opts.allow_undefined {
                            self.diags
                                .error(reference_err!("symbol '{}' undefined", self.syms.get(id).name));
                        }
                        self.relocs.push(RelocRecord {
                            sym: Some(id),
                            off: 0,
                            kind: REL_UNDEXT,
                        });
                        // an undefined symbol resolves as zero for now
                    }
                    Eval::Absolute(v) => {
                        val = v as i16 as i64;
                        if !(-128..=127).contains(&val) {
                            self.diags.error(range_err!("expr value out of bounds"));
                        }
                    }
                    Eval::Seg(seg, v, id) => {
                        // now relative PC
                        val = v - p.loc as i64;
                        if !(-128..=127).contains(&val) {
                            self.diags.error(range_err!("symbol distance too far"));
                        }
                        self.relocs.push(RelocRecord {
                            sym: Some(id),
                            off: 0,
                            kind: seg_kind(seg) | REL_8,
                        });
                    }
                }
                instr |= (val as u16) & 0o377;
            }

            // every other class was finished in pass 1
            _ => {}
        }
        self.out.emit_word(instr);
        Ok(())
    }

    /// Target-specific part of a word relocation, for data directives
    /// that store a relocatable expression. The field must be a full
    /// word on this target.
    pub fn word_reloc(&mut self, width: usize, ev: &Eval) {
        if width != 2 {
            self.diags.error(syntax_err!("relocation not word"));
            return;
        }
        match ev {
            Eval::Undefined(id) => {
                self.relocs.push(RelocRecord {
                    sym: Some(*id),
                    off: 0,
                    kind: REL_UNDEXT,
                });
                if !self.opts.allow_undefined {
                    self.diags
                        .error(reference_err!("symbol '{}' not defined", self.syms.get(*id).name));
                }
            }
            Eval::Seg(seg, _, id) => {
                self.relocs.push(RelocRecord {
                    sym: Some(*id),
                    off: 0,
                    kind: seg_kind(*seg),
                });
            }
            // absolute words need no relocation
            Eval::Absolute(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{read_expr, Expr};
    use crate::lexer::Lexer;
    use crate::reloc::{rel_word, REL_DATA, REL_TEXT};
    use crate::symbols::Segment;
    use crate::ErrorKind;

    fn expr_from(src: &str, syms: &mut SymbolTable) -> Expr {
        let mut lx = Lexer::new(src);
        let mut diags = Diagnostics::new();
        let e = read_expr(&mut lx, syms, &mut diags);
        assert!(diags.is_empty());
        e
    }

    fn partial(loc: u32, class: InstrClass, opcode: u16, word: u16, expr: Option<Expr>) -> PartialInstruction {
        PartialInstruction {
            loc,
            class,
            opcode,
            word,
            expr,
        }
    }

    /// Run one record through a fresh Pass2 and hand back everything a
    /// test might want to look at.
    fn emit_one(
        syms: &SymbolTable, opts: &Options, start: u32, p: PartialInstruction,
    ) -> (Vec<u16>, Vec<RelocRecord>, Diagnostics) {
        let mut words: Vec<u16> = Vec::new();
        let mut diags = Diagnostics::new();
        let mut p2 = Pass2::new(syms, opts, &mut words, &mut diags);
        p2.next_loc = start;
        p2.resolve_and_emit(p).unwrap();
        let relocs = p2.relocs;
        (words, relocs, diags)
    }

    #[test]
    fn absolute_displacement_round_trip() {
        let mut syms = SymbolTable::new();
        let opts = Options::new();
        for (src, expect) in [("127", 127u16), ("-200", 0o200 /* -128 */)] {
            let e = expr_from(src, &mut syms);
            let (words, relocs, diags) =
                emit_one(&syms, &opts, 0, partial(0, InstrClass::Off, 0o130000, 0, Some(e)));
            assert!(diags.is_empty(), "{} should be in range", src);
            assert_eq!(words[0], 0o130000 | expect);
            assert!(relocs.is_empty());
        }
    }

    #[test]
    fn absolute_displacement_bounds() {
        let mut syms = SymbolTable::new();
        let opts = Options::new();
        for src in ["200", "-201"] {
            // 0o200 == 128, one past either end
            let e = expr_from(src, &mut syms);
            let (_, _, diags) = emit_one(&syms, &opts, 0, partial(0, InstrClass::Ea, 0o044000, 0, Some(e)));
            assert_eq!(diags.count(), 1, "{} should be out of range", src);
            assert_eq!(diags.errors()[0].kind, ErrorKind::Range);
        }
    }

    #[test]
    fn segment_relative_reference_in_range() {
        let mut syms = SymbolTable::new();
        let loc = 0o1000u32;
        syms.define("fwd", Some(Segment::Text), loc + 100);
        let e = expr_from("fwd", &mut syms);
        let opts = Options::new();
        let (words, relocs, diags) =
            emit_one(&syms, &opts, loc, partial(loc, InstrClass::Ea, 0o044000, 0, Some(e)));
        assert!(diags.is_empty());
        assert_eq!(words[0] & 0o377, 100);
        assert_eq!(relocs.len(), 1);
        assert_eq!(relocs[0].kind, REL_TEXT | REL_8);
        assert_eq!(relocs[0].off, 0);
    }

    #[test]
    fn segment_relative_reference_too_far() {
        let mut syms = SymbolTable::new();
        syms.define("far", Some(Segment::Data), 200);
        let e = expr_from("far", &mut syms);
        let opts = Options::new();
        let (_, relocs, diags) = emit_one(&syms, &opts, 0, partial(0, InstrClass::Off, 0o131000, 0, Some(e)));
        assert_eq!(diags.count(), 1);
        assert_eq!(diags.errors()[0].kind, ErrorKind::Range);
        // the relocation is still registered with its segment tag
        assert_eq!(relocs[0].kind, REL_DATA | REL_8);
    }

    #[test]
    fn undefined_symbol_requires_the_allow_flag() {
        let mut syms = SymbolTable::new();
        let e = expr_from("nowhere", &mut syms); // never defined
        let opts = Options::new();
        let (_, relocs, diags) = emit_one(&syms, &opts, 0, partial(0, InstrClass::Ea, 0o044000, 0, Some(e)));
        assert_eq!(diags.count(), 1);
        assert_eq!(diags.errors()[0].kind, ErrorKind::Reference);
        assert_eq!(relocs[0].kind, REL_UNDEXT);
    }

    #[test]
    fn undefined_symbol_allowed_still_relocates() {
        let mut syms = SymbolTable::new();
        let e = expr_from("ext", &mut syms);
        let opts = Options {
            allow_undefined: true,
        };
        let (words, relocs, diags) = emit_one(&syms, &opts, 0, partial(0, InstrClass::Ea, 0o044000, 0, Some(e)));
        assert!(diags.is_empty());
        assert_eq!(words[0], 0o044000);
        assert_eq!(rel_word(&relocs[0], &syms), REL_UNDEXT | (1 << 4));
    }

    #[test]
    fn fully_encoded_classes_pass_through() {
        let syms = SymbolTable::new();
        let opts = Options::new();
        let mut words: Vec<u16> = Vec::new();
        let mut diags = Diagnostics::new();
        let mut p2 = Pass2::new(&syms, &opts, &mut words, &mut diags);
        p2.resolve_and_emit(partial(0, InstrClass::Skip, 0o140000, 0o2005, None)).unwrap();
        p2.resolve_and_emit(partial(1, InstrClass::NoArg, 0o146142, 0, None)).unwrap();
        let relocs = p2.relocs;
        assert_eq!(words, vec![0o142005, 0o146142]);
        assert!(relocs.is_empty());
    }

    #[test]
    fn out_of_order_records_are_fatal() {
        let syms = SymbolTable::new();
        let opts = Options::new();
        let mut words: Vec<u16> = Vec::new();
        let mut diags = Diagnostics::new();
        let mut p2 = Pass2::new(&syms, &opts, &mut words, &mut diags);
        let err = p2
            .resolve_and_emit(partial(3, InstrClass::NoArg, 0o151000, 0, None))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn missing_deferred_expression_is_fatal() {
        let syms = SymbolTable::new();
        let opts = Options::new();
        let mut words: Vec<u16> = Vec::new();
        let mut diags = Diagnostics::new();
        let mut p2 = Pass2::new(&syms, &opts, &mut words, &mut diags);
        let err = p2
            .resolve_and_emit(partial(0, InstrClass::Off, 0o130000, 0, None))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn word_reloc_dispatch() {
        let mut syms = SymbolTable::new();
        let t = syms.define("t", Some(Segment::Text), 0);
        let b = syms.define("b", Some(Segment::Bss), 0);
        let u = syms.intern("u");
        let opts = Options::new();
        let mut words: Vec<u16> = Vec::new();
        let mut diags = Diagnostics::new();
        let mut p2 = Pass2::new(&syms, &opts, &mut words, &mut diags);
        p2.word_reloc(2, &Eval::Seg(Segment::Text, 0, t));
        p2.word_reloc(2, &Eval::Seg(Segment::Bss, 0, b));
        p2.word_reloc(2, &Eval::Absolute(7));
        p2.word_reloc(2, &Eval::Undefined(u));
        // a byte-wide field cannot take a word relocation
        p2.word_reloc(1, &Eval::Absolute(0));
        let relocs = p2.relocs;
        assert_eq!(relocs.len(), 3);
        assert_eq!(relocs[0].kind, REL_TEXT);
        assert_eq!(relocs[1].kind, crate::reloc::REL_BSS);
        assert_eq!(relocs[2].kind, REL_UNDEXT);
        // one for the undefined 'u' without the allow flag, one for the width
        assert_eq!(diags.count(), 2);
    }
}
