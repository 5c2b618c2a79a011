use crate::buffer::{InterBuffer, PartialInstruction};
use crate::error::Diagnostics;
use crate::expr::{self, Expr};
use crate::instructions::{Descriptor, InstrClass, BSKP_OPCODE, JMP_OPCODE};
use crate::lexer::{Token, TokenSource};
use crate::symbols::SymbolTable;
use crate::Error;

// memory-reference qualifier bits
const EA_X: u16 = 0o002000;
const EA_I: u16 = 0o001000;
const EA_B: u16 = 0o000400;

// skip and bit-skip arguments live in bits 3-6
const LEVEL_MASK: u16 = 0o170;

/// Skip/jump sequencing state threaded across consecutive pass-1 calls.
/// A jump immediately following a skip is one logical unit in source
/// order, so an outstanding bracket deferral must not be reconciled at
/// that jump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeqState {
    /// the current instruction is a skip; promoted to `was_skip` on the
    /// next call
    pub pending_skip: bool,
    /// the previous instruction was a skip
    pub was_skip: bool,
    /// the current instruction is the long jump
    pub is_jump: bool,
}

/// Pass 1: reads one instruction's operands from the token stream,
/// packs what can be packed now, and appends a `PartialInstruction` to
/// the inter-pass buffer. Grammar and range errors are reported to the
/// diagnostics sink and parsing continues best-effort; only a
/// descriptor-table mismatch aborts.
pub struct Pass1<'a> {
    toks: &'a mut dyn TokenSource,
    syms: &'a mut SymbolTable,
    out: &'a mut InterBuffer,
    diags: &'a mut Diagnostics,
    /// location counter; one word per instruction regardless of class
    pub loc: u32,
    pub seq: SeqState,
}

impl<'a> Pass1<'a> {
    pub fn new(
        toks: &'a mut dyn TokenSource, syms: &'a mut SymbolTable, out: &'a mut InterBuffer,
        diags: &'a mut Diagnostics,
    ) -> Pass1<'a> {
        Pass1 {
            toks,
            syms,
            out,
            diags,
            loc: 0,
            seq: SeqState::default(),
        }
    }

    /// Next character that is not a blank.
    fn nextch(&mut self) -> Option<char> {
        loop {
            match self.toks.next_char() {
                Some(' ') | Some('\t') => continue,
                c => return c,
            }
        }
    }

    /// A `,x` or `,b` qualifier, or nothing (pushed back).
    fn index_base(&mut self) -> u16 {
        match self.nextch() {
            Some(',') => match self.nextch() {
                Some('x') => EA_X,
                Some('b') => EA_B,
                c => {
                    self.diags
                        .error(syntax_err!("bad qualifier '{}'", c.unwrap_or(' ')));
                    0
                }
            },
            Some(c) => {
                self.toks.unread_char(c);
                0
            }
            None => 0,
        }
    }

    /// Check for the possible options for memory reference instructions;
    ///     - ,X
    ///     - I
    ///     - ,B
    /// These must be in order. An `i` not followed by a delimiter is the
    /// start of an identifier and is pushed back whole.
    fn ea_options(&mut self) -> u16 {
        let mut rv = self.index_base();
        match self.nextch() {
            Some('i') => match self.toks.next_char() {
                Some(c @ (' ' | '\t' | ',')) => {
                    self.toks.unread_char(c);
                    rv |= EA_I;
                }
                c => {
                    if let Some(c) = c {
                        self.toks.unread_char(c);
                    }
                    self.toks.unread_char('i');
                }
            },
            Some(c) => self.toks.unread_char(c),
            None => {}
        }
        rv |= self.index_base();
        rv
    }

    /// One optional modifier token of the expected class; anything else
    /// is pushed back unconsumed and contributes no bits.
    fn modifier(&mut self, class: InstrClass) -> u16 {
        match self.toks.next_token() {
            Some(Token::Instr(ar)) if ar.class == class => ar.opcode,
            Some(t) => {
                self.toks.unread_token(t);
                0
            }
            None => 0,
        }
    }

    fn source_register(&mut self) -> u16 { self.modifier(InstrClass::RopSreg) }
    fn dest_register(&mut self) -> u16 { self.modifier(InstrClass::RopDreg) }

    /// Zero or more register-operation modifiers, OR-ed together.
    fn accumulate_modifiers(&mut self) -> u16 {
        let mut w = 0;
        loop {
            match self.toks.next_token() {
                Some(Token::Instr(ar)) if ar.class == InstrClass::RopArg => w |= ar.opcode,
                Some(t) => {
                    self.toks.unread_token(t);
                    break;
                }
                None => break,
            }
        }
        w
    }

    /// Internal register for tra/trr/mcl/mst: a register name token or a
    /// numeric expression.
    fn transfer_register(&mut self) -> i64 {
        match self.toks.next_token() {
            Some(Token::Instr(ar)) => {
                if ar.class == InstrClass::TrReg {
                    ar.opcode as i64
                } else {
                    self.diags.error(syntax_err!(
                        "unexpected instruction class {:?} (expected {:?})",
                        ar.class,
                        InstrClass::TrReg
                    ));
                    0
                }
            }
            Some(t @ Token::Number(_)) => {
                self.toks.unread_token(t);
                expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags)
            }
            t => {
                self.diags.error(syntax_err!("unexpected token {:?}", t));
                0
            }
        }
    }

    /// Optional shift type, optional right-shift marker, then the count.
    fn shift_arg(&mut self) -> u16 {
        let mut w = 0u16;
        let mut negate = false;
        let mut t = self.toks.next_token();
        if let Some(Token::Instr(ar)) = t.as_ref() {
            if ar.class == InstrClass::ShiftArg {
                w |= ar.opcode;
                t = self.toks.next_token();
            }
        }
        if let Some(Token::Instr(ar)) = t.as_ref() {
            if ar.class == InstrClass::ShiftRight {
                negate = true;
                t = self.toks.next_token();
            }
        }
        if let Some(t) = t {
            self.toks.unread_token(t);
        }
        let mut val = expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags);
        if !(-31..=31).contains(&val) {
            self.diags.error(range_err!("shift count {}", val));
        }
        if negate {
            val = -val;
        }
        w | ((val as u16) & 0o077)
    }

    /// Skip operands: optional register selection on either side of the
    /// condition; a literal `0` stands for "no register".
    fn skip_arg(&mut self) -> u16 {
        let mut w = 0u16;
        match self.nextch() {
            Some('0') => {}
            Some(c) => {
                self.toks.unread_char(c);
                w = self.dest_register();
            }
            None => {}
        }
        match self.toks.next_token() {
            Some(Token::Instr(ar)) => {
                if ar.class == InstrClass::SkipArg {
                    w |= ar.opcode;
                }
            }
            _ => self.diags.error(syntax_err!("skip: missing conditional")),
        }
        match self.nextch() {
            Some('0') => {}
            Some(c) => {
                self.toks.unread_char(c);
                w |= self.dest_register();
            }
            None => {}
        }
        w
    }

    /// Read and parse one instruction's operands and append the partial
    /// word (and any deferred expression) to the inter-pass buffer.
    pub fn parse_instruction(&mut self, ir: &'static Descriptor) -> Result<(), Error> {
        if self.seq.pending_skip {
            self.seq.was_skip = true;
            self.seq.pending_skip = false;
        }
        let mut w: u16 = 0;
        let mut e: Option<Expr> = None;
        match ir.class {
            InstrClass::Ea => {
                if ir.opcode == JMP_OPCODE {
                    self.seq.is_jump = true;
                }
                w = self.ea_options();
                let mut close = None;
                match self.nextch() {
                    Some('[') => {
                        self.toks.delay_save(']');
                        close = Some(']');
                    }
                    Some(c) => self.toks.unread_char(c),
                    None => {}
                }
                e = Some(expr::read_expr(&mut *self.toks, &mut *self.syms, &mut *self.diags));
                if let Some(cl) = close {
                    match self.toks.next_token() {
                        Some(Token::Char(c)) if c == cl => {}
                        Some(t) => self.toks.unread_token(t),
                        None => {}
                    }
                }
            }

            InstrClass::NoArg => {}

            InstrClass::Rop => {
                w = self.accumulate_modifiers();
                w |= self.source_register();
                w |= self.dest_register();
            }

            InstrClass::Shift => w = self.shift_arg(),

            InstrClass::Fconv => {
                w = (expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags) as u16) & 0o377;
            }

            InstrClass::Off => {
                e = Some(expr::read_expr(&mut *self.toks, &mut *self.syms, &mut *self.diags));
            }

            InstrClass::IrArg => {
                let v = expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags);
                if v & !(LEVEL_MASK as i64) != 0 {
                    self.diags.error(range_err!("level out of bounds"));
                }
                w = v as u16;
                w |= self.dest_register();
            }

            InstrClass::Skip => {
                self.seq.pending_skip = true;
                w = self.skip_arg();
            }

            InstrClass::Ident => match self.toks.next_token() {
                Some(Token::Instr(ar)) if ar.class == InstrClass::IdArg => w = ar.opcode,
                _ => self.diags.error(syntax_err!("bad ident level")),
            },

            InstrClass::Iox => {
                let v = expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags);
                if !(0..=0o3777).contains(&v) {
                    self.diags.error(range_err!("device address out of bounds"));
                }
                w = v as u16;
            }

            InstrClass::Movew | InstrClass::Pmrw => {
                let v = expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags);
                if !(0..=7).contains(&v) {
                    self.diags.error(range_err!("argument out of bounds"));
                }
                w = v as u16;
                if ir.class == InstrClass::Pmrw {
                    w <<= 3; // delta is in bit 3-5
                }
            }

            InstrClass::TrArg => {
                let v = self.transfer_register();
                if !(0..=0o17).contains(&v) {
                    self.diags
                        .error(range_err!("register value out of bounds (0-17 octal)"));
                }
                w = v as u16;
            }

            InstrClass::Bskp | InstrClass::Oba => {
                if ir.class == InstrClass::Bskp {
                    if ir.opcode == BSKP_OPCODE {
                        self.seq.pending_skip = true;
                    }
                    match self.toks.next_token() {
                        Some(Token::Instr(ar)) if ar.class == InstrClass::BskpArg => w = ar.opcode,
                        _ => self.diags.error(syntax_err!("bad arg")),
                    }
                }
                let i = expr::read_abs(&mut *self.toks, &mut *self.syms, &mut *self.diags);
                if i & !(LEVEL_MASK as i64) != 0 {
                    self.diags.error(range_err!("bit number out of bounds"));
                }
                w |= i as u16;
                w |= self.dest_register();
            }

            InstrClass::RopArg
            | InstrClass::RopSreg
            | InstrClass::RopDreg
            | InstrClass::ShiftArg
            | InstrClass::ShiftRight
            | InstrClass::SkipArg
            | InstrClass::IdArg
            | InstrClass::TrReg
            | InstrClass::BskpArg => {
                return Err(internal_err!(
                    "p1: modifier class {:?} cannot start an instruction",
                    ir.class
                ))
            }
        }

        self.out.push(PartialInstruction {
            loc: self.loc,
            class: ir.class,
            opcode: ir.opcode,
            word: w,
            expr: e,
        });
        self.loc += 1;

        if self.toks.delay_waiting() && self.seq.is_jump && !self.seq.was_skip {
            self.toks.delay_reload();
        }
        self.seq.was_skip = false;
        self.seq.is_jump = false;
        Ok(())
    }

    /// Drive pass 1 over the remainder of the token stream. Statement
    /// separators are skipped; anything else that cannot start an
    /// instruction is a diagnostic.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            match self.toks.next_token() {
                None => return Ok(()),
                Some(Token::Instr(d)) if !d.class.is_modifier() => self.parse_instruction(d)?,
                Some(Token::Instr(d)) => self
                    .diags
                    .error(syntax_err!("modifier '{}' cannot start an instruction", d.name)),
                Some(Token::Char('\n')) | Some(Token::Char(';')) => {}
                Some(t) => self.diags.error(syntax_err!("unexpected token {:?}", t)),
            }
        }
    }
}
