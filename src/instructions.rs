use lazy_static::lazy_static;
use std::collections::HashMap;

/// Operand grammar class of an instruction or modifier token.
///
/// Primary classes begin an instruction. Modifier classes are only
/// recognized while parsing a primary instruction's operands and carry
/// no meaning on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrClass {
    /// memory reference with extended addressing (,x / i / ,b + deferred address)
    Ea,
    /// no operand at all
    NoArg,
    /// register operation: modifiers, then optional source and destination registers
    Rop,
    /// shift: optional type and direction tokens, then a count in [-31, 31]
    Shift,
    /// numeric argument masked to 8 bits
    Fconv,
    /// bare deferred address expression, no extra bits
    Off,
    /// inter-level register transfer: level argument plus destination register
    IrArg,
    /// skip: optional registers around a mandatory condition token
    Skip,
    /// identification: mandatory interrupt-level token
    Ident,
    /// i/o transfer: device address in [0, 03777]
    Iox,
    /// word move: count in [0, 7] stored in bits 0-2
    Movew,
    /// physical memory read/write: argument in [0, 7] stored in bits 3-5
    Pmrw,
    /// transfer to/from internal register: register token or number in [0, 017]
    TrArg,
    /// bit skip/set: mandatory condition token, bit number, destination register
    Bskp,
    /// one-bit accumulator operation: bit number plus destination register
    Oba,

    /// register-operation modifier (ad1, adc, cm1, cld)
    RopArg,
    /// source register selector (sd..sx)
    RopSreg,
    /// destination register selector (dd..dx)
    RopDreg,
    /// shift type selector (rot, zin, lin)
    ShiftArg,
    /// right-shift marker; negates the count
    ShiftRight,
    /// skip condition selector (eql..mlst)
    SkipArg,
    /// interrupt level selector for ident (pl10..pl13)
    IdArg,
    /// internal register name for tra/trr/mcl/mst
    TrReg,
    /// bit-skip condition selector (zro, one, bcm, bac)
    BskpArg,
}

impl InstrClass {
    /// Modifier tokens can never start an instruction.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            InstrClass::RopArg
                | InstrClass::RopSreg
                | InstrClass::RopDreg
                | InstrClass::ShiftArg
                | InstrClass::ShiftRight
                | InstrClass::SkipArg
                | InstrClass::IdArg
                | InstrClass::TrReg
                | InstrClass::BskpArg
        )
    }
}

/// One immutable table entry per recognized mnemonic or modifier token.
#[derive(Debug)]
pub struct Descriptor {
    pub name: &'static str,
    pub class: InstrClass,
    pub opcode: u16,
}

/// The long jump; the only memory-reference instruction the sequencing
/// tracker cares about.
pub const JMP_OPCODE: u16 = 0o124000;
/// The bit-skip variant of the 0174000 group; sets the skip flag like skp.
pub const BSKP_OPCODE: u16 = 0o175000;

use InstrClass as C;
//
// instruction table
//
#[rustfmt::skip]
pub const DESCRIPTORS: &[Descriptor] = &[
    // memory reference, extended addressing
    Descriptor { name: "stz",   class: C::Ea,        opcode: 0o000000 },
    Descriptor { name: "sta",   class: C::Ea,        opcode: 0o004000 },
    Descriptor { name: "stt",   class: C::Ea,        opcode: 0o010000 },
    Descriptor { name: "stx",   class: C::Ea,        opcode: 0o014000 },
    Descriptor { name: "min",   class: C::Ea,        opcode: 0o040000 },
    Descriptor { name: "lda",   class: C::Ea,        opcode: 0o044000 },
    Descriptor { name: "ldt",   class: C::Ea,        opcode: 0o050000 },
    Descriptor { name: "ldx",   class: C::Ea,        opcode: 0o054000 },
    Descriptor { name: "add",   class: C::Ea,        opcode: 0o060000 },
    Descriptor { name: "sub",   class: C::Ea,        opcode: 0o064000 },
    Descriptor { name: "and",   class: C::Ea,        opcode: 0o070000 },
    Descriptor { name: "ora",   class: C::Ea,        opcode: 0o074000 },
    Descriptor { name: "fad",   class: C::Ea,        opcode: 0o100000 },
    Descriptor { name: "fsb",   class: C::Ea,        opcode: 0o104000 },
    Descriptor { name: "fmu",   class: C::Ea,        opcode: 0o110000 },
    Descriptor { name: "fdv",   class: C::Ea,        opcode: 0o114000 },
    Descriptor { name: "mpy",   class: C::Ea,        opcode: 0o120000 },
    Descriptor { name: "jmp",   class: C::Ea,        opcode: 0o124000 },
    Descriptor { name: "jpl",   class: C::Ea,        opcode: 0o134000 },
    // conditional jumps, 8-bit displacement only
    Descriptor { name: "jap",   class: C::Off,       opcode: 0o130000 },
    Descriptor { name: "jan",   class: C::Off,       opcode: 0o130400 },
    Descriptor { name: "jaz",   class: C::Off,       opcode: 0o131000 },
    Descriptor { name: "jaf",   class: C::Off,       opcode: 0o131400 },
    Descriptor { name: "jpc",   class: C::Off,       opcode: 0o132000 },
    Descriptor { name: "jnc",   class: C::Off,       opcode: 0o132400 },
    Descriptor { name: "jxz",   class: C::Off,       opcode: 0o133000 },
    Descriptor { name: "jxn",   class: C::Off,       opcode: 0o133400 },
    // no operand
    Descriptor { name: "exit",  class: C::NoArg,     opcode: 0o146142 },
    Descriptor { name: "opcom", class: C::NoArg,     opcode: 0o150400 },
    Descriptor { name: "iof",   class: C::NoArg,     opcode: 0o150401 },
    Descriptor { name: "ion",   class: C::NoArg,     opcode: 0o150402 },
    Descriptor { name: "pof",   class: C::NoArg,     opcode: 0o150404 },
    Descriptor { name: "piof",  class: C::NoArg,     opcode: 0o150405 },
    Descriptor { name: "pon",   class: C::NoArg,     opcode: 0o150410 },
    Descriptor { name: "pion",  class: C::NoArg,     opcode: 0o150412 },
    Descriptor { name: "wait",  class: C::NoArg,     opcode: 0o151000 },
    // register operations
    Descriptor { name: "swap",  class: C::Rop,       opcode: 0o144000 },
    Descriptor { name: "rand",  class: C::Rop,       opcode: 0o144400 },
    Descriptor { name: "rexo",  class: C::Rop,       opcode: 0o145000 },
    Descriptor { name: "rora",  class: C::Rop,       opcode: 0o145400 },
    Descriptor { name: "radd",  class: C::Rop,       opcode: 0o146000 },
    Descriptor { name: "copy",  class: C::Rop,       opcode: 0o146100 },
    Descriptor { name: "cld",   class: C::RopArg,    opcode: 0o000100 },
    Descriptor { name: "cm1",   class: C::RopArg,    opcode: 0o000200 },
    Descriptor { name: "ad1",   class: C::RopArg,    opcode: 0o000400 },
    Descriptor { name: "adc",   class: C::RopArg,    opcode: 0o001000 },
    Descriptor { name: "sd",    class: C::RopSreg,   opcode: 0o000010 },
    Descriptor { name: "sp",    class: C::RopSreg,   opcode: 0o000020 },
    Descriptor { name: "sb",    class: C::RopSreg,   opcode: 0o000030 },
    Descriptor { name: "sl",    class: C::RopSreg,   opcode: 0o000040 },
    Descriptor { name: "sa",    class: C::RopSreg,   opcode: 0o000050 },
    Descriptor { name: "st",    class: C::RopSreg,   opcode: 0o000060 },
    Descriptor { name: "sx",    class: C::RopSreg,   opcode: 0o000070 },
    Descriptor { name: "dd",    class: C::RopDreg,   opcode: 0o000001 },
    Descriptor { name: "dp",    class: C::RopDreg,   opcode: 0o000002 },
    Descriptor { name: "db",    class: C::RopDreg,   opcode: 0o000003 },
    Descriptor { name: "dl",    class: C::RopDreg,   opcode: 0o000004 },
    Descriptor { name: "da",    class: C::RopDreg,   opcode: 0o000005 },
    Descriptor { name: "dt",    class: C::RopDreg,   opcode: 0o000006 },
    Descriptor { name: "dx",    class: C::RopDreg,   opcode: 0o000007 },
    // shifts
    Descriptor { name: "sht",   class: C::Shift,     opcode: 0o154000 },
    Descriptor { name: "shd",   class: C::Shift,     opcode: 0o154200 },
    Descriptor { name: "sad",   class: C::Shift,     opcode: 0o154400 },
    Descriptor { name: "sha",   class: C::Shift,     opcode: 0o154600 },
    Descriptor { name: "rot",   class: C::ShiftArg,  opcode: 0o001000 },
    Descriptor { name: "zin",   class: C::ShiftArg,  opcode: 0o002000 },
    Descriptor { name: "lin",   class: C::ShiftArg,  opcode: 0o003000 },
    Descriptor { name: "shr",   class: C::ShiftRight, opcode: 0o000000 },
    // format conversion and monitor calls, 8-bit argument
    Descriptor { name: "nlz",   class: C::Fconv,     opcode: 0o151400 },
    Descriptor { name: "dnz",   class: C::Fconv,     opcode: 0o152000 },
    Descriptor { name: "mon",   class: C::Fconv,     opcode: 0o153000 },
    // inter-level register transfer
    Descriptor { name: "irr",   class: C::IrArg,     opcode: 0o153400 },
    Descriptor { name: "irw",   class: C::IrArg,     opcode: 0o153600 },
    // skip
    Descriptor { name: "skp",   class: C::Skip,      opcode: 0o140000 },
    Descriptor { name: "eql",   class: C::SkipArg,   opcode: 0o000000 },
    Descriptor { name: "geq",   class: C::SkipArg,   opcode: 0o000400 },
    Descriptor { name: "gre",   class: C::SkipArg,   opcode: 0o001000 },
    Descriptor { name: "mgre",  class: C::SkipArg,   opcode: 0o001400 },
    Descriptor { name: "ueq",   class: C::SkipArg,   opcode: 0o002000 },
    Descriptor { name: "lss",   class: C::SkipArg,   opcode: 0o002400 },
    Descriptor { name: "lst",   class: C::SkipArg,   opcode: 0o003000 },
    Descriptor { name: "mlst",  class: C::SkipArg,   opcode: 0o003400 },
    // ident
    Descriptor { name: "ident", class: C::Ident,     opcode: 0o143600 },
    Descriptor { name: "pl10",  class: C::IdArg,     opcode: 0o000004 },
    Descriptor { name: "pl11",  class: C::IdArg,     opcode: 0o000011 },
    Descriptor { name: "pl12",  class: C::IdArg,     opcode: 0o000022 },
    Descriptor { name: "pl13",  class: C::IdArg,     opcode: 0o000043 },
    // i/o transfer
    Descriptor { name: "iox",   class: C::Iox,       opcode: 0o164000 },
    // word move and physical memory access
    Descriptor { name: "movew", class: C::Movew,     opcode: 0o143100 },
    Descriptor { name: "pmr",   class: C::Pmrw,      opcode: 0o143200 },
    Descriptor { name: "pmw",   class: C::Pmrw,      opcode: 0o143300 },
    // internal register transfer
    Descriptor { name: "tra",   class: C::TrArg,     opcode: 0o150000 },
    Descriptor { name: "trr",   class: C::TrArg,     opcode: 0o150100 },
    Descriptor { name: "mcl",   class: C::TrArg,     opcode: 0o150200 },
    Descriptor { name: "mst",   class: C::TrArg,     opcode: 0o150300 },
    Descriptor { name: "pans",  class: C::TrReg,     opcode: 0o000000 },
    Descriptor { name: "sts",   class: C::TrReg,     opcode: 0o000001 },
    Descriptor { name: "opr",   class: C::TrReg,     opcode: 0o000002 },
    Descriptor { name: "psr",   class: C::TrReg,     opcode: 0o000003 },
    Descriptor { name: "pvl",   class: C::TrReg,     opcode: 0o000004 },
    Descriptor { name: "iic",   class: C::TrReg,     opcode: 0o000005 },
    Descriptor { name: "pid",   class: C::TrReg,     opcode: 0o000006 },
    Descriptor { name: "pie",   class: C::TrReg,     opcode: 0o000007 },
    Descriptor { name: "csr",   class: C::TrReg,     opcode: 0o000010 },
    Descriptor { name: "actl",  class: C::TrReg,     opcode: 0o000011 },
    Descriptor { name: "ald",   class: C::TrReg,     opcode: 0o000012 },
    Descriptor { name: "pes",   class: C::TrReg,     opcode: 0o000013 },
    Descriptor { name: "pcr",   class: C::TrReg,     opcode: 0o000014 },
    Descriptor { name: "pea",   class: C::TrReg,     opcode: 0o000015 },
    // bit instructions
    Descriptor { name: "bset",  class: C::Bskp,      opcode: 0o174000 },
    Descriptor { name: "bskp",  class: C::Bskp,      opcode: 0o175000 },
    Descriptor { name: "zro",   class: C::BskpArg,   opcode: 0o000000 },
    Descriptor { name: "one",   class: C::BskpArg,   opcode: 0o000200 },
    Descriptor { name: "bcm",   class: C::BskpArg,   opcode: 0o000400 },
    Descriptor { name: "bac",   class: C::BskpArg,   opcode: 0o000600 },
    Descriptor { name: "bstc",  class: C::Oba,       opcode: 0o176000 },
    Descriptor { name: "bsta",  class: C::Oba,       opcode: 0o176200 },
    Descriptor { name: "bldc",  class: C::Oba,       opcode: 0o176400 },
    Descriptor { name: "blda",  class: C::Oba,       opcode: 0o176600 },
    Descriptor { name: "banc",  class: C::Oba,       opcode: 0o177000 },
    Descriptor { name: "band",  class: C::Oba,       opcode: 0o177200 },
    Descriptor { name: "borc",  class: C::Oba,       opcode: 0o177400 },
    Descriptor { name: "bora",  class: C::Oba,       opcode: 0o177600 },
];

lazy_static! {
    static ref DESC_BY_NAME: HashMap<&'static str, &'static Descriptor> = {
        let mut dbn = HashMap::new();
        for desc in DESCRIPTORS {
            dbn.insert(desc.name, desc);
        }
        dbn
    };
}

pub fn name_to_descriptor(name: &str) -> Option<&'static Descriptor> { DESC_BY_NAME.get(name).copied() }
