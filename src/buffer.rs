use crate::expr::Expr;
use crate::instructions::InstrClass;
use std::collections::VecDeque;

/// One record per source instruction, written by pass 1 in strict
/// program order. `word` holds only the operand bits gathered so far
/// (zero for the no-operand class); the fixed opcode bits ride along in
/// `opcode` and are merged in pass 2. `expr` is present only for the
/// two deferred-expression classes (Ea and Off).
#[derive(Debug)]
pub struct PartialInstruction {
    pub loc: u32,
    pub class: InstrClass,
    pub opcode: u16,
    pub word: u16,
    pub expr: Option<Expr>,
}

/// FIFO inter-pass buffer. Pass 1 is the single producer, pass 2 the
/// single consumer; consuming out of order would corrupt the
/// location-counter correspondence, so no other access is offered.
#[derive(Debug, Default)]
pub struct InterBuffer {
    fifo: VecDeque<PartialInstruction>,
}

impl InterBuffer {
    pub fn new() -> InterBuffer { InterBuffer::default() }
    pub fn push(&mut self, p: PartialInstruction) { self.fifo.push_back(p) }
    pub fn pop(&mut self) -> Option<PartialInstruction> { self.fifo.pop_front() }
    pub fn len(&self) -> usize { self.fifo.len() }
    pub fn is_empty(&self) -> bool { self.fifo.is_empty() }
}
