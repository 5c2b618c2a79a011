use crate::error::Diagnostics;
use crate::lexer::{Token, TokenSource};
use crate::symbols::{Segment, SymId, SymbolTable};
use crate::Error;

#[derive(Debug, Clone)]
enum Term {
    Const(i64),
    Sym(SymId),
}

/// Operand expression: a signed sum of constants and symbols. Parsed in
/// pass 1, stored in the inter-pass buffer, and evaluated in pass 2 once
/// all symbols are known.
#[derive(Debug, Clone, Default)]
pub struct Expr {
    terms: Vec<(i64, Term)>,
}

/// Result of evaluating an expression against the symbol table.
#[derive(Debug, Clone, Copy)]
pub enum Eval {
    /// references a symbol with no definition yet
    Undefined(SymId),
    Absolute(i64),
    /// anchored to one segment-defined symbol; value includes the addend
    Seg(Segment, i64, SymId),
}

impl Expr {
    pub fn eval(&self, syms: &SymbolTable) -> Result<Eval, Error> {
        let mut acc = 0i64;
        let mut anchor: Option<(SymId, Segment)> = None;
        for (sign, term) in &self.terms {
            match term {
                Term::Const(v) => acc += sign * v,
                Term::Sym(id) => {
                    let sym = syms.get(*id);
                    if !sym.defined {
                        return Ok(Eval::Undefined(*id));
                    }
                    match sym.segment {
                        None => acc += sign * sym.value as i64,
                        Some(seg) => {
                            if *sign < 0 || anchor.is_some() {
                                return Err(segment_err!("relocatable expression too complex"));
                            }
                            anchor = Some((*id, seg));
                            acc += sym.value as i64;
                        }
                    }
                }
            }
        }
        Ok(match anchor {
            None => Eval::Absolute(acc),
            Some((id, seg)) => Eval::Seg(seg, acc, id),
        })
    }
}

/// Read an operand expression from the token stream. Symbols are
/// interned immediately so forward references resolve in pass 2. The
/// first token that cannot continue the expression is pushed back.
pub fn read_expr(toks: &mut dyn TokenSource, syms: &mut SymbolTable, diags: &mut Diagnostics) -> Expr {
    let mut terms = Vec::new();
    let mut sign = 1i64;
    match toks.next_token() {
        Some(Token::Char('-')) => sign = -1,
        Some(t) => toks.unread_token(t),
        None => {}
    }
    loop {
        match toks.next_token() {
            Some(Token::Number(n)) => terms.push((sign, Term::Const(n))),
            Some(Token::Name(s)) => {
                let id = syms.intern(&s);
                terms.push((sign, Term::Sym(id)));
            }
            Some(t) => {
                toks.unread_token(t);
                break;
            }
            None => break,
        }
        match toks.next_token() {
            Some(Token::Char('+')) => sign = 1,
            Some(Token::Char('-')) => sign = -1,
            Some(t) => {
                toks.unread_token(t);
                break;
            }
            None => break,
        }
    }
    if terms.is_empty() {
        diags.error(syntax_err!("expression expected"));
    }
    Expr { terms }
}

/// Pass-1 expression argument that must evaluate to an absolute value
/// right now (shift counts, device addresses, bit numbers and the like).
/// Reports a diagnostic and yields 0 otherwise.
pub fn read_abs(toks: &mut dyn TokenSource, syms: &mut SymbolTable, diags: &mut Diagnostics) -> i64 {
    let e = read_expr(toks, syms, diags);
    match e.eval(syms) {
        Ok(Eval::Absolute(v)) => v,
        Ok(_) => {
            diags.error(syntax_err!("absolute expression required"));
            0
        }
        Err(err) => {
            diags.error(err);
            0
        }
    }
}
