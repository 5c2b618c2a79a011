use std::{convert::From, fmt};

/// Simple custom Error for the ND-100 backend
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// unexpected token kind or class where a specific modifier or expression was mandatory
    Syntax,
    /// numeric operand outside its field's representable range
    Range,
    /// undefined symbol used where undefined symbols are disallowed
    Reference,
    /// relocation against something that is not a plain text/data/bss reference
    Segment,
    /// descriptor table / parser mismatch; always fatal
    Internal,
    /// underlying io error
    IO,
}

impl Error {
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", red!("as100::Error"), self.msg) }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.msg) }
}
impl std::error::Error for Error {}

/// Collects non-fatal diagnostics so assembly can continue best-effort
/// after a grammar, range, or symbol error. Internal errors never land
/// here; they propagate as `Err` and abort the run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics { Diagnostics { errors: Vec::new() } }
    pub fn error(&mut self, e: Error) { self.errors.push(e) }
    pub fn count(&self) -> usize { self.errors.len() }
    pub fn is_empty(&self) -> bool { self.errors.is_empty() }
    pub fn errors(&self) -> &[Error] { &self.errors }
    pub fn take(&mut self) -> Vec<Error> { std::mem::take(&mut self.errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_collect_and_continue() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.error(syntax_err!("bad qualifier '{}'", 'q'));
        diags.error(range_err!("shift count {}", 32));
        assert_eq!(diags.count(), 2);
        assert_eq!(diags.errors()[0].kind, ErrorKind::Syntax);
        assert_eq!(diags.errors()[1].kind, ErrorKind::Range);
        let taken = diags.take();
        assert_eq!(taken.len(), 2);
        assert!(diags.is_empty());
    }
}
