/// Assembly-wide options the generic driver hands to the backend.
/// The backend itself has no command-line surface; the driver owns
/// option parsing and fills this in.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// allow undefined symbols in operand expressions (the classic -u flag);
    /// they still produce undefined-external relocations either way
    pub allow_undefined: bool,
}

impl Options {
    pub fn new() -> Options { Options::default() }
}
