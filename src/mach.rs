use crate::Error;

// Capability hooks the generic driver calls on every backend. This
// target has fixed-width one-word instructions and no long-branch
// rewriting, so most of these have nothing to do.

/// One-time backend setup before pass 1.
pub fn mach_init() {}

/// Whether a displacement needs the long-branch rewrite. Never on this
/// target; the driver reports the out-of-range displacement instead.
pub fn branch_too_long(_dist: i64) -> bool { false }

/// Word size of the long-branch form. Unused while `branch_too_long`
/// is always false, but the driver queries it unconditionally.
pub fn long_branch_size(_dist: i64) -> u32 { 1 }

/// Handle a `-m` machine option. This backend defines none.
pub fn mach_options(arg: &str) -> Result<(), Error> {
    Err(syntax_err!("bad -m option '{}'", arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn no_long_branches() {
        assert!(!branch_too_long(0));
        assert!(!branch_too_long(32767));
        assert_eq!(long_branch_size(32767), 1);
    }

    #[test]
    fn machine_options_are_rejected() {
        let err = mach_options("nd110").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }
}
