#![allow(unused_macros)]
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}

macro_rules! syntax_err {
    ($($p:expr),+) => {
        crate::Error::new(
            crate::ErrorKind::Syntax,
            format!("{}: {}", red!("syntax error"), format_args!($($p),+)).as_str(),
        )
    };
}
macro_rules! range_err {
    ($($p:expr),+) => {
        crate::Error::new(
            crate::ErrorKind::Range,
            format!("{}: {}", red!("range error"), format_args!($($p),+)).as_str(),
        )
    };
}
macro_rules! reference_err {
    ($($p:expr),+) => {
        crate::Error::new(
            crate::ErrorKind::Reference,
            format!("{}: {}", red!("reference error"), format_args!($($p),+)).as_str(),
        )
    };
}
macro_rules! segment_err {
    ($($p:expr),+) => {
        crate::Error::new(
            crate::ErrorKind::Segment,
            format!("{}: {}", red!("segment error"), format_args!($($p),+)).as_str(),
        )
    };
}
macro_rules! internal_err {
    ($($p:expr),+) => {
        crate::Error::new(
            crate::ErrorKind::Internal,
            format!("{}: {}", red!("internal error"), format_args!($($p),+)).as_str(),
        )
    };
}
