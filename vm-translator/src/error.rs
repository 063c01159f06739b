//! Error type shared by the parser and code writer.

use std::fmt;

#[derive(Debug)]
pub enum VmError {
    Io(std::io::Error),
    /// A command could not be classified or is missing required arguments.
    Malformed(String),
    /// `pop constant` has no destination in memory; rejected rather than silently mistranslated.
    PopConstant,
    UnknownSegment(String),
}

impl std::error::Error for VmError {}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Malformed(msg) => write!(f, "malformed command: {msg}"),
            Self::PopConstant => write!(f, "cannot pop into the constant segment"),
            Self::UnknownSegment(s) => write!(f, "unknown segment: {s}"),
        }
    }
}

impl From<std::io::Error> for VmError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
