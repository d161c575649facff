use std::path::PathBuf;

use crate::u12;

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

/// Instruction set variant the interpreter decodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The original CHIP-8 instruction set.
    #[default]
    Classic,
    /// CHIP-8 plus the SCHIP exit, large font and RPL flag instructions.
    Super,
}

/// Outcome of a single interpreter cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chip8Result {
    /// The instruction executed and the program counter moved on.
    Continue,
    /// An FX0A instruction found no key pressed; the same instruction runs again next cycle.
    WaitingForKey,
    /// The interpreter is no longer alive (exit instruction or an earlier fatal error).
    Halted,
}

/// Fatal errors raised while executing a program. Each one stops the run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("Unknown opcode {opcode:#06X} at address {pc:#05X}")]
    UnknownOpcode { opcode: u16, pc: u12 },

    #[error("Stack overflow: subroutine call at address {pc:#05X} exceeds 16 nested levels")]
    StackOverflow { pc: u12 },

    #[error("Stack underflow: return at address {pc:#05X} with empty call stack")]
    StackUnderflow { pc: u12 },
}

/// Errors raised while reading a program from disk
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read program {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
