use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// # Faults
/// Everything that can go wrong while executing a single instruction.
///
/// None of these are fatal to the machine; the caller decides whether to halt, restart or carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// The opcode isn't mapped, or breaks a structural rule such as a nonzero trailing nibble on 5XY0
    #[error("unknown opcode {opcode:#06X}")]
    UnknownOpcode { opcode: u16 },

    /// A subroutine was called with every stack slot in use
    #[error("stack overflow: call with {depth} return addresses already saved")]
    StackOverflow { depth: usize },

    /// A return was executed with nothing on the stack
    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    /// The program counter ran off the end of memory and was reset to the program start
    #[error("program counter overflowed to {pc:#06X}")]
    PcOverflow { pc: u16 },

    /// An instruction tried to read or write memory through I beyond the end of memory
    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}

/// Why a ROM couldn't be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("ROM {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    TooLarge { size: usize, max_size: usize },

    #[error("unable to read ROM")]
    Io(#[from] io::Error),
}
