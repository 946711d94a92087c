use crate::memory::TypeAddr;

/// Fatal conditions raised by the loader and the fetch-decode-execute cycle.
///
/// Unknown opcodes are not errors: they decode to `OpCodes::Unknown` and
/// execute as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("program counter {pc:#06X} is outside of memory")]
    ProgramCounterOutOfBounds { pc: TypeAddr },

    #[error("stack overflow: call at {pc:#06X} with a full call stack")]
    StackOverflow { pc: TypeAddr },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: TypeAddr },
}
