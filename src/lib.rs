//! A CHIP-8 virtual machine.
//!
//! 16 8-bit data registers named V0 to VF
//! I -> address register (12 bits, held in 16)
//! 16-deep stack of return addresses
//! Delay timer & Sound timer: count down once per executed instruction
//! Display res: 64 width, 32 height, one byte per pixel
//!
//! 35 opcodes, each are 2 bytes (big-endian)
//!      NNN: address
//!      KK: 8-bit constant
//!      N: 4-bit constant
//!      X and Y: 4-bit register identifier
//!
//! The host creates an [`Emulator`], loads a ROM, writes the keypad and calls
//! [`Emulator::step`] at its own cadence, then reads the display back.

pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keypad;
pub mod memory;
pub mod registers;
pub mod timer;

pub use decode::OpCodes;
pub use emulator::{Emulator, Snapshot};
pub use error::Chip8Error;
