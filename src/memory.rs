use log::debug;

use crate::error::Chip8Error;
use crate::registers::{IndexRegister, ProgramCounter};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; FONT_GLYPH_SIZE * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_START: TypeAddr = 0x50;
pub const FONT_GLYPH_SIZE: usize = 5;
pub const STACK_SIZE: usize = 16;

// I-relative accesses wrap on the 12-bit address bus
const ADDR_MASK: TypeAddr = 0x0FFF;

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the 5-byte glyph for hex digit `digit`.
pub fn glyph_addr(digit: u8) -> TypeAddr {
    FONT_START + digit as TypeAddr * FONT_GLYPH_SIZE as TypeAddr
}

#[derive(Clone)]
pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    // program space 200 -> FFF
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = FONT_START as usize;
        bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);

        Self {
            bytes,
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0),
            stack: Stack::new(),
        }
    }

    /// Clears program space, pc, I and the stack. Everything below 0x200,
    /// the font included, is left as is.
    pub fn reset(&mut self) {
        self.bytes[PROGRAM_START as usize..].fill(0);
        self.pc.set_addr(PROGRAM_START);
        self.index.set_addr(0);
        self.stack.clear();
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    pub fn decrement_pc(&mut self) {
        self.pc.decrement();
    }

    /// Reads the big-endian word at pc and advances pc past it.
    pub fn next_instruction(&mut self) -> Result<u16, Chip8Error> {
        let pc = self.pc.0 as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::ProgramCounterOutOfBounds { pc: self.pc.0 });
        }
        let (l, r) = (self.bytes[pc], self.bytes[pc + 1]);
        self.increment_pc();
        Ok(((l as u16) << 8) | r as u16)
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Resets memory and copies `rom` verbatim to 0x200. An oversized ROM is
    /// rejected before anything is touched.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                size: rom.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        self.reset();
        let start = PROGRAM_START as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} bytes at {:#05x}", rom.len(), start);
        Ok(())
    }
}

/// Fixed-depth return address stack.
#[derive(Debug, Clone)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn clear(&mut self) {
        self.addresses = [0; STACK_SIZE];
        self.sp = 0;
    }

    /// Returns false, leaving the stack untouched, when it is already full.
    pub fn push(&mut self, addr: TypeAddr) -> bool {
        if self.sp == STACK_SIZE {
            return false;
        }
        self.addresses[self.sp] = addr;
        self.sp += 1;
        true
    }

    pub fn pop(&mut self) -> Option<TypeAddr> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.addresses[self.sp])
    }

    pub fn pointer(&self) -> usize {
        self.sp
    }

    /// Live entries, oldest first.
    pub fn as_slice(&self) -> &[TypeAddr] {
        &self.addresses[..self.sp]
    }
}
