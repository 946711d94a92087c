use std::fmt;

use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    decode::OpCodes,
    display::{FrameBuffer, MAX_SPRITE_HEIGHT},
    error::Chip8Error,
    keypad::Keypad,
    memory::{self, Memory, TypeAddr},
    registers::{Registers, REGISTER_COUNT},
    timer::Timer,
};

/// The whole machine: registers, memory, stack, timers, keypad and display.
///
/// The host owns it, writes the keypad between cycles and calls `step` at
/// whatever cadence it likes. Everything else is read back through the
/// accessors or a `Snapshot`.
pub struct Emulator {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    keypad: Keypad,
    delay_timer: Timer,
    sound_timer: Timer,
    current_opcode: u16,
    rng: StdRng,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeds the CXKK generator so runs are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            keypad: Keypad::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            current_opcode: 0,
            rng,
        }
    }

    /// Zeroes everything except the font and the keypad.
    pub fn reset(&mut self) {
        self.mem.reset();
        self.reset_cpu();
        debug!("machine reset");
    }

    fn reset_cpu(&mut self) {
        self.regs.reset();
        self.fb.clear_buffer();
        self.delay_timer.set(0);
        self.sound_timer.set(0);
        self.current_opcode = 0;
    }

    /// Resets the machine and copies `rom` to 0x200. An oversized ROM is
    /// rejected with the machine left exactly as it was.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.mem.load_rom(rom)?;
        self.reset_cpu();
        Ok(())
    }

    /// One fetch-decode-execute cycle followed by a timer tick.
    ///
    /// Returns the instruction that ran; unknown opcodes come back as
    /// `OpCodes::Unknown` after executing as a no-op.
    pub fn step(&mut self) -> Result<OpCodes, Chip8Error> {
        let operation = self.fetch_decode()?;
        trace!(
            "{:#05x}: {:04x} {}",
            self.instruction_addr(),
            self.current_opcode,
            operation
        );
        self.execute_ins(operation)?;
        self.sync_timers();
        Ok(operation)
    }

    pub fn fetch_decode(&mut self) -> Result<OpCodes, Chip8Error> {
        let ins = self.mem.next_instruction()?;
        self.current_opcode = ins;
        Ok(OpCodes::decode_raw(ins))
    }

    /// Applies `ins` to the machine. pc is expected to already point past it.
    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<(), Chip8Error> {
        match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::PopSubroutine => {
                let addr = self.mem.stack.pop().ok_or(Chip8Error::StackUnderflow {
                    pc: self.instruction_addr(),
                })?;
                self.mem.set_pc(addr);
            }
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::PushSubroutine(addr) => {
                // pc already points at the return address
                if !self.mem.stack.push(self.mem.pc.0) {
                    return Err(Chip8Error::StackOverflow {
                        pc: self.instruction_addr(),
                    });
                }
                self.mem.set_pc(addr);
            }
            OpCodes::SkipEqualConstant(vx, kk) => {
                if self.regs.get(vx) == kk {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, kk) => {
                if self.regs.get(vx) != kk {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SetRegister(vx, kk) => {
                self.regs.set_register(vx, kk);
            }
            OpCodes::AddToRegister(vx, kk) => {
                self.regs.add_to_register(vx, kk);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) | self.regs.get(vy));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) & self.regs.get(vy));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vx) ^ self.regs.get(vy));
            }
            OpCodes::Add(vx, vy) => {
                let (sum, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_with_flag(vx, sum, carry);
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_with_flag(vx, x.wrapping_sub(y), x > y);
            }
            OpCodes::RightShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_with_flag(vx, x >> 1, x & 1 == 1);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_with_flag(vx, y.wrapping_sub(x), y > x);
            }
            OpCodes::LeftShift(vx, _) => {
                let x = self.regs.get(vx);
                self.regs.set_with_flag(vx, x << 1, x & 0x80 != 0);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::JumpWithOffset(addr) => {
                self.mem.set_pc(addr + self.regs.get(0) as TypeAddr);
            }
            OpCodes::Random(vx, kk) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, kk & ransuu);
            }
            OpCodes::Draw(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                let base = self.mem.index.0;
                let mut sprite = [0u8; MAX_SPRITE_HEIGHT];
                for (row, byte) in sprite.iter_mut().take(height as usize).enumerate() {
                    *byte = self.mem.get(base.wrapping_add(row as TypeAddr));
                }

                let vf = self.fb.paint(x, y, &sprite[..height as usize]) as u8;
                self.regs.set_register(0xF, vf);
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keypad.is_pressed(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.delay_timer.get())
            }
            OpCodes::GetKey(vx) => match self.keypad.last_pressed() {
                Some(key) => self.regs.set_register(vx, key),
                // run this instruction again next cycle
                None => self.mem.decrement_pc(),
            },
            OpCodes::CopyRegisterToDelay(vx) => self.delay_timer.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.sound_timer.set(self.regs.get(vx)),
            OpCodes::AddToIndex(vx) => {
                self.mem.index.add(self.regs.get(vx));
            }
            OpCodes::PointChar(vx) => {
                self.mem.set_index(memory::glyph_addr(self.regs.get(vx)));
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let base = self.mem.index.0;
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set(base.wrapping_add(i as TypeAddr), digit);
                }
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    self.mem.set(base.wrapping_add(reg as TypeAddr), self.regs.get(reg));
                }
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    let reg_val = self.mem.get(base.wrapping_add(reg as TypeAddr));
                    self.regs.set_register(reg, reg_val);
                }
            }
            OpCodes::Unknown(code) => {
                warn!("unknown opcode {:#06x} at {:#05x}", code, self.instruction_addr());
            }
        }
        Ok(())
    }

    pub fn sync_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    // address of the instruction being executed, pc having moved past it
    fn instruction_addr(&self) -> TypeAddr {
        self.mem.pc.0.wrapping_sub(2)
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        self.regs.as_array()
    }

    pub fn program_counter(&self) -> TypeAddr {
        self.mem.pc.0
    }

    pub fn index_register(&self) -> TypeAddr {
        self.mem.index.0
    }

    pub fn stack(&self) -> &[TypeAddr] {
        self.mem.stack.as_slice()
    }

    pub fn stack_pointer(&self) -> usize {
        self.mem.stack.pointer()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.get()
    }

    pub fn current_opcode(&self) -> u16 {
        self.current_opcode
    }

    pub fn display(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    /// Owned copy of everything a renderer or debugger looks at.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.fb.clone(),
            registers: *self.regs.as_array(),
            program_counter: self.mem.pc.0,
            index_register: self.mem.index.0,
            stack: self.mem.stack.as_slice().to_vec(),
            delay_timer: self.delay_timer.get(),
            sound_timer: self.sound_timer.get(),
            current_opcode: self.current_opcode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub display: FrameBuffer,
    pub registers: [u8; REGISTER_COUNT],
    pub program_counter: TypeAddr,
    pub index_register: TypeAddr,
    pub stack: Vec<TypeAddr>,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub current_opcode: u16,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "opcode {:#06x} ({})",
            self.current_opcode,
            OpCodes::decode_raw(self.current_opcode)
        )?;
        writeln!(f, "pc {:#05x}  I {:#05x}", self.program_counter, self.index_register)?;
        for (row, regs) in self.registers.chunks(4).enumerate() {
            for (col, value) in regs.iter().enumerate() {
                write!(f, "V{:X}={:#04x} ", row * 4 + col, value)?;
            }
            writeln!(f)?;
        }
        write!(f, "stack [")?;
        for (i, addr) in self.stack.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{addr:#05x}")?;
        }
        writeln!(f, "] sp {}", self.stack.len())?;
        write!(f, "DT {}  ST {}", self.delay_timer, self.sound_timer)
    }
}

#[cfg(test)]
mod tests;
