use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::Display;
use crate::instruction::*;
use crate::keypad::Keypad;
use crate::memory::{Memory, FONT_START, GLYPH_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::regfile::RegFile;
use crate::stack::Stack;
use crate::timer::Timer;
use crate::{ErrorKind, Result};

/// Behaviors that differ between interpreters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift Vy into Vx. When unset, Vx is shifted in place.
    pub shift_reads_vy: bool,
    /// `Fx55`/`Fx65` leave I pointing past the last transferred byte.
    pub load_store_advances_i: bool,
}

impl Quirks {
    /// CHIP-48/SCHIP style, expected by most programs written after 1990.
    pub fn modern() -> Quirks {
        Quirks {
            shift_reads_vy: false,
            load_store_advances_i: false,
        }
    }
}

impl Default for Quirks {
    /// Original COSMAC VIP behavior.
    fn default() -> Quirks {
        Quirks {
            shift_reads_vy: true,
            load_store_advances_i: true,
        }
    }
}

pub struct Chip8 {
    memory: Memory,
    gpr: RegFile,
    stack: Stack,
    pc: u16,
    i: u16,
    dt: Timer,
    st: Timer,
    display: Display,
    keypad: Keypad,
    rng: StdRng,
    quirks: Quirks,
    halted: bool,
}

impl Chip8 {
    pub fn new() -> Chip8 {
        Chip8::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Chip8 {
        Chip8::build(quirks, StdRng::from_entropy())
    }

    /// Makes `Cxkk` deterministic.
    pub fn with_seed(seed: u64) -> Chip8 {
        Chip8::build(Quirks::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_quirks_and_seed(quirks: Quirks, seed: u64) -> Chip8 {
        Chip8::build(quirks, StdRng::seed_from_u64(seed))
    }

    fn build(quirks: Quirks, rng: StdRng) -> Chip8 {
        Chip8 {
            memory: Memory::new(),
            gpr: RegFile::new(),
            stack: Stack::new(),
            pc: PROGRAM_START as u16,
            i: 0,
            dt: Timer::new(),
            st: Timer::new(),
            display: Display::new(),
            keypad: Keypad::new(),
            rng,
            quirks,
            halted: false,
        }
    }

    pub fn with_rom(rom_data: &[u8]) -> Result<Chip8> {
        let mut chip8 = Chip8::new();
        chip8.load(rom_data)?;
        Ok(chip8)
    }

    /// Copies the program image to 0x200 and installs the glyph table.
    /// Registers, PC and the display are left alone.
    pub fn load(&mut self, rom_data: &[u8]) -> Result<()> {
        self.memory.load_program(rom_data)?;
        debug!("loaded {} byte program at {:04x}", rom_data.len(), PROGRAM_START);
        Ok(())
    }

    /// Executes exactly one instruction.
    ///
    /// Any fault halts the machine: PC keeps pointing at the offending
    /// instruction and every later call fails with `Halted`.
    pub fn step(&mut self) -> Result<()> {
        if self.halted {
            bail!(ErrorKind::Halted(self.pc));
        }

        let result = self.cycle();
        if let Err(ref e) = result {
            let word = match self.memory.read_u16_be(self.pc as usize) {
                Ok(word) => format!("{:04x}", word),
                Err(_) => "----".to_string(),
            };
            error!("halting at {:04x} (word {}): {}", self.pc, word, e);
            debug!("{:?}", self);
            self.halted = true;
        }
        result
    }

    fn cycle(&mut self) -> Result<()> {
        let instruction_word = InstructionWord(self.memory.read_u16_be(self.pc as usize)?);
        let instruction = Instruction::decode(instruction_word)?;
        trace!("{:04x}: {:04x}  {}", self.pc, instruction_word.0, instruction);

        let next_pc = self.execute_instruction(instruction)?;
        self.pc = next_pc;

        Ok(())
    }

    /// One 60 Hz tick of both timers.
    pub fn tick_timers(&mut self) {
        self.update_timers(1);
    }

    pub fn update_timers(&mut self, ticks: u8) {
        self.dt.step(ticks);
        self.st.step(ticks);
    }

    pub fn set_key(&mut self, index: usize, pressed: bool) -> Result<()> {
        self.keypad.set(index, pressed)
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    fn execute_instruction(&mut self, instruction: Instruction) -> Result<u16> {
        use crate::instruction::Instruction::*;

        let mut next_pc = self.pc + 2;

        match instruction {
            ClearScreen => self.display.clear(),
            Ret => {
                next_pc = self.stack.pop()?;
            }
            Sys(addr) => {
                warn!("ignoring SYS {:03x} at {:04x}", addr.0, self.pc);
            }
            Jump(addr) => {
                next_pc = addr.0;
            }
            Call(addr) => {
                self.stack.push(next_pc)?;
                next_pc = addr.0;
            }
            SkipEqImm { vx, imm, inv } => {
                let equal = self.gpr[vx] == imm.0;
                if equal != inv {
                    next_pc += 2;
                }
            }
            SkipEqReg { vx, vy, inv } => {
                let equal = self.gpr[vx] == self.gpr[vy];
                if equal != inv {
                    next_pc += 2;
                }
            }
            PutImm { vx, imm } => {
                self.gpr[vx] = imm.0;
            }
            AddImm { vx, imm } => {
                let x = self.gpr[vx];
                self.gpr[vx] = x.wrapping_add(imm.0);
            }
            Apply { vx, vy, f } => self.apply(vx, vy, f),
            SetI(addr) => {
                self.i = addr.0;
            }
            JumpPlusV0(addr) => {
                let target = addr.0 as usize + self.gpr[Reg::V0] as usize;
                if target >= MEMORY_SIZE {
                    bail!(ErrorKind::AddressOutOfRange(target));
                }
                next_pc = target as u16;
            }
            Randomize { vx, imm } => {
                let random_byte = self.rng.gen::<u8>();
                self.gpr[vx] = random_byte & imm.0;
            }
            Draw { vx, vy, n } => {
                let x = self.gpr[vx] as usize;
                let y = self.gpr[vy] as usize;

                let collision_bit = {
                    let sprite = self.memory.slice(self.i as usize, n.0 as usize)?;
                    self.display.draw(x, y, sprite)
                };

                self.gpr[Reg::Vf] = if collision_bit { 1 } else { 0 };
            }
            SkipPressed { vx, inv } => {
                let key = self.gpr[vx] as usize;
                if self.keypad.is_pressed(key)? != inv {
                    next_pc += 2;
                }
            }
            GetDT(vx) => {
                self.gpr[vx] = self.dt.get();
            }
            WaitKey(vx) => match self.keypad.first_pressed() {
                Some(key) => self.gpr[vx] = key,
                // Spin on this instruction until a key goes down.
                None => next_pc = self.pc,
            },
            SetDT(vx) => {
                let x = self.gpr[vx];
                self.dt.set(x);
            }
            SetST(vx) => {
                let x = self.gpr[vx];
                self.st.set(x);
            }
            AddI(vx) => {
                let x = self.gpr[vx] as u16;
                self.i = self.i.wrapping_add(x);
            }
            LoadGlyph(vx) => {
                let digit = (self.gpr[vx] & 0x0F) as usize;
                self.i = (FONT_START + digit * GLYPH_SIZE) as u16;
            }
            StoreBCD(vx) => {
                let v = self.gpr[vx];
                let digits = [v / 100, (v / 10) % 10, v % 10];
                self.memory
                    .slice_mut(self.i as usize, digits.len())?
                    .copy_from_slice(&digits);
            }
            StoreRegs(vx) => {
                let count = vx.index() as usize + 1;
                let dest = self.memory.slice_mut(self.i as usize, count)?;
                for (offset, cell) in dest.iter_mut().enumerate() {
                    *cell = self.gpr.read_at_index(offset);
                }
                self.advance_i(count);
            }
            LoadRegs(vx) => {
                let count = vx.index() as usize + 1;
                let src = self.memory.slice(self.i as usize, count)?;
                for (offset, &value) in src.iter().enumerate() {
                    self.gpr.write_at_index(offset, value);
                }
                self.advance_i(count);
            }
        }

        Ok(next_pc)
    }

    fn apply(&mut self, vx: Reg, vy: Reg, f: Fun) {
        let x = self.gpr[vx];
        let y = self.gpr[vy];
        let shift_src = if self.quirks.shift_reads_vy { y } else { x };

        // VF is written last so that it holds the flag even when it is Vx.
        match f {
            Fun::Id => {
                self.gpr[vx] = y;
            }
            Fun::Or => {
                self.gpr[vx] = x | y;
            }
            Fun::And => {
                self.gpr[vx] = x & y;
            }
            Fun::Xor => {
                self.gpr[vx] = x ^ y;
            }
            Fun::Add => {
                let (v, overflow) = x.overflowing_add(y);
                self.gpr[vx] = v;
                self.gpr[Reg::Vf] = if overflow { 1 } else { 0 };
            }
            Fun::Subtract => {
                let (v, borrow) = x.overflowing_sub(y);
                self.gpr[vx] = v;
                self.gpr[Reg::Vf] = if borrow { 0 } else { 1 };
            }
            Fun::ShiftRight => {
                self.gpr[vx] = shift_src >> 1;
                self.gpr[Reg::Vf] = shift_src & 0x01;
            }
            Fun::SubtractInv => {
                let (v, borrow) = y.overflowing_sub(x);
                self.gpr[vx] = v;
                self.gpr[Reg::Vf] = if borrow { 0 } else { 1 };
            }
            Fun::ShiftLeft => {
                self.gpr[vx] = shift_src << 1;
                self.gpr[Reg::Vf] = shift_src >> 7;
            }
        }
    }

    fn advance_i(&mut self, count: usize) {
        if self.quirks.load_store_advances_i {
            self.i = self.i.wrapping_add(count as u16);
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    pub fn reg(&self, reg: Reg) -> u8 {
        self.gpr[reg]
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.st.get()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_beeping(&self) -> bool {
        self.st.get() != 0
    }
}

impl Default for Chip8 {
    fn default() -> Chip8 {
        Chip8::new()
    }
}

impl fmt::Debug for Chip8 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Chip8")
            .field("gpr", &self.gpr)
            .field("pc", &format_args!("{:04x}", self.pc))
            .field("i", &format_args!("{:04x}", self.i))
            .field("dt", &format_args!("{:02x}", self.dt.get()))
            .field("st", &format_args!("{:02x}", self.st.get()))
            .field("stack", &self.stack)
            .field("halted", &self.halted)
            .finish()
    }
}
