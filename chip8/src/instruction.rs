//! Decoding of the two-byte instruction words.

use std::fmt;

use enum_primitive::FromPrimitive;

error_chain! {
    errors {
        UnknownOpcode(word: u16) {
            description("unknown opcode")
            display("unknown opcode {:04x}", word)
        }
    }
}

/// Raw big-endian word as fetched from memory at PC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstructionWord(pub u16);

impl InstructionWord {
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    // A nibble always names a register, so these never actually fail.
    fn vx(self) -> Result<Reg> {
        Reg::from_u8(self.x()).ok_or_else(|| ErrorKind::UnknownOpcode(self.0).into())
    }

    fn vy(self) -> Result<Reg> {
        Reg::from_u8(self.y()).ok_or_else(|| ErrorKind::UnknownOpcode(self.0).into())
    }

    fn addr(self) -> Addr {
        Addr(self.nnn())
    }

    fn imm(self) -> Imm {
        Imm(self.kk())
    }
}

enum_from_primitive! {
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg {
    V0 = 0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    Va,
    Vb,
    Vc,
    Vd,
    Ve,
    Vf,
}
}

impl Reg {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "V{:X}", self.index())
    }
}

/// 12-bit absolute address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Addr(pub u16);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Imm(pub u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Nibble(pub u8);

/// ALU operations of the `8xy?` family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fun {
    Id,
    Or,
    And,
    Xor,
    Add,
    Subtract,
    ShiftRight,
    SubtractInv,
    ShiftLeft,
}

impl Fun {
    fn from_nibble(n: u8) -> Option<Fun> {
        match n {
            0x0 => Some(Fun::Id),
            0x1 => Some(Fun::Or),
            0x2 => Some(Fun::And),
            0x3 => Some(Fun::Xor),
            0x4 => Some(Fun::Add),
            0x5 => Some(Fun::Subtract),
            0x6 => Some(Fun::ShiftRight),
            0x7 => Some(Fun::SubtractInv),
            0xE => Some(Fun::ShiftLeft),
            _ => None,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Fun::Id => "LD",
            Fun::Or => "OR",
            Fun::And => "AND",
            Fun::Xor => "XOR",
            Fun::Add => "ADD",
            Fun::Subtract => "SUB",
            Fun::ShiftRight => "SHR",
            Fun::SubtractInv => "SUBN",
            Fun::ShiftLeft => "SHL",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Ret,
    /// 0nnn, machine code routine. Not supported, executed as a no-op.
    Sys(Addr),
    /// 1nnn
    Jump(Addr),
    /// 2nnn
    Call(Addr),
    /// 3xkk, or 4xkk when `inv` is set.
    SkipEqImm { vx: Reg, imm: Imm, inv: bool },
    /// 5xy0, or 9xy0 when `inv` is set.
    SkipEqReg { vx: Reg, vy: Reg, inv: bool },
    /// 6xkk
    PutImm { vx: Reg, imm: Imm },
    /// 7xkk, wraps without touching VF.
    AddImm { vx: Reg, imm: Imm },
    /// 8xy?
    Apply { vx: Reg, vy: Reg, f: Fun },
    /// Annn
    SetI(Addr),
    /// Bnnn
    JumpPlusV0(Addr),
    /// Cxkk
    Randomize { vx: Reg, imm: Imm },
    /// Dxyn
    Draw { vx: Reg, vy: Reg, n: Nibble },
    /// Ex9E, or ExA1 when `inv` is set.
    SkipPressed { vx: Reg, inv: bool },
    /// Fx07
    GetDT(Reg),
    /// Fx0A
    WaitKey(Reg),
    /// Fx15
    SetDT(Reg),
    /// Fx18
    SetST(Reg),
    /// Fx1E
    AddI(Reg),
    /// Fx29
    LoadGlyph(Reg),
    /// Fx33
    StoreBCD(Reg),
    /// Fx55
    StoreRegs(Reg),
    /// Fx65
    LoadRegs(Reg),
}

impl Instruction {
    pub fn decode(word: InstructionWord) -> Result<Instruction> {
        use self::Instruction::*;

        let unknown = || -> Error { ErrorKind::UnknownOpcode(word.0).into() };

        let instruction = match word.family() {
            0x0 => match word.0 {
                0x00E0 => ClearScreen,
                0x00EE => Ret,
                _ => Sys(word.addr()),
            },
            0x1 => Jump(word.addr()),
            0x2 => Call(word.addr()),
            0x3 => SkipEqImm {
                vx: word.vx()?,
                imm: word.imm(),
                inv: false,
            },
            0x4 => SkipEqImm {
                vx: word.vx()?,
                imm: word.imm(),
                inv: true,
            },
            0x5 if word.n() == 0 => SkipEqReg {
                vx: word.vx()?,
                vy: word.vy()?,
                inv: false,
            },
            0x6 => PutImm {
                vx: word.vx()?,
                imm: word.imm(),
            },
            0x7 => AddImm {
                vx: word.vx()?,
                imm: word.imm(),
            },
            0x8 => Apply {
                vx: word.vx()?,
                vy: word.vy()?,
                f: Fun::from_nibble(word.n()).ok_or_else(unknown)?,
            },
            0x9 if word.n() == 0 => SkipEqReg {
                vx: word.vx()?,
                vy: word.vy()?,
                inv: true,
            },
            0xA => SetI(word.addr()),
            0xB => JumpPlusV0(word.addr()),
            0xC => Randomize {
                vx: word.vx()?,
                imm: word.imm(),
            },
            0xD => Draw {
                vx: word.vx()?,
                vy: word.vy()?,
                n: Nibble(word.n()),
            },
            0xE => match word.kk() {
                0x9E => SkipPressed {
                    vx: word.vx()?,
                    inv: false,
                },
                0xA1 => SkipPressed {
                    vx: word.vx()?,
                    inv: true,
                },
                _ => return Err(unknown()),
            },
            0xF => {
                let vx = word.vx()?;
                match word.kk() {
                    0x07 => GetDT(vx),
                    0x0A => WaitKey(vx),
                    0x15 => SetDT(vx),
                    0x18 => SetST(vx),
                    0x1E => AddI(vx),
                    0x29 => LoadGlyph(vx),
                    0x33 => StoreBCD(vx),
                    0x55 => StoreRegs(vx),
                    0x65 => LoadRegs(vx),
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };

        Ok(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Sys(addr) => write!(f, "SYS 0x{:03x}", addr.0),
            Jump(addr) => write!(f, "JP 0x{:03x}", addr.0),
            Call(addr) => write!(f, "CALL 0x{:03x}", addr.0),
            SkipEqImm { vx, imm, inv } => {
                let mnemonic = if inv { "SNE" } else { "SE" };
                write!(f, "{} {}, 0x{:02x}", mnemonic, vx, imm.0)
            }
            SkipEqReg { vx, vy, inv } => {
                let mnemonic = if inv { "SNE" } else { "SE" };
                write!(f, "{} {}, {}", mnemonic, vx, vy)
            }
            PutImm { vx, imm } => write!(f, "LD {}, 0x{:02x}", vx, imm.0),
            AddImm { vx, imm } => write!(f, "ADD {}, 0x{:02x}", vx, imm.0),
            Apply { vx, vy, f: fun } => write!(f, "{} {}, {}", fun.mnemonic(), vx, vy),
            SetI(addr) => write!(f, "LD I, 0x{:03x}", addr.0),
            JumpPlusV0(addr) => write!(f, "JP V0, 0x{:03x}", addr.0),
            Randomize { vx, imm } => write!(f, "RND {}, 0x{:02x}", vx, imm.0),
            Draw { vx, vy, n } => write!(f, "DRW {}, {}, {}", vx, vy, n.0),
            SkipPressed { vx, inv } => {
                let mnemonic = if inv { "SKNP" } else { "SKP" };
                write!(f, "{} {}", mnemonic, vx)
            }
            GetDT(vx) => write!(f, "LD {}, DT", vx),
            WaitKey(vx) => write!(f, "LD {}, K", vx),
            SetDT(vx) => write!(f, "LD DT, {}", vx),
            SetST(vx) => write!(f, "LD ST, {}", vx),
            AddI(vx) => write!(f, "ADD I, {}", vx),
            LoadGlyph(vx) => write!(f, "LD F, {}", vx),
            StoreBCD(vx) => write!(f, "LD B, {}", vx),
            StoreRegs(vx) => write!(f, "LD [I], {}", vx),
            LoadRegs(vx) => write!(f, "LD {}, [I]", vx),
        }
    }
}
