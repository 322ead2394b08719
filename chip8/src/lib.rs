// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

extern crate byteorder;
extern crate rand;
#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

mod keypad;
mod memory;
mod regfile;
mod stack;
mod timer;
mod vm;

pub mod display;
pub mod instruction;

pub use self::display::Display;
pub use self::instruction::{Instruction, InstructionWord, Reg};
pub use self::memory::{Memory, FONT_START, MEMORY_SIZE, PROGRAM_START, MAX_PROGRAM_SIZE};
pub use self::vm::{Chip8, Quirks};

error_chain! {
    links {
        Instruction(instruction::Error, instruction::ErrorKind);
    }

    errors {
        ProgramTooLarge(len: usize) {
            description("program image does not fit into memory")
            display("program image is {} bytes, at most {} fit", len, MAX_PROGRAM_SIZE)
        }
        AddressOutOfRange(addr: usize) {
            description("address out of range")
            display("address {:04x} is outside of memory", addr)
        }
        StackOverflow {
            description("call stack overflow")
        }
        StackUnderflow {
            description("return with empty call stack")
        }
        InvalidKey(index: usize) {
            description("invalid key index")
            display("key index {:x} is out of range", index)
        }
        Halted(pc: u16) {
            description("machine is halted")
            display("machine halted at {:04x}", pc)
        }
    }
}
