use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::{ErrorKind, Result};

pub const MEMORY_SIZE: usize = 4096;
/// Where program images are copied to and where execution starts.
pub const PROGRAM_START: usize = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;
/// Where the glyph table lives.
pub const FONT_START: usize = 0x50;
pub const GLYPH_SIZE: usize = 5;

pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            cells: [0; MEMORY_SIZE],
        }
    }

    /// Copies `program` to `PROGRAM_START` and installs the glyph table.
    ///
    /// Nothing is written if the image doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            bail!(ErrorKind::ProgramTooLarge(program.len()));
        }

        self.cells[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
        self.install_font();

        Ok(())
    }

    pub fn install_font(&mut self) {
        let font_memory = &mut self.cells[FONT_START..FONT_START + FONT_SPRITES.len()];
        font_memory.copy_from_slice(&FONT_SPRITES);
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8> {
        self.cells
            .get(addr)
            .cloned()
            .ok_or_else(|| ErrorKind::AddressOutOfRange(addr).into())
    }

    pub fn write_u8(&mut self, addr: usize, value: u8) -> Result<()> {
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or_else(|| ErrorKind::AddressOutOfRange(addr))?;
        *cell = value;
        Ok(())
    }

    /// Reads the big-endian word at `[addr, addr + 1]`.
    pub fn read_u16_be(&self, addr: usize) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok(BigEndian::read_u16(bytes))
    }

    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let end = Self::checked_end(addr, len)?;
        Ok(&self.cells[addr..end])
    }

    pub fn slice_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8]> {
        let end = Self::checked_end(addr, len)?;
        Ok(&mut self.cells[addr..end])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    fn checked_end(addr: usize, len: usize) -> Result<usize> {
        match addr.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(end),
            // Report the first cell that doesn't exist.
            _ => Err(ErrorKind::AddressOutOfRange(addr.max(MEMORY_SIZE)).into()),
        }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Memory({} bytes)", self.cells.len())
    }
}

#[rustfmt::skip]
const FONT_SPRITES: [u8; 16 * GLYPH_SIZE] = [
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind};

    fn out_of_range_at<T>(result: Result<T>) -> Option<usize> {
        match result {
            Err(Error(ErrorKind::AddressOutOfRange(addr), _)) => Some(addr),
            _ => None,
        }
    }

    #[test]
    fn load_places_program_and_font() {
        let mut memory = Memory::new();
        memory.load_program(&[0x60, 0x05, 0x70, 0x03]).unwrap();

        assert_eq!(memory.slice(PROGRAM_START, 4).unwrap(), &[0x60, 0x05, 0x70, 0x03]);
        assert_eq!(memory.slice(FONT_START, 80).unwrap(), &FONT_SPRITES[..]);
        // glyph "F", last one in the table
        assert_eq!(memory.read_u8(0x9F).unwrap(), 0x80);
        assert_eq!(memory.read_u8(0xA0).unwrap(), 0);
    }

    #[test]
    fn load_largest_program() {
        let mut memory = Memory::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        memory.load_program(&program).unwrap();
        assert_eq!(memory.read_u8(MEMORY_SIZE - 1).unwrap(), 0xAB);
    }

    #[test]
    fn oversized_program_leaves_memory_untouched() {
        let mut memory = Memory::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];

        match memory.load_program(&program) {
            Err(Error(ErrorKind::ProgramTooLarge(len), _)) => assert_eq!(len, MAX_PROGRAM_SIZE + 1),
            _ => panic!("expected ProgramTooLarge"),
        }
        assert!(memory.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn word_is_big_endian() {
        let mut memory = Memory::new();
        memory.write_u8(0x300, 0x12).unwrap();
        memory.write_u8(0x301, 0x34).unwrap();
        assert_eq!(memory.read_u16_be(0x300).unwrap(), 0x1234);
    }

    #[test]
    fn accesses_past_the_end_fail() {
        let mut memory = Memory::new();
        assert_eq!(out_of_range_at(memory.read_u8(0x1000)), Some(0x1000));
        assert_eq!(out_of_range_at(memory.write_u8(0x1000, 1)), Some(0x1000));
        assert_eq!(out_of_range_at(memory.read_u16_be(0xFFF)), Some(0x1000));
        assert_eq!(out_of_range_at(memory.slice(0xFFE, 3)), Some(0x1000));
        assert_eq!(out_of_range_at(memory.slice_mut(usize::max_value(), 2)), Some(usize::max_value()));
        assert!(memory.slice(0xFFE, 2).is_ok());
    }
}
