use std::fmt;

use crate::{ErrorKind, Result};

pub const STACK_DEPTH: usize = 16;

/// Return address stack. `sp` is the number of frames in use.
pub struct Stack {
    sp: usize,
    frames: [u16; STACK_DEPTH],
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            sp: 0,
            frames: [0; STACK_DEPTH],
        }
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            bail!(ErrorKind::StackUnderflow);
        }

        self.sp -= 1;
        Ok(self.frames[self.sp])
    }

    pub fn push(&mut self, value: u16) -> Result<()> {
        if self.sp == STACK_DEPTH {
            bail!(ErrorKind::StackOverflow);
        }

        self.frames[self.sp] = value;
        self.sp += 1;
        Ok(())
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let frames: Vec<_> = self.frames[..self.sp]
            .iter()
            .map(|frame| format!("{:04x}", frame))
            .collect();
        f.debug_struct("Stack")
            .field("sp", &self.sp)
            .field("frames", &frames)
            .finish()
    }
}
