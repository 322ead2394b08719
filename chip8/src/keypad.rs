use crate::{ErrorKind, Result};

pub const KEY_COUNT: usize = 16;

#[derive(Debug)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn set(&mut self, index: usize, pressed: bool) -> Result<()> {
        let key = self
            .keys
            .get_mut(index)
            .ok_or_else(|| ErrorKind::InvalidKey(index))?;
        *key = pressed;
        Ok(())
    }

    pub fn is_pressed(&self, index: usize) -> Result<bool> {
        self.keys
            .get(index)
            .cloned()
            .ok_or_else(|| ErrorKind::InvalidKey(index).into())
    }

    /// Lowest index among the keys held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|i| i as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn press_and_release() {
        let mut keypad = Keypad::new();
        keypad.set(0xA, true).unwrap();
        assert!(keypad.is_pressed(0xA).unwrap());
        keypad.set(0xA, false).unwrap();
        assert!(!keypad.is_pressed(0xA).unwrap());
    }

    #[test]
    fn first_pressed_prefers_lowest() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_pressed(), None);
        keypad.set(0xC, true).unwrap();
        keypad.set(0x3, true).unwrap();
        assert_eq!(keypad.first_pressed(), Some(0x3));
    }

    #[test]
    fn out_of_range_key() {
        let mut keypad = Keypad::new();
        match keypad.set(16, true) {
            Err(Error(ErrorKind::InvalidKey(16), _)) => {}
            other => panic!("expected InvalidKey, got {:?}", other),
        }
        assert!(keypad.is_pressed(0x20).is_err());
    }
}
