use std::fmt;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome framebuffer, row-major.
#[derive(Clone)]
pub struct Display {
    mem: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl Display {
    pub fn new() -> Display {
        Display {
            mem: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        for i in self.mem.iter_mut() {
            *i = false;
        }
    }

    /// XORs `sprite` onto the screen, one byte per row, MSB leftmost.
    /// Pixels falling off an edge wrap around to the opposite one.
    ///
    /// Returns whether any lit pixel was turned off.
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision_bit = false;

        for (sy, byte) in sprite.iter().enumerate() {
            let dy = (y + sy) % DISPLAY_HEIGHT;
            for sx in 0..8 {
                let bit_mask = 0b1000_0000 >> sx;
                if (byte & bit_mask) != 0 {
                    let dx = (x + sx) % DISPLAY_WIDTH;
                    let index = dy * DISPLAY_WIDTH + dx;

                    if self.mem[index] {
                        collision_bit = true;
                    }
                    self.mem[index] ^= true;
                }
            }
        }

        collision_bit
    }

    /// Coordinates are taken modulo the screen size.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.mem[(y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + (x % DISPLAY_WIDTH)]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.mem
    }

    pub fn lit_count(&self) -> usize {
        self.mem.iter().filter(|&&on| on).count()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.mem.chunks(DISPLAY_WIDTH) {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Display({} lit)", self.lit_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_sets_pixels_msb_first() {
        let mut display = Display::new();
        let collision = display.draw(0, 0, &[0b1010_0000]);

        assert!(!collision);
        assert!(display.get(0, 0));
        assert!(!display.get(1, 0));
        assert!(display.get(2, 0));
        assert_eq!(display.lit_count(), 2);
    }

    #[test]
    fn redraw_erases_and_reports_collision() {
        let mut display = Display::new();
        display.draw(10, 5, &[0xF0, 0x90]);
        let collision = display.draw(10, 5, &[0xF0, 0x90]);

        assert!(collision);
        assert_eq!(display.lit_count(), 0);
    }

    #[test]
    fn touching_without_overlap_is_not_a_collision() {
        let mut display = Display::new();
        display.draw(0, 0, &[0xF0]);
        assert!(!display.draw(4, 0, &[0xF0]));
        assert_eq!(display.lit_count(), 8);
    }

    #[test]
    fn draw_wraps_around_both_edges() {
        let mut display = Display::new();
        display.draw(62, 31, &[0xF0, 0x80]);

        assert!(display.get(62, 31));
        assert!(display.get(63, 31));
        assert!(display.get(0, 31));
        assert!(display.get(1, 31));
        assert!(display.get(62, 0));
        assert_eq!(display.lit_count(), 5);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut display = Display::new();
        display.draw(3, 3, &[0xFF, 0xFF]);

        display.clear();
        assert_eq!(display.lit_count(), 0);
        display.clear();
        assert!(display.pixels().iter().all(|&on| !on));
    }

    #[test]
    fn renders_as_text() {
        let mut display = Display::new();
        display.draw(0, 0, &[0x80]);
        let text = display.to_string();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), format!("#{}", ".".repeat(63)));
        assert_eq!(text.lines().count(), DISPLAY_HEIGHT);
    }
}
