
/// Countdown register decremented at 60 Hz by the driver.
pub struct Timer {
    left: u8,
}

impl Timer {
    pub fn new() -> Timer {
        Timer { left: 0 }
    }

    pub fn step(&mut self, dt: u8) {
        self.left = self.left.saturating_sub(dt);
    }

    pub fn get(&self) -> u8 {
        self.left
    }

    pub fn set(&mut self, ticks: u8) {
        self.left = ticks
    }
}
