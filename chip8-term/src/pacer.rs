use std::time::Duration;

/// Delay and sound timers count down at 60 Hz.
const TIMERS_PER_SECOND: u32 = 60;

/// Converts elapsed wall-clock time into a number of cycles to execute and
/// timer ticks to apply. Leftover time is carried into the next frame.
pub struct Pacer {
    cycle_period: Duration,
    timer_period: Duration,
    cycle_debt: Duration,
    timer_debt: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Budget {
    pub cycles: u32,
    pub timer_ticks: u32,
}

impl Pacer {
    pub fn new(cycles_per_second: u32) -> Pacer {
        let second = Duration::from_secs(1);
        Pacer {
            cycle_period: second / cycles_per_second.max(1),
            timer_period: second / TIMERS_PER_SECOND,
            cycle_debt: Duration::from_secs(0),
            timer_debt: Duration::from_secs(0),
        }
    }

    pub fn advance(&mut self, dt: Duration) -> Budget {
        self.cycle_debt += dt;
        self.timer_debt += dt;

        Budget {
            cycles: drain(&mut self.cycle_debt, self.cycle_period),
            timer_ticks: drain(&mut self.timer_debt, self.timer_period),
        }
    }
}

fn drain(debt: &mut Duration, period: Duration) -> u32 {
    let periods = (debt.as_nanos() / period.as_nanos()) as u32;
    *debt -= period * periods;
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_at_500_hz() {
        let mut pacer = Pacer::new(500);
        let budget = pacer.advance(Duration::from_secs(1));
        assert_eq!(
            budget,
            Budget {
                cycles: 500,
                timer_ticks: 60,
            }
        );
    }

    #[test]
    fn fractions_carry_over() {
        let mut pacer = Pacer::new(1000);
        // 16.5 ms: 16 cycles, not yet a full timer tick
        let first = pacer.advance(Duration::from_micros(16_500));
        assert_eq!(first.cycles, 16);
        assert_eq!(first.timer_ticks, 0);

        let second = pacer.advance(Duration::from_micros(16_500));
        assert_eq!(second.cycles, 17);
        assert_eq!(second.timer_ticks, 1);
    }

    #[test]
    fn zero_rate_is_clamped() {
        let mut pacer = Pacer::new(0);
        assert_eq!(pacer.advance(Duration::from_millis(2500)).cycles, 2);
    }
}
