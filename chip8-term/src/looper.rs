use std::{thread, time};

use super::Result;

pub enum Step {
    Cont,
    Done,
}

/// Calls `f` once per `frame_interval` until it reports `Done` or fails.
///
/// With `throttle` unset frames run back to back.
pub fn run_loop<F>(frame_interval: time::Duration, throttle: bool, mut f: F) -> Result<()>
where
    F: FnMut() -> Result<Step>,
{
    loop {
        let frame_start = time::Instant::now();

        match f()? {
            Step::Cont => {
                if !throttle {
                    continue;
                }
                if let Some(delay) = frame_interval.checked_sub(frame_start.elapsed()) {
                    thread::sleep(delay)
                }
            }
            Step::Done => return Ok(()),
        }
    }
}
