/*!
   Utilities for retrying operations that only eventually succeed.
*/

use core::time::Duration;
use std::thread::sleep;
use tracing::trace;

use crate::error::Error;

/**
   A simplified retry logic for polling state that converges within a
   bounded number of attempts, such as a proposal concluding its voting
   period.
*/
pub fn assert_eventually_succeed<R>(
    task_name: &str,
    attempts: u16,
    interval: Duration,
    task: impl Fn() -> Result<R, Error>,
) -> Result<R, Error> {
    sleep(interval);
    for _ in 0..attempts {
        match task() {
            Ok(res) => return Ok(res),
            Err(e) => {
                trace!("retrying task that failed with error: {}", e);
                sleep(interval)
            }
        }
    }

    Err(Error::retry(task_name.to_string(), attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use eyre::eyre;

    #[test]
    fn succeed_after_failures() {
        let calls = Cell::new(0);

        let result = assert_eventually_succeed("count", 5, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Error::generic(eyre!("not yet")))
            } else {
                Ok(calls.get())
            }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn give_up_after_attempts() {
        let calls = Cell::new(0);

        let result: Result<(), Error> =
            assert_eventually_succeed("never", 4, Duration::from_millis(1), || {
                calls.set(calls.get() + 1);
                Err(Error::generic(eyre!("never")))
            });

        assert!(result.is_err());
        assert_eq!(calls.get(), 4);
    }
}
