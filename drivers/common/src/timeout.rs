use std::hint;
use std::time::{Duration, Instant};

pub struct Timeout {
    instant: Instant,
    duration: Duration,
}

impl Timeout {
    #[inline]
    pub fn new(duration: Duration) -> Self {
        Self {
            instant: Instant::now(),
            duration,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.instant.elapsed() >= self.duration
    }
}

/// Busy-wait for `duration` without giving up the CPU.
#[inline]
pub fn spin_delay(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        hint::spin_loop();
    }
}

/// Read a value with `op` until `cond` accepts it, spinning `delay` between
/// reads, for at most `timeout`.
///
/// Like the atomic variant of the kernel helper this never sleeps, so it may
/// be called with a lock held. One final read is taken once the timeout has
/// passed, so a condition met just at the deadline still succeeds.
pub fn read_poll_timeout<T, Op, Cond>(
    mut op: Op,
    cond: Cond,
    delay: Duration,
    timeout: Duration,
) -> Result<T, ()>
where
    Op: FnMut() -> T,
    Cond: Fn(&T) -> bool,
{
    let timeout = Timeout::new(timeout);
    loop {
        let value = op();
        if cond(&value) {
            return Ok(value);
        }
        if timeout.expired() {
            let value = op();
            return if cond(&value) { Ok(value) } else { Err(()) };
        }
        if !delay.is_zero() {
            spin_delay(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn poll_returns_first_accepted_value() {
        let reads = Cell::new(0u32);
        let value = read_poll_timeout(
            || {
                reads.set(reads.get() + 1);
                reads.get()
            },
            |v| *v == 3,
            Duration::from_micros(1),
            Duration::from_millis(100),
        );
        assert_eq!(value, Ok(3));
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn poll_gives_up_after_timeout() {
        let start = Instant::now();
        let res = read_poll_timeout(
            || 0u32,
            |v| *v == 1,
            Duration::from_micros(10),
            Duration::from_millis(5),
        );
        assert_eq!(res, Err(()));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn poll_rechecks_once_at_deadline() {
        let reads = Cell::new(0u32);
        // Condition only becomes true on the read taken after expiry.
        let res = read_poll_timeout(
            || {
                reads.set(reads.get() + 1);
                reads.get()
            },
            |v| *v == 2,
            Duration::ZERO,
            Duration::ZERO,
        );
        assert_eq!(res, Ok(2));
    }

    #[test]
    fn timeout_expires() {
        assert!(Timeout::new(Duration::ZERO).expired());
        assert!(!Timeout::new(Duration::from_secs(60)).expired());
    }
}
