//! Interface clocks gating the PMIF and the SPMI master.

use log::{debug, error};
use syscall::error::Result;

use crate::error::Error;

pub const PMIF_CLOCK_NAMES: [&str; 3] = ["pmif_sys_ck", "pmif_tmr_ck", "spmimst_clk_mux"];

pub trait Clock: Send + Sync {
    fn name(&self) -> &str;
    fn enable(&self) -> Result<()>;
    fn disable(&self);
}

/// A clock left running by the boot firmware; enabling is a no-op.
#[derive(Debug)]
pub struct FixedClock {
    name: String,
}

impl FixedClock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Clock for FixedClock {
    fn name(&self) -> &str {
        &self.name
    }

    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) {}
}

/// Clocks enabled together and disabled together when dropped.
pub struct ClockSet {
    clocks: Vec<Box<dyn Clock>>,
}

impl ClockSet {
    /// Enable every clock in order. On failure the clocks already enabled are
    /// disabled again and the error is returned.
    pub fn enable_all(clocks: Vec<Box<dyn Clock>>) -> crate::error::Result<Self> {
        for (i, clock) in clocks.iter().enumerate() {
            if let Err(err) = clock.enable() {
                error!("failed to enable clock {}: {}", clock.name(), err);
                for enabled in clocks[..i].iter().rev() {
                    enabled.disable();
                }
                return Err(Error::Clock {
                    name: clock.name().to_string(),
                    errno: err.errno,
                });
            }
            debug!("enabled clock {}", clock.name());
        }
        Ok(Self { clocks })
    }

    pub(crate) fn len(&self) -> usize {
        self.clocks.len()
    }
}

impl Drop for ClockSet {
    fn drop(&mut self) {
        for clock in self.clocks.iter().rev() {
            clock.disable();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use syscall::error::{Error as SysError, EIO};

    struct LoggedClock {
        name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Clock for LoggedClock {
        fn name(&self) -> &str {
            self.name
        }

        fn enable(&self) -> Result<()> {
            if self.fail {
                return Err(SysError::new(EIO));
            }
            self.log.lock().unwrap().push(format!("+{}", self.name));
            Ok(())
        }

        fn disable(&self) {
            self.log.lock().unwrap().push(format!("-{}", self.name));
        }
    }

    fn clocks(fail_at: Option<usize>, log: &Arc<Mutex<Vec<String>>>) -> Vec<Box<dyn Clock>> {
        PMIF_CLOCK_NAMES
            .iter()
            .enumerate()
            .map(|(i, &name)| {
                Box::new(LoggedClock {
                    name,
                    fail: fail_at == Some(i),
                    log: log.clone(),
                }) as Box<dyn Clock>
            })
            .collect()
    }

    #[test]
    fn drop_disables_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = ClockSet::enable_all(clocks(None, &log)).unwrap();
        assert_eq!(set.len(), 3);
        drop(set);
        assert_eq!(
            *log.lock().unwrap(),
            [
                "+pmif_sys_ck",
                "+pmif_tmr_ck",
                "+spmimst_clk_mux",
                "-spmimst_clk_mux",
                "-pmif_tmr_ck",
                "-pmif_sys_ck"
            ]
        );
    }

    #[test]
    fn failed_enable_rolls_back() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = ClockSet::enable_all(clocks(Some(2), &log)).err().unwrap();
        assert_eq!(
            err,
            Error::Clock {
                name: "spmimst_clk_mux".into(),
                errno: EIO
            }
        );
        assert_eq!(
            *log.lock().unwrap(),
            ["+pmif_sys_ck", "+pmif_tmr_ck", "-pmif_tmr_ck", "-pmif_sys_ck"]
        );
    }
}
