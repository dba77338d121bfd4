use std::time::Duration;

use crate::error::{Error, Result};
use crate::regs::{ChannelRegs, ChipVariant};

/// Step between status polls
pub const PMIF_DELAY_US: u64 = 10;
/// Upper bound of every status poll
pub const PMIF_TIMEOUT_US: u64 = 10 * 1000;

/// Per-instance arbiter settings, fixed at probe time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PmifConfig {
    pub variant: ChipVariant,
    pub soc_chan: u32,
    pub poll_delay: Duration,
    pub poll_timeout: Duration,
}

impl PmifConfig {
    pub fn new(variant: ChipVariant) -> Self {
        Self {
            variant,
            soc_chan: variant.default_soc_chan(),
            poll_delay: Duration::from_micros(PMIF_DELAY_US),
            poll_timeout: Duration::from_micros(PMIF_TIMEOUT_US),
        }
    }

    pub fn from_compatible(compatible: &str) -> Result<Self> {
        ChipVariant::from_compatible(compatible)
            .map(Self::new)
            .ok_or_else(|| Error::UnknownCompatible(compatible.to_string()))
    }

    pub fn with_soc_chan(mut self, soc_chan: u32) -> Result<Self> {
        if ChannelRegs::new(soc_chan).is_none() {
            return Err(Error::InvalidChannel(soc_chan));
        }
        self.soc_chan = soc_chan;
        Ok(self)
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }
}
