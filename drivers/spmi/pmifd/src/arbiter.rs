use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use common::io::RegisterBlock;
use common::timeout::read_poll_timeout;
use log::{error, info, trace, warn};

use crate::clock::{Clock, ClockSet};
use crate::config::PmifConfig;
use crate::controller::SpmiController;
use crate::error::{Error, Result, Wait};
use crate::irq::IrqStats;
use crate::opcode::{
    CommandClass, PMIF_MAX_BYTES, SPMI_CMD_RESET, SPMI_CMD_WAKEUP, SPMI_MAX_SLAVE_ID,
};
use crate::regs::*;
use crate::wakeup::WakeSource;

const SPMI_OP_CMD_SHIFT: u32 = 4;

/// One PMIF arbiter and the SPMI master behind it.
///
/// All register sequences of a transaction run with the channel lock held;
/// interrupt handling takes the same lock around its register accesses, so
/// no two of them interleave on the hardware.
pub struct Pmif {
    variant: ChipVariant,
    soc_chan: u32,
    base: Box<dyn RegisterBlock>,
    spmimst_base: Box<dyn RegisterBlock>,
    chan: Mutex<ChannelRegs>,
    pub(crate) irq: Mutex<IrqStats>,
    pub(crate) wakeup: WakeSource,
    poll_delay: Duration,
    poll_timeout: Duration,
    // Dropped last so the clocks outlive every register access
    _clocks: ClockSet,
}

fn check_region(region: &'static str, block: &dyn RegisterBlock, needed: usize) -> Result<()> {
    let size = block.size();
    if size < needed {
        return Err(Error::RegionTooSmall {
            region,
            size,
            needed,
        });
    }
    Ok(())
}

fn check_transfer(sid: u8, len: usize) -> Result<()> {
    if sid & !SPMI_MAX_SLAVE_ID != 0 {
        error!("exceed the max slv id: {:#x}", sid);
        return Err(Error::InvalidSlaveId(sid));
    }
    if len == 0 || len > PMIF_MAX_BYTES {
        error!("pmif supports 1..4 bytes per trans, but: {} requested", len);
        return Err(Error::InvalidLength(len));
    }
    Ok(())
}

impl Pmif {
    pub fn probe(
        config: &PmifConfig,
        base: Box<dyn RegisterBlock>,
        spmimst_base: Box<dyn RegisterBlock>,
        clocks: Vec<Box<dyn Clock>>,
    ) -> Result<Self> {
        let variant = config.variant;
        check_region("pmif", &*base, variant.pmif_span())?;
        check_region("spmimst", &*spmimst_base, variant.spmi_span())?;

        let chan = ChannelRegs::new(config.soc_chan)
            .ok_or(Error::InvalidChannel(config.soc_chan))?;

        let clocks = ClockSet::enable_all(clocks)?;

        info!(
            "{} arbiter on software channel {}, {} clocks",
            variant,
            config.soc_chan,
            clocks.len()
        );

        Ok(Self {
            variant,
            soc_chan: config.soc_chan,
            base,
            spmimst_base,
            chan: Mutex::new(chan),
            irq: Mutex::new(IrqStats::default()),
            wakeup: WakeSource::new("pmif_m_thread"),
            poll_delay: config.poll_delay,
            poll_timeout: config.poll_timeout,
            _clocks: clocks,
        })
    }

    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    pub fn soc_chan(&self) -> u32 {
        self.soc_chan
    }

    pub fn wakeup_source(&self) -> &WakeSource {
        &self.wakeup
    }

    /// Current state of the software interface FSM.
    pub fn swinf_state(&self) -> u32 {
        let chan = self.lock_channel();
        swinf_state(self.pmif_read(chan.sta))
    }

    pub(crate) fn lock_channel(&self) -> MutexGuard<'_, ChannelRegs> {
        // A poisoned lock only means a caller panicked; the registers are still usable
        self.chan.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn pmif_read(&self, reg: PmifReg) -> u32 {
        self.base.read32(self.variant.pmif_offset(reg))
    }

    pub(crate) fn pmif_write(&self, reg: PmifReg, value: u32) {
        self.base.write32(self.variant.pmif_offset(reg), value);
    }

    pub(crate) fn spmi_read(&self, reg: SpmiReg) -> u32 {
        self.spmimst_base.read32(self.variant.spmi_offset(reg))
    }

    pub(crate) fn spmi_write(&self, reg: SpmiReg, value: u32) {
        self.spmimst_base
            .write32(self.variant.spmi_offset(reg), value);
    }

    pub(crate) fn spmi_rcs_read(&self, reg: SpmiRcsReg) -> Option<u32> {
        self.variant
            .spmi_rcs_offset(reg)
            .map(|offset| self.spmimst_base.read32(offset))
    }

    fn poll_swinf(&self, chan: &ChannelRegs, state: u32) -> Result<u32, ()> {
        read_poll_timeout(
            || self.pmif_read(chan.sta),
            |sta| swinf_state(*sta) == state,
            self.poll_delay,
            self.poll_timeout,
        )
    }

    fn is_fsm_vldclr(&self, chan: &ChannelRegs) -> bool {
        swinf_state(self.pmif_read(chan.sta)) == SWINF_WFVLDCLR
    }

    fn wait_for_idle(&self, chan: &ChannelRegs) -> Result<()> {
        if self.poll_swinf(chan, SWINF_IDLE).is_ok() {
            return Ok(());
        }

        // A completed read was never acknowledged; release the channel for
        // the next caller, this request still fails.
        if self.is_fsm_vldclr(chan) {
            warn!("channel {} stuck in SWINF_WFVLDCLR, clearing", self.soc_chan);
            self.pmif_write(chan.rdy, 1);
        }
        error!(
            "failed to wait for SWINF_IDLE, sta {:#010x}",
            self.pmif_read(chan.sta)
        );
        Err(Error::Timeout(Wait::Idle))
    }
}

impl SpmiController for Pmif {
    fn cmd(&self, opc: u8, sid: u8) -> Result<()> {
        if sid & !SPMI_MAX_SLAVE_ID != 0 {
            return Err(Error::InvalidSlaveId(sid));
        }
        if !(SPMI_CMD_RESET..=SPMI_CMD_WAKEUP).contains(&opc) {
            return Err(Error::InvalidOpcode(opc));
        }

        let cmd = u32::from(opc - SPMI_CMD_RESET);
        trace!("spmi cmd {:#x} sid {:#x}", opc, sid);

        let _chan = self.lock_channel();
        self.spmi_write(
            SpmiReg::OpStCtrl,
            (cmd << SPMI_OP_CMD_SHIFT) | u32::from(sid),
        );
        read_poll_timeout(
            || OpStatus::from_bits_truncate(self.spmi_read(SpmiReg::OpStSta)),
            |status| !status.contains(OpStatus::BUSY),
            self.poll_delay,
            self.poll_timeout,
        )
        .map_err(|()| {
            error!(
                "timeout on spmi cmd {:#x}, sta {:#010x}",
                opc,
                self.spmi_read(SpmiReg::OpStSta)
            );
            Error::Timeout(Wait::BusCommand)
        })?;
        Ok(())
    }

    fn read_cmd(&self, opc: u8, sid: u8, addr: u16, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        check_transfer(sid, len)?;
        let class = CommandClass::for_read(opc)?;
        class.check(addr, len)?;

        let chan = self.lock_channel();

        // Wait for Software Interface FSM state to be IDLE
        self.wait_for_idle(&chan)?;

        let cmd = class.command_word(sid, addr, len, false);
        trace!("pmif read sid {:#x} addr {:#06x} len {}: cmd {:#010x}", sid, addr, len, cmd);
        self.pmif_write(chan.send, cmd);

        // Wait for the data to become valid
        self.poll_swinf(&chan, SWINF_WFVLDCLR).map_err(|()| {
            error!(
                "failed to wait for SWINF_WFVLDCLR, sta {:#010x}",
                self.pmif_read(chan.sta)
            );
            Error::Timeout(Wait::ValidClear)
        })?;

        let data = self.pmif_read(chan.rdata);
        buf.copy_from_slice(&data.to_le_bytes()[..len]);
        self.pmif_write(chan.rdy, 1);

        trace!("got: {:#010x}", data);
        Ok(())
    }

    fn write_cmd(&self, opc: u8, sid: u8, addr: u16, buf: &[u8]) -> Result<()> {
        let len = buf.len();
        check_transfer(sid, len)?;
        let class = CommandClass::for_write(opc)?;
        class.check(addr, len)?;

        let mut bytes = [0; PMIF_MAX_BYTES];
        bytes[..len].copy_from_slice(buf);
        let wdata = u32::from_le_bytes(bytes);

        let chan = self.lock_channel();

        // Wait for Software Interface FSM state to be IDLE
        self.wait_for_idle(&chan)?;

        self.pmif_write(chan.wdata, wdata);

        // The next transaction's idle wait orders it after this one
        let cmd = class.command_word(sid, addr, len, true);
        trace!(
            "pmif write sid {:#x} addr {:#06x} len {}: cmd {:#010x} data {:#010x}",
            sid,
            addr,
            len,
            cmd,
            wdata
        );
        self.pmif_write(chan.send, cmd);

        Ok(())
    }
}
