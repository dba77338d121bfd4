//! PMIF interrupt event banks.
//!
//! Each bank is a flag/enable/clear register triple. A handler acknowledges
//! by writing back exactly the flags it read, so a condition raised after
//! the read stays pending for the next invocation.

use std::sync::PoisonError;

use log::{error, info, warn};

use crate::arbiter::Pmif;
use crate::regs::*;

/// Flag bits scanned per bank; bit 31 is reserved.
const IRQ_SCAN_BITS: u32 = 31;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqReturn {
    /// No flag was set, the line belongs to someone else
    None,
    Handled,
}

/// Named hardware conditions reported through the event banks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IrqEvent {
    LatencyLimit,
    HwMonitor,
    Watchdog,
    CmdParityError,
    PmifAccessViolation,
    PmicAccessViolation,
}

impl IrqEvent {
    pub const ALL: [IrqEvent; 6] = [
        IrqEvent::LatencyLimit,
        IrqEvent::HwMonitor,
        IrqEvent::Watchdog,
        IrqEvent::CmdParityError,
        IrqEvent::PmifAccessViolation,
        IrqEvent::PmicAccessViolation,
    ];

    /// Look up the condition behind `bit` of `bank`, if it has a name.
    pub fn lookup(variant: ChipVariant, bank: IrqBank, bit: u32) -> Option<Self> {
        let table: &[(IrqBank, u32, IrqEvent)] = match variant {
            ChipVariant::Mt6873 => &MT6873_EVENTS,
            ChipVariant::Mt8188 => &MT8188_EVENTS,
        };
        table
            .iter()
            .find(|(b, i, _)| *b == bank && *i == bit)
            .map(|(_, _, event)| *event)
    }
}

const MT6873_EVENTS: [(IrqBank, u32, IrqEvent); 6] = [
    (IrqBank::Event3, 6, IrqEvent::LatencyLimit),
    (IrqBank::Event3, 7, IrqEvent::HwMonitor),
    (IrqBank::Event3, 8, IrqEvent::Watchdog),
    (IrqBank::Event3, 17, IrqEvent::CmdParityError),
    (IrqBank::Event3, 20, IrqEvent::PmifAccessViolation),
    (IrqBank::Event3, 21, IrqEvent::PmicAccessViolation),
];

const MT8188_EVENTS: [(IrqBank, u32, IrqEvent); 6] = [
    (IrqBank::Event3, 6, IrqEvent::LatencyLimit),
    (IrqBank::Event3, 17, IrqEvent::CmdParityError),
    (IrqBank::Event3, 18, IrqEvent::HwMonitor),
    (IrqBank::Event3, 19, IrqEvent::Watchdog),
    (IrqBank::Event3, 20, IrqEvent::PmicAccessViolation),
    (IrqBank::Event3, 27, IrqEvent::PmifAccessViolation),
];

/// Trace registers of the SPMI master, captured after an event on bank 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpmiRecord {
    pub rec: [u32; 5],
    /// Command decoder record, MT8188 class only
    pub cmd_dec: Option<u32>,
    pub dec_dbg: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IrqStats {
    handled: [u64; 5],
    events: [u64; 6],
    unknown: u64,
    spurious: u64,
    spmi_records: u64,
    last_spmi_record: Option<SpmiRecord>,
}

impl IrqStats {
    /// Invocations of `bank` that found a flag set.
    pub fn handled(&self, bank: IrqBank) -> u64 {
        self.handled[bank.index()]
    }

    pub fn count(&self, event: IrqEvent) -> u64 {
        self.events[event as usize]
    }

    /// Dispatches to a bit without a named condition.
    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    /// Invocations that found the flag register empty.
    pub fn spurious(&self) -> u64 {
        self.spurious
    }

    pub fn spmi_records(&self) -> u64 {
        self.spmi_records
    }

    pub fn last_spmi_record(&self) -> Option<SpmiRecord> {
        self.last_spmi_record
    }
}

impl Pmif {
    /// Program the event enable register of `bank`.
    pub fn enable_irq_events(&self, bank: IrqBank, mask: u32) {
        let _chan = self.lock_channel();
        self.pmif_write(bank.event_en(), mask);
    }

    pub fn irq_stats(&self) -> IrqStats {
        self.irq
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle one event bank: dispatch the lowest set flag, then clear the
    /// flags that were read.
    pub fn handle_irq(&self, bank: IrqBank) -> IrqReturn {
        let _awake = self.wakeup.stay_awake();
        let mut stats = self.irq.lock().unwrap_or_else(PoisonError::into_inner);

        let flags = {
            let _chan = self.lock_channel();
            self.pmif_read(bank.flag())
        };
        if flags == 0 {
            stats.spurious += 1;
            return IrqReturn::None;
        }
        stats.handled[bank.index()] += 1;

        match (0..IRQ_SCAN_BITS).find(|&bit| flags & (1 << bit) != 0) {
            Some(bit) => self.dispatch(bank, bit, &mut stats),
            None => {
                warn!("{}: flags {:#010x} have no dispatchable bit", bank, flags);
                stats.unknown += 1;
            }
        }

        if bank == IrqBank::Event4 {
            let record = self.drain_spmi_record();
            stats.spmi_records += 1;
            stats.last_spmi_record = Some(record);
        }

        let _chan = self.lock_channel();
        self.pmif_write(bank.clr(), flags);
        IrqReturn::Handled
    }

    /// Handle every bank, as for one interrupt line shared by all of them.
    pub fn handle_pending(&self) -> IrqReturn {
        let mut ret = IrqReturn::None;
        for bank in IrqBank::ALL {
            if self.handle_irq(bank) == IrqReturn::Handled {
                ret = IrqReturn::Handled;
            }
        }
        ret
    }

    fn dispatch(&self, bank: IrqBank, bit: u32, stats: &mut IrqStats) {
        let event = match IrqEvent::lookup(self.variant(), bank, bit) {
            Some(event) => event,
            None => {
                info!("{}: IRQ[{}] triggered, sta {:#010x}", bank, bit, self.channel_sta());
                stats.unknown += 1;
                return;
            }
        };
        stats.events[event as usize] += 1;

        match event {
            IrqEvent::Watchdog => {
                let (flag0, flag1) = {
                    let _chan = self.lock_channel();
                    (
                        self.pmif_read(PmifReg::WdtFlag0),
                        self.pmif_read(PmifReg::WdtFlag1),
                    )
                };
                error!(
                    "{}: pmif watchdog timeout, wdt flags {:#010x} {:#010x}",
                    bank, flag0, flag1
                );
            }
            IrqEvent::HwMonitor => {
                warn!("{}: pmif hw monitor match, sta {:#010x}", bank, self.channel_sta());
            }
            IrqEvent::PmifAccessViolation | IrqEvent::PmicAccessViolation => {
                error!(
                    "{}: {:?}, sta {:#010x}",
                    bank,
                    event,
                    self.channel_sta()
                );
            }
            IrqEvent::LatencyLimit | IrqEvent::CmdParityError => {
                warn!("{}: {:?}", bank, event);
            }
        }
    }

    fn channel_sta(&self) -> u32 {
        let chan = self.lock_channel();
        self.pmif_read(chan.sta)
    }

    fn drain_spmi_record(&self) -> SpmiRecord {
        let _chan = self.lock_channel();
        let mut record = SpmiRecord::default();
        for (value, reg) in record.rec.iter_mut().zip(SpmiReg::RECORDS) {
            *value = self.spmi_read(reg);
        }
        record.cmd_dec = self.spmi_rcs_read(SpmiRcsReg::RecCmdDec);
        record.dec_dbg = self.spmi_rcs_read(SpmiRcsReg::DecDbg);
        self.spmi_write(SpmiReg::RecCtrl, RecordCtrl::all().bits());

        warn!(
            "spmimst rec {:#010x} {:#010x} {:#010x} {:#010x} {:#010x}",
            record.rec[0], record.rec[1], record.rec[2], record.rec[3], record.rec[4]
        );
        if let (Some(cmd_dec), Some(dec_dbg)) = (record.cmd_dec, record.dec_dbg) {
            warn!("spmimst cmd_dec {:#010x} dec_dbg {:#010x}", cmd_dec, dec_dbg);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_tables() {
        assert_eq!(
            IrqEvent::lookup(ChipVariant::Mt6873, IrqBank::Event3, 8),
            Some(IrqEvent::Watchdog)
        );
        assert_eq!(
            IrqEvent::lookup(ChipVariant::Mt8188, IrqBank::Event3, 19),
            Some(IrqEvent::Watchdog)
        );
        assert_eq!(
            IrqEvent::lookup(ChipVariant::Mt6873, IrqBank::Event0, 8),
            None
        );
        for event in IrqEvent::ALL {
            assert!(MT6873_EVENTS.iter().any(|(_, _, e)| *e == event));
            assert!(MT8188_EVENTS.iter().any(|(_, _, e)| *e == event));
        }
    }
}
