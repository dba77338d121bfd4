//! Register-level model of a PMIF software interface channel and the SPMI
//! master, used to drive the arbiter without hardware.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use common::io::RegisterBlock;
use pmifd::opcode::CMD_WRITE;
use pmifd::{
    ChannelRegs, ChipVariant, Clock, FixedClock, IrqBank, Pmif, PmifConfig, PmifReg, SpmiRcsReg,
    SpmiReg, PMIF_CLOCK_NAMES,
};

/// FSM code reported while a command is on the bus
const SWINF_BUSY: u32 = 0x01;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fsm {
    #[default]
    Idle,
    Busy { polls: u32, read: bool },
    WaitValidClear,
}

impl Fsm {
    fn code(self) -> u32 {
        match self {
            Fsm::Idle => 0x00,
            Fsm::Busy { .. } => SWINF_BUSY,
            Fsm::WaitValidClear => 0x06,
        }
    }

    fn done(read: bool) -> Self {
        if read {
            Fsm::WaitValidClear
        } else {
            Fsm::Idle
        }
    }
}

#[derive(Default)]
pub struct PmifState {
    pub regs: HashMap<usize, u32>,
    pub fsm: Fsm,
    /// Status polls a command stays on the bus
    pub latency: u32,
    /// Ignore ready writes, the channel never leaves `WAIT_VALID_CLEAR`
    pub stuck: bool,
    pub rdata: u32,
    pub commands: Vec<u32>,
    pub wdata: Vec<u32>,
    pub rdy_writes: u32,
    /// Commands issued while another one was still outstanding
    pub overlaps: u32,
    pub writes: Vec<(usize, u32)>,
    pub raise_on_flag_read: Option<(IrqBank, u32)>,
}

pub struct PmifSim {
    variant: ChipVariant,
    chan: ChannelRegs,
    state: Mutex<PmifState>,
}

impl PmifSim {
    pub fn new(variant: ChipVariant, soc_chan: u32) -> Arc<Self> {
        Arc::new(Self {
            variant,
            chan: ChannelRegs::new(soc_chan).expect("invalid channel"),
            state: Mutex::new(PmifState::default()),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, PmifState> {
        self.state.lock().unwrap()
    }

    fn off(&self, reg: PmifReg) -> usize {
        self.variant.pmif_offset(reg)
    }

    pub fn set(&self, reg: PmifReg, value: u32) {
        let offset = self.off(reg);
        self.state().regs.insert(offset, value);
    }

    pub fn get(&self, reg: PmifReg) -> u32 {
        let offset = self.off(reg);
        self.state().regs.get(&offset).copied().unwrap_or(0)
    }

    pub fn raise(&self, bank: IrqBank, bits: u32) {
        let offset = self.off(bank.flag());
        *self.state().regs.entry(offset).or_default() |= bits;
    }

    pub fn flag(&self, bank: IrqBank) -> u32 {
        self.get(bank.flag())
    }

    /// Values written to `reg`, oldest first.
    pub fn writes_to(&self, reg: PmifReg) -> Vec<u32> {
        let offset = self.off(reg);
        self.state()
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn write_offsets(&self) -> Vec<usize> {
        self.state().writes.iter().map(|(o, _)| *o).collect()
    }
}

impl RegisterBlock for PmifSim {
    fn size(&self) -> usize {
        self.variant.pmif_span()
    }

    fn read32(&self, offset: usize) -> u32 {
        let mut s = self.state();
        if offset == self.off(self.chan.sta) {
            let code = s.fsm.code();
            if let Fsm::Busy { polls, read } = s.fsm {
                s.fsm = if polls <= 1 {
                    Fsm::done(read)
                } else {
                    Fsm::Busy {
                        polls: polls - 1,
                        read,
                    }
                };
            }
            return code << 1;
        }
        if offset == self.off(self.chan.rdata) {
            return s.rdata;
        }

        let value = s.regs.get(&offset).copied().unwrap_or(0);
        if let Some((bank, bits)) = s.raise_on_flag_read {
            if offset == self.off(bank.flag()) {
                // Hardware asserts a new condition right after the handler's read
                s.raise_on_flag_read = None;
                *s.regs.entry(offset).or_default() |= bits;
            }
        }
        value
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut s = self.state();
        s.writes.push((offset, value));

        if offset == self.off(self.chan.send) {
            if s.fsm != Fsm::Idle {
                s.overlaps += 1;
            }
            s.commands.push(value);
            let read = value & CMD_WRITE == 0;
            s.fsm = if s.latency == 0 {
                Fsm::done(read)
            } else {
                Fsm::Busy {
                    polls: s.latency,
                    read,
                }
            };
            return;
        }
        if offset == self.off(self.chan.rdy) {
            s.rdy_writes += 1;
            if !s.stuck && s.fsm == Fsm::WaitValidClear {
                s.fsm = Fsm::Idle;
            }
            return;
        }
        if offset == self.off(self.chan.wdata) {
            s.wdata.push(value);
            return;
        }
        for bank in IrqBank::ALL {
            if offset == self.off(bank.clr()) {
                // write 1 to clear
                let flag = self.off(bank.flag());
                *s.regs.entry(flag).or_default() &= !value;
                return;
            }
        }
        s.regs.insert(offset, value);
    }
}

#[derive(Default)]
pub struct SpmiState {
    pub regs: HashMap<usize, u32>,
    /// Status polls the master stays busy after a bus command
    pub latency: u32,
    pub busy_polls: u32,
    pub stuck_busy: bool,
    pub op_ctrl_writes: Vec<u32>,
    pub rec_ctrl_writes: Vec<u32>,
}

pub struct SpmiSim {
    variant: ChipVariant,
    state: Mutex<SpmiState>,
}

impl SpmiSim {
    pub fn new(variant: ChipVariant) -> Arc<Self> {
        Arc::new(Self {
            variant,
            state: Mutex::new(SpmiState::default()),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, SpmiState> {
        self.state.lock().unwrap()
    }

    pub fn set(&self, reg: SpmiReg, value: u32) {
        let offset = self.variant.spmi_offset(reg);
        self.state().regs.insert(offset, value);
    }

    pub fn set_rcs(&self, reg: SpmiRcsReg, value: u32) {
        let offset = self
            .variant
            .spmi_rcs_offset(reg)
            .expect("register not present on this variant");
        self.state().regs.insert(offset, value);
    }
}

impl RegisterBlock for SpmiSim {
    fn size(&self) -> usize {
        self.variant.spmi_span()
    }

    fn read32(&self, offset: usize) -> u32 {
        let mut s = self.state();
        if offset == self.variant.spmi_offset(SpmiReg::OpStSta) {
            if s.stuck_busy {
                return 1;
            }
            if s.busy_polls > 0 {
                s.busy_polls -= 1;
                return 1;
            }
            return 0;
        }
        s.regs.get(&offset).copied().unwrap_or(0)
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut s = self.state();
        if offset == self.variant.spmi_offset(SpmiReg::OpStCtrl) {
            s.op_ctrl_writes.push(value);
            s.busy_polls = s.latency;
            return;
        }
        if offset == self.variant.spmi_offset(SpmiReg::RecCtrl) {
            s.rec_ctrl_writes.push(value);
            return;
        }
        s.regs.insert(offset, value);
    }
}

pub struct Harness {
    pub pmif: Pmif,
    pub sim: Arc<PmifSim>,
    pub spmi: Arc<SpmiSim>,
}

pub fn clocks() -> Vec<Box<dyn Clock>> {
    PMIF_CLOCK_NAMES
        .iter()
        .map(|&name| Box::new(FixedClock::new(name)) as Box<dyn Clock>)
        .collect()
}

pub fn probe_with(config: PmifConfig) -> Harness {
    let sim = PmifSim::new(config.variant, config.soc_chan);
    let spmi = SpmiSim::new(config.variant);
    let pmif = Pmif::probe(
        &config,
        Box::new(sim.clone()),
        Box::new(spmi.clone()),
        clocks(),
    )
    .expect("probe failed");
    Harness { pmif, sim, spmi }
}

pub fn probe(variant: ChipVariant) -> Harness {
    probe_with(PmifConfig::new(variant))
}
