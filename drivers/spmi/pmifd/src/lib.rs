//! Driver for the MediaTek PMIC interface (PMIF) arbiter and its SPMI master.
//!
//! The arbiter exposes a software interface channel through which register
//! reads and writes are issued to PMICs on the SPMI bus, and five banks of
//! interrupt event flags reporting protocol violations and watchdogs.

pub mod arbiter;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod irq;
pub mod opcode;
pub mod regs;
pub mod wakeup;

pub use self::arbiter::Pmif;
pub use self::clock::{Clock, ClockSet, FixedClock, PMIF_CLOCK_NAMES};
pub use self::config::PmifConfig;
pub use self::controller::SpmiController;
pub use self::error::{Error, Result, Wait};
pub use self::irq::{IrqEvent, IrqReturn, IrqStats, SpmiRecord};
pub use self::opcode::CommandClass;
pub use self::regs::{ChannelRegs, ChipVariant, IrqBank, PmifReg, SpmiRcsReg, SpmiReg};
