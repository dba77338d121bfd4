//! SPMI opcodes and their mapping onto PMIF command classes.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

pub const SPMI_CMD_EXT_WRITE: u8 = 0x00;
pub const SPMI_CMD_RESET: u8 = 0x10;
pub const SPMI_CMD_SLEEP: u8 = 0x11;
pub const SPMI_CMD_SHUTDOWN: u8 = 0x12;
pub const SPMI_CMD_WAKEUP: u8 = 0x13;
pub const SPMI_CMD_EXT_READ: u8 = 0x20;
pub const SPMI_CMD_EXT_WRITEL: u8 = 0x30;
pub const SPMI_CMD_EXT_READL: u8 = 0x38;
pub const SPMI_CMD_WRITE: u8 = 0x40;
pub const SPMI_CMD_READ: u8 = 0x60;
pub const SPMI_CMD_ZERO_WRITE: u8 = 0x80;

/// Highest slave id addressable on the bus
pub const SPMI_MAX_SLAVE_ID: u8 = 0xF;

/// The software interface moves at most one 32-bit data word per command
pub const PMIF_MAX_BYTES: usize = 4;

const CMD_CLASS_SHIFT: u32 = 30;
/// Set in the command word of write transactions
pub const CMD_WRITE: u32 = 1 << 29;
const CMD_SID_SHIFT: u32 = 24;
const CMD_LEN_SHIFT: u32 = 16;

/// Hardware addressing mode of a software interface command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandClass {
    Reg0 = 0,
    Reg = 1,
    ExtReg = 2,
    ExtRegLong = 3,
}

// The read and write opcode spaces are disjoint on the bus. Both extended
// forms go out as EXT_REG_LONG; the arbiter never issues EXT_REG itself.
const READ_CLASSES: [(RangeInclusive<u8>, CommandClass); 3] = [
    (0x60..=0x7F, CommandClass::Reg),
    (0x20..=0x2F, CommandClass::ExtRegLong),
    (0x38..=0x3F, CommandClass::ExtRegLong),
];

const WRITE_CLASSES: [(RangeInclusive<u8>, CommandClass); 4] = [
    (0x40..=0x5F, CommandClass::Reg),
    (0x00..=0x0F, CommandClass::ExtRegLong),
    (0x30..=0x37, CommandClass::ExtRegLong),
    (0x80..=0xFF, CommandClass::Reg0),
];

fn lookup(table: &[(RangeInclusive<u8>, CommandClass)], opc: u8) -> Result<CommandClass> {
    table
        .iter()
        .find(|(range, _)| range.contains(&opc))
        .map(|(_, class)| *class)
        .ok_or(Error::InvalidOpcode(opc))
}

impl CommandClass {
    pub fn for_read(opc: u8) -> Result<Self> {
        lookup(&READ_CLASSES, opc)
    }

    pub fn for_write(opc: u8) -> Result<Self> {
        lookup(&WRITE_CLASSES, opc)
    }

    /// Width of the register address field.
    pub const fn addr_bits(self) -> u32 {
        match self {
            CommandClass::Reg0 => 0,
            CommandClass::Reg => 5,
            CommandClass::ExtReg => 8,
            CommandClass::ExtRegLong => 16,
        }
    }

    /// Largest byte count this class can carry through the software interface.
    pub const fn max_len(self) -> usize {
        match self {
            CommandClass::Reg0 | CommandClass::Reg => 1,
            CommandClass::ExtReg | CommandClass::ExtRegLong => PMIF_MAX_BYTES,
        }
    }

    pub fn check(self, addr: u16, len: usize) -> Result<()> {
        if u32::from(addr) >> self.addr_bits() != 0 {
            return Err(Error::InvalidAddress { class: self, addr });
        }
        if len == 0 || len > self.max_len() {
            return Err(Error::InvalidLength(len));
        }
        Ok(())
    }

    /// Build the word written to `PMIF_SWINF_n_ACC`.
    ///
    /// `len` must already be validated to be in `1..=4`.
    pub fn command_word(self, sid: u8, addr: u16, len: usize, write: bool) -> u32 {
        let mut cmd = ((self as u32) << CMD_CLASS_SHIFT)
            | (u32::from(sid) << CMD_SID_SHIFT)
            | (((len as u32) - 1) << CMD_LEN_SHIFT)
            | u32::from(addr);
        if write {
            cmd |= CMD_WRITE;
        }
        cmd
    }
}
