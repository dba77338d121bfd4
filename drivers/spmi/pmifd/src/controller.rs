//! The contract an SPMI bus controller offers to the bus core.

use crate::error::Result;
use crate::opcode::*;

pub trait SpmiController {
    /// Issue a bus command (reset, sleep, shutdown, wakeup) to a slave.
    fn cmd(&self, opc: u8, sid: u8) -> Result<()>;

    /// Read `buf.len()` bytes starting at `addr` using SPMI opcode `opc`.
    fn read_cmd(&self, opc: u8, sid: u8, addr: u16, buf: &mut [u8]) -> Result<()>;

    /// Write `buf` starting at `addr` using SPMI opcode `opc`.
    fn write_cmd(&self, opc: u8, sid: u8, addr: u16, buf: &[u8]) -> Result<()>;

    fn command_reset(&self, sid: u8) -> Result<()> {
        self.cmd(SPMI_CMD_RESET, sid)
    }

    fn command_sleep(&self, sid: u8) -> Result<()> {
        self.cmd(SPMI_CMD_SLEEP, sid)
    }

    fn command_wakeup(&self, sid: u8) -> Result<()> {
        self.cmd(SPMI_CMD_WAKEUP, sid)
    }

    fn command_shutdown(&self, sid: u8) -> Result<()> {
        self.cmd(SPMI_CMD_SHUTDOWN, sid)
    }

    /// Single byte read from the 5-bit register space.
    fn register_read(&self, sid: u8, addr: u8) -> Result<u8> {
        let mut buf = [0];
        self.read_cmd(SPMI_CMD_READ, sid, addr.into(), &mut buf)?;
        Ok(buf[0])
    }

    fn register_write(&self, sid: u8, addr: u8, data: u8) -> Result<()> {
        self.write_cmd(SPMI_CMD_WRITE, sid, addr.into(), &[data])
    }

    /// Write register 0; only the low seven bits of `data` reach the slave.
    fn register_zero_write(&self, sid: u8, data: u8) -> Result<()> {
        self.write_cmd(SPMI_CMD_ZERO_WRITE, sid, 0, &[data])
    }

    fn ext_register_read(&self, sid: u8, addr: u8, buf: &mut [u8]) -> Result<()> {
        self.read_cmd(SPMI_CMD_EXT_READ, sid, addr.into(), buf)
    }

    fn ext_register_write(&self, sid: u8, addr: u8, buf: &[u8]) -> Result<()> {
        self.write_cmd(SPMI_CMD_EXT_WRITE, sid, addr.into(), buf)
    }

    fn ext_register_readl(&self, sid: u8, addr: u16, buf: &mut [u8]) -> Result<()> {
        self.read_cmd(SPMI_CMD_EXT_READL, sid, addr, buf)
    }

    fn ext_register_writel(&self, sid: u8, addr: u16, buf: &[u8]) -> Result<()> {
        self.write_cmd(SPMI_CMD_EXT_WRITEL, sid, addr, buf)
    }
}
