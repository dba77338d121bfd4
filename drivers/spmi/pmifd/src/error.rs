use std::fmt;

use syscall::error::{EINVAL, EIO, ENODEV, ERANGE, ETIMEDOUT};

use crate::opcode::CommandClass;

/// Which poll of a transaction ran out of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Channel never returned to `SWINF_IDLE`
    Idle,
    /// Read data never became valid (`SWINF_WFVLDCLR`)
    ValidClear,
    /// SPMI master stayed busy after a bus command
    BusCommand,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidSlaveId(u8),
    InvalidLength(usize),
    InvalidOpcode(u8),
    InvalidAddress { class: CommandClass, addr: u16 },
    InvalidChannel(u32),
    UnknownCompatible(String),
    RegionTooSmall {
        region: &'static str,
        size: usize,
        needed: usize,
    },
    Clock { name: String, errno: i32 },
    Timeout(Wait),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Errno reported to the SPMI bus layer.
    pub fn errno(&self) -> i32 {
        match self {
            Error::InvalidSlaveId(_)
            | Error::InvalidLength(_)
            | Error::InvalidOpcode(_)
            | Error::InvalidAddress { .. }
            | Error::InvalidChannel(_) => EINVAL,
            Error::UnknownCompatible(_) => ENODEV,
            Error::RegionTooSmall { .. } => ERANGE,
            Error::Clock { errno, .. } if *errno > 0 => *errno,
            Error::Clock { .. } => EIO,
            Error::Timeout(_) => ETIMEDOUT,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSlaveId(sid) => write!(f, "slave id {sid:#x} exceeds the max slv id"),
            Error::InvalidLength(len) => {
                write!(f, "pmif supports 1..4 bytes per trans, but {len} requested")
            }
            Error::InvalidOpcode(opc) => write!(f, "unsupported opcode {opc:#04x}"),
            Error::InvalidAddress { class, addr } => {
                write!(f, "address {addr:#06x} does not fit {class:?} command")
            }
            Error::InvalidChannel(chan) => write!(f, "software channel {chan} does not exist"),
            Error::UnknownCompatible(compat) => write!(f, "no match data for {compat:?}"),
            Error::RegionTooSmall {
                region,
                size,
                needed,
            } => write!(f, "{region} region is {size:#x} bytes, need {needed:#x}"),
            Error::Clock { name, errno } => {
                write!(f, "failed to enable clock {name} (errno {errno})")
            }
            Error::Timeout(Wait::Idle) => f.write_str("timeout waiting for SWINF_IDLE"),
            Error::Timeout(Wait::ValidClear) => f.write_str("timeout waiting for SWINF_WFVLDCLR"),
            Error::Timeout(Wait::BusCommand) => f.write_str("timeout waiting for SPMI master"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for syscall::Error {
    fn from(err: Error) -> Self {
        syscall::Error::new(err.errno())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_contract() {
        assert_eq!(Error::InvalidOpcode(0x14).errno(), EINVAL);
        assert_eq!(Error::InvalidSlaveId(0x10).errno(), EINVAL);
        assert_eq!(Error::Timeout(Wait::Idle).errno(), ETIMEDOUT);
        assert_eq!(
            syscall::Error::from(Error::Timeout(Wait::ValidClear)),
            syscall::Error::new(ETIMEDOUT)
        );
        assert_eq!(
            Error::Clock {
                name: "pmif_sys_ck".into(),
                errno: 0
            }
            .errno(),
            EIO
        );
    }
}
