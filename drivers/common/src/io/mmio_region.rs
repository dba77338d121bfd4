use core::mem;
use std::sync::Arc;

use syscall::error::{Error, Result, ERANGE};

use super::{Io, MmioPtr};

/// A window of 32-bit registers addressed by byte offset.
///
/// Offsets handed to `read32`/`write32` are expected to have been checked
/// against [`RegisterBlock::size`] when the window was set up; an access past
/// the end is a driver bug, not a runtime condition.
pub trait RegisterBlock: Send + Sync {
    fn size(&self) -> usize;
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for Arc<T> {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Physical register range mapped into this process.
#[derive(Debug)]
pub struct MmioRegion {
    phys: usize,
    virt: usize,
    size: usize,
}

impl MmioRegion {
    pub fn new(phys: usize, size: usize) -> Result<Self> {
        let virt = unsafe { crate::physmap(phys, size)? as usize };
        Ok(Self { phys, virt, size })
    }

    /// # Safety
    ///
    /// The returned pointer must not outlive `self`.
    pub unsafe fn mmio(&self, offset: usize) -> Result<MmioPtr<u32>> {
        // Any errors here will return ERANGE
        let err = Error::new(ERANGE);
        if offset % mem::align_of::<u32>() != 0 {
            return Err(err);
        }
        if offset.checked_add(mem::size_of::<u32>()).ok_or(err)? > self.size {
            return Err(err);
        }
        let addr = self.virt.checked_add(offset).ok_or(err)?;
        Ok(unsafe { MmioPtr::new(addr as *mut u32) })
    }
}

impl RegisterBlock for MmioRegion {
    fn size(&self) -> usize {
        self.size
    }

    fn read32(&self, offset: usize) -> u32 {
        match unsafe { self.mmio(offset) } {
            Ok(reg) => reg.read(),
            Err(_) => {
                log::error!(
                    "read of offset {:#x} outside region {:#x}+{:#x}",
                    offset,
                    self.phys,
                    self.size
                );
                u32::MAX
            }
        }
    }

    fn write32(&self, offset: usize, value: u32) {
        match unsafe { self.mmio(offset) } {
            Ok(mut reg) => reg.write(value),
            Err(_) => log::error!(
                "write of offset {:#x} outside region {:#x}+{:#x}",
                offset,
                self.phys,
                self.size
            ),
        }
    }
}

impl Drop for MmioRegion {
    fn drop(&mut self) {
        unsafe {
            crate::physunmap(self.virt as *mut u8, self.size);
        }
    }
}
