use core::ptr;

use super::Io;

/// A register reached through a raw pointer into a mapped region
pub struct MmioPtr<T> {
    ptr: *mut T,
}

impl<T> MmioPtr<T> {
    /// # Safety
    ///
    /// `ptr` must stay valid and aligned for as long as the value is used.
    pub unsafe fn new(ptr: *mut T) -> Self {
        Self { ptr }
    }
}

// WARNING: requires aligned pointers!
impl<T: Copy> Io for MmioPtr<T> {
    type Value = T;

    fn read(&self) -> T {
        unsafe { ptr::read_volatile(self.ptr) }
    }

    fn write(&mut self, value: T) {
        unsafe { ptr::write_volatile(self.ptr, value) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_access_hits_backing_word() {
        let mut backing: u32 = 0x0000_00F0;
        let mut reg = unsafe { MmioPtr::new(&mut backing as *mut u32) };

        assert_eq!(reg.read(), 0x0000_00F0);
        reg.write(0x0000_00D1);
        assert_eq!(reg.read(), 0x0000_00D1);
    }
}
