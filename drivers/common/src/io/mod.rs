mod mmio_ptr;
mod mmio_region;

pub use self::mmio_ptr::MmioPtr;
pub use self::mmio_region::{MmioRegion, RegisterBlock};

/// A single hardware register
pub trait Io {
    type Value: Copy;

    fn read(&self) -> Self::Value;
    fn write(&mut self, value: Self::Value);
}
