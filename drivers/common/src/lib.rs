//! Helpers shared by the userspace drivers: register access, bounded
//! polling and logging setup.

pub mod io;
pub mod logger;
pub mod timeout;

pub use logger::{output_level, setup_logging};

use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr;

use syscall::error::{Error, Result, EINVAL, EIO};

fn page_size() -> usize {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        size if size > 0 => size as usize,
        _ => 4096,
    }
}

/// Map `size` bytes of physical memory starting at `phys` through `/dev/mem`.
///
/// The mapping is uncached (`O_SYNC`) and must be released with [`physunmap`].
///
/// # Safety
///
/// The caller must ensure that `phys..phys + size` is a device register
/// range that is safe to access from userspace.
pub unsafe fn physmap(phys: usize, size: usize) -> Result<*mut u8> {
    if size == 0 || phys % page_size() != 0 {
        return Err(Error::new(EINVAL));
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open("/dev/mem")
        .map_err(|err| Error::new(err.raw_os_error().unwrap_or(EIO)))?;

    let virt = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            file.as_raw_fd(),
            phys as libc::off_t,
        )
    };
    if virt == libc::MAP_FAILED {
        let err = std::io::Error::last_os_error();
        return Err(Error::new(err.raw_os_error().unwrap_or(EIO)));
    }

    Ok(virt as *mut u8)
}

/// Release a mapping created by [`physmap`].
///
/// # Safety
///
/// `virt` and `size` must come from a successful [`physmap`] call and the
/// mapping must not be used afterwards.
pub unsafe fn physunmap(virt: *mut u8, size: usize) {
    let _ = unsafe { libc::munmap(virt as *mut libc::c_void, size) };
}
