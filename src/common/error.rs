use crate::common::types::FsStatus;
use std::cell::Cell;
use std::fmt;

/// Raw OS error code: a Win32 error on Windows, an errno on Linux.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OsError(u32);

#[cfg(target_os = "windows")]
mod codes {
    use windows_sys::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_BAD_PATHNAME, ERROR_DIRECTORY, ERROR_FILE_NOT_FOUND,
        ERROR_INVALID_HANDLE, ERROR_INVALID_NAME, ERROR_INVALID_PARAMETER,
        ERROR_NOT_ENOUGH_MEMORY, ERROR_PATH_NOT_FOUND, ERROR_SHARING_VIOLATION,
    };

    pub const NOT_FOUND: &[u32] = &[ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND];
    pub const DENIED: &[u32] = &[ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION];
    pub const INVALID: &[u32] = &[
        ERROR_INVALID_NAME,
        ERROR_BAD_PATHNAME,
        ERROR_DIRECTORY,
        ERROR_INVALID_HANDLE,
        ERROR_INVALID_PARAMETER,
    ];
    pub const INVALID_PARAMETER: u32 = ERROR_INVALID_PARAMETER;
    pub const INVALID_HANDLE: u32 = ERROR_INVALID_HANDLE;
    pub const OUT_OF_MEMORY: u32 = ERROR_NOT_ENOUGH_MEMORY;
}

#[cfg(target_os = "linux")]
mod codes {
    pub const NOT_FOUND: &[u32] = &[libc::ENOENT as u32];
    pub const DENIED: &[u32] = &[libc::EACCES as u32, libc::EPERM as u32];
    pub const INVALID: &[u32] = &[
        libc::EINVAL as u32,
        libc::ENOTDIR as u32,
        libc::EBADF as u32,
        libc::ENAMETOOLONG as u32,
    ];
    pub const INVALID_PARAMETER: u32 = libc::EINVAL as u32;
    pub const INVALID_HANDLE: u32 = libc::EBADF as u32;
    pub const OUT_OF_MEMORY: u32 = libc::ENOMEM as u32;
}

impl OsError {
    pub const fn from_raw(code: u32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u32 {
        self.0
    }

    pub fn invalid_parameter() -> Self {
        Self(codes::INVALID_PARAMETER)
    }

    pub fn invalid_handle() -> Self {
        Self(codes::INVALID_HANDLE)
    }

    pub fn out_of_memory() -> Self {
        Self(codes::OUT_OF_MEMORY)
    }

    /// Captures the calling thread's last OS error. Call before any other OS call.
    #[cfg(target_os = "windows")]
    pub fn last() -> Self {
        Self(unsafe { windows_sys::Win32::Foundation::GetLastError() })
    }

    #[cfg(target_os = "linux")]
    pub fn last() -> Self {
        Self::from_io(&std::io::Error::last_os_error())
    }

    pub fn from_io(err: &std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self(code as u32),
            None => Self::invalid_parameter(),
        }
    }

    pub fn status(self) -> FsStatus {
        if codes::NOT_FOUND.contains(&self.0) {
            FsStatus::NotFound
        } else if codes::DENIED.contains(&self.0) {
            FsStatus::PermissionDenied
        } else if codes::INVALID.contains(&self.0) {
            FsStatus::InvalidArgument
        } else {
            FsStatus::IoError
        }
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os error {}", self.0)
    }
}

impl std::error::Error for OsError {}

thread_local! {
    static LAST_ERROR: Cell<u32> = const { Cell::new(0) };
}

/// Records the code reported by `fsmeta_last_error` on this thread.
pub fn set_last_error(err: OsError) {
    LAST_ERROR.with(|slot| slot.set(err.code()));
}

pub fn last_error() -> u32 {
    LAST_ERROR.with(|slot| slot.get())
}
