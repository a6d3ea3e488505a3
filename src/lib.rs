//! Native file metadata, symbolic-link resolution and directory change
//! notifications, exposed through a C ABI and a safe Rust API.

mod common;
mod config;
mod ffi;
mod logging;
mod natives;
mod watch;

#[cfg(target_os = "windows")]
mod windows_native;
#[cfg(target_os = "windows")]
pub(crate) use windows_native::PlatformNatives;

#[cfg(target_os = "linux")]
mod linux_emulation;
#[cfg(target_os = "linux")]
pub(crate) use linux_emulation::PlatformNatives;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
compile_error!("fsmeta only supports Windows and Linux targets.");

pub use crate::common::error::OsError;
pub use crate::common::longpath::{
    encode_long_path, has_long_path_prefix, normalize_long_path, strip_long_path_prefix, LongPath,
};
pub use crate::common::metadata::{
    combine_size, filetime_to_unix_millis, FileAttributes, FileInfo,
    FILETIME_UNIX_EPOCH_OFFSET_MS,
};
pub use crate::common::reparse::{
    decode_symlink_target, reparse_tag, IO_REPARSE_TAG_SYMLINK, MAXIMUM_REPARSE_DATA_BUFFER_SIZE,
};
pub use crate::common::types::*;
pub use crate::common::wait::{
    map_wait_code, WaitOutcome, WAIT_ABANDONED_0, WAIT_FAILED, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
pub use crate::config::Config;
pub use crate::ffi::*;
pub use crate::logging::FsLogCallback;
pub use crate::natives::{query_metadata, supported_attributes, write_attributes, RawWatchHandle};
pub use crate::watch::{wait_any, ChangeWatch};
