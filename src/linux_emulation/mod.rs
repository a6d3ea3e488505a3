//! Emulation of the Win32 natives on Linux.
//!
//! Metadata comes from `lstat`/`stat`, change notifications from inotify.
//! Archive and hidden bits have no representation and are never reported.

pub mod inotify;
pub mod metadata;

use crate::common::error::OsError;
use crate::common::metadata::{FileAttributes, FileInfo};
use crate::common::wait::WaitOutcome;
use crate::natives::{Natives, RawWatchHandle};

pub struct LinuxNatives;

pub(crate) use LinuxNatives as PlatformNatives;

impl Natives for LinuxNatives {
    fn query_metadata(&self, path: &str) -> FileInfo {
        metadata::query_metadata(path)
    }

    fn write_attributes(
        &self,
        path: &str,
        read_only: bool,
        archive: bool,
        hidden: bool,
    ) -> Result<(), OsError> {
        metadata::write_attributes(path, read_only, archive, hidden)
    }

    fn supported_attributes(&self) -> FileAttributes {
        FileAttributes::READ_ONLY | FileAttributes::SYMLINK | FileAttributes::LINK_TARGET
    }

    fn watch_open(
        &self,
        path: &str,
        watch_subtree: bool,
        filter: u32,
    ) -> Result<RawWatchHandle, OsError> {
        inotify::open(path, watch_subtree, filter)
    }

    fn watch_next(&self, handle: RawWatchHandle) -> Result<(), OsError> {
        inotify::advance(handle)
    }

    fn watch_close(&self, handle: RawWatchHandle) -> Result<(), OsError> {
        inotify::close(handle)
    }

    fn wait(&self, handles: &[RawWatchHandle], wait_all: bool, timeout_ms: u32) -> WaitOutcome {
        inotify::wait(handles, wait_all, timeout_ms)
    }
}
