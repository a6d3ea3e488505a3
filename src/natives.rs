use crate::common::error::OsError;
use crate::common::metadata::{FileAttributes, FileInfo};
use crate::common::wait::WaitOutcome;
use crate::PlatformNatives;

/// Native handle value as seen by hosts: a Win32 `HANDLE` or a Linux descriptor.
pub type RawWatchHandle = i64;

/// Per-platform primitives behind the public API.
pub trait Natives: Send + Sync {
    fn query_metadata(&self, path: &str) -> FileInfo;

    fn write_attributes(
        &self,
        path: &str,
        read_only: bool,
        archive: bool,
        hidden: bool,
    ) -> Result<(), OsError>;

    fn supported_attributes(&self) -> FileAttributes;

    fn watch_open(
        &self,
        path: &str,
        watch_subtree: bool,
        filter: u32,
    ) -> Result<RawWatchHandle, OsError>;

    fn watch_next(&self, handle: RawWatchHandle) -> Result<(), OsError>;

    fn watch_close(&self, handle: RawWatchHandle) -> Result<(), OsError>;

    /// `handles` is non-empty and within the wait-object limit.
    fn wait(&self, handles: &[RawWatchHandle], wait_all: bool, timeout_ms: u32) -> WaitOutcome;
}

/// Reads existence, type, size, timestamp and attributes of `path`.
///
/// Absence is `exists == false` with no error code; any other lookup failure
/// sets `io_error`. Symbolic-link resolution failures only drop the link data.
pub fn query_metadata(path: &str) -> FileInfo {
    log::trace!("query_metadata {path}");
    PlatformNatives.query_metadata(path)
}

/// Sets or clears the read-only, archive and hidden bits, keeping all others.
pub fn write_attributes(
    path: &str,
    read_only: bool,
    archive: bool,
    hidden: bool,
) -> Result<(), OsError> {
    log::trace!("write_attributes {path} read_only={read_only} archive={archive} hidden={hidden}");
    PlatformNatives.write_attributes(path, read_only, archive, hidden)
}

/// Attribute bits this platform reports and persists.
pub fn supported_attributes() -> FileAttributes {
    PlatformNatives.supported_attributes()
}
