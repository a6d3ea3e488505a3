mod win32;

use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, HANDLE};
use windows_sys::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN,
    FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_REPARSE_POINT, WIN32_FIND_DATAW,
};

use crate::common::error::OsError;
use crate::common::longpath::{encode_long_path, normalize_long_path, LongPath};
use crate::common::metadata::{combine_size, filetime_to_unix_millis, FileAttributes, FileInfo};
use crate::common::reparse::{decode_symlink_target, IO_REPARSE_TAG_SYMLINK};
use crate::common::wait::{map_wait_code, WaitOutcome};
use crate::config::Config;
use crate::natives::{Natives, RawWatchHandle};

pub struct WindowsNatives;

pub(crate) use WindowsNatives as PlatformNatives;

fn decode_find_data(data: &WIN32_FIND_DATAW, path: &LongPath) -> FileInfo {
    let name = win32::wide_slice_from_find_data(&data.cFileName);
    let mut info = FileInfo::existing(
        String::from_utf16_lossy(name),
        filetime_to_unix_millis(combine_size(
            data.ftLastWriteTime.dwHighDateTime,
            data.ftLastWriteTime.dwLowDateTime,
        )),
        combine_size(data.nFileSizeHigh, data.nFileSizeLow),
    );

    let attrs = data.dwFileAttributes;
    if attrs & FILE_ATTRIBUTE_DIRECTORY != 0 {
        info.attributes.insert(FileAttributes::DIRECTORY);
    }
    if attrs & FILE_ATTRIBUTE_READONLY != 0 {
        info.attributes.insert(FileAttributes::READ_ONLY);
    }
    if attrs & FILE_ATTRIBUTE_ARCHIVE != 0 {
        info.attributes.insert(FileAttributes::ARCHIVE);
    }
    if attrs & FILE_ATTRIBUTE_HIDDEN != 0 {
        info.attributes.insert(FileAttributes::HIDDEN);
    }

    // dwReserved0 carries the reparse tag when the reparse bit is set.
    if attrs & FILE_ATTRIBUTE_REPARSE_POINT != 0
        && data.dwReserved0 == IO_REPARSE_TAG_SYMLINK
        && !Config::current().skip_link_targets
    {
        match resolve_symlink(path) {
            Ok(target) => info.set_symlink(target),
            Err(err) => log::debug!(
                os_error = err.code();
                "symlink target of {} unavailable",
                path.to_string_lossy()
            ),
        }
    }
    info
}

fn resolve_symlink(path: &LongPath) -> Result<String, OsError> {
    let buf = win32::read_reparse_point(path)?;
    // The entry may have been replaced since it was listed.
    decode_symlink_target(&buf).ok_or_else(OsError::invalid_parameter)
}

fn apply_attribute_bits(mut attrs: u32, read_only: bool, archive: bool, hidden: bool) -> u32 {
    for (bit, set) in [
        (FILE_ATTRIBUTE_READONLY, read_only),
        (FILE_ATTRIBUTE_ARCHIVE, archive),
        (FILE_ATTRIBUTE_HIDDEN, hidden),
    ] {
        if set {
            attrs |= bit;
        } else {
            attrs &= !bit;
        }
    }
    attrs
}

fn to_handle(raw: RawWatchHandle) -> HANDLE {
    raw as HANDLE
}

impl Natives for WindowsNatives {
    fn query_metadata(&self, path: &str) -> FileInfo {
        let path = normalize_long_path(path);
        // FindFirstFileW cannot enumerate a bare root, and its timestamp is not needed.
        if path.is_drive_root() {
            return FileInfo::root_directory();
        }
        match win32::find_first(&path) {
            Ok(data) => decode_find_data(&data, &path),
            Err(err) if err.code() == ERROR_FILE_NOT_FOUND => FileInfo::absent(),
            Err(err) => FileInfo::with_io_error(err.code()),
        }
    }

    fn write_attributes(
        &self,
        path: &str,
        read_only: bool,
        archive: bool,
        hidden: bool,
    ) -> Result<(), OsError> {
        let path = normalize_long_path(path);
        let attrs = win32::get_file_attributes(&path)?;
        win32::set_file_attributes(&path, apply_attribute_bits(attrs, read_only, archive, hidden))
    }

    fn supported_attributes(&self) -> FileAttributes {
        FileAttributes::READ_ONLY
            | FileAttributes::ARCHIVE
            | FileAttributes::HIDDEN
            | FileAttributes::SYMLINK
            | FileAttributes::LINK_TARGET
    }

    fn watch_open(
        &self,
        path: &str,
        watch_subtree: bool,
        filter: u32,
    ) -> Result<RawWatchHandle, OsError> {
        let path = encode_long_path(path);
        let handle = win32::find_first_change_notification(
            &path,
            watch_subtree,
            win32::native_notify_filter(filter),
        )?;
        Ok(handle as RawWatchHandle)
    }

    fn watch_next(&self, handle: RawWatchHandle) -> Result<(), OsError> {
        win32::find_next_change_notification(to_handle(handle))
    }

    fn watch_close(&self, handle: RawWatchHandle) -> Result<(), OsError> {
        win32::find_close_change_notification(to_handle(handle))
    }

    fn wait(&self, handles: &[RawWatchHandle], wait_all: bool, timeout_ms: u32) -> WaitOutcome {
        let native: Vec<HANDLE> = handles.iter().copied().map(to_handle).collect();
        let (raw, last_error) = win32::wait_for_multiple_objects(&native, wait_all, timeout_ms);
        map_wait_code(raw, native.len(), last_error)
    }
}
