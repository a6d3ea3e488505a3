use std::ffi::c_void;

use windows_sys::Win32::Foundation::{CloseHandle, BOOL, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FindClose, FindCloseChangeNotification, FindFirstChangeNotificationW,
    FindFirstFileW, FindNextChangeNotification, GetFileAttributesW, SetFileAttributesW,
    FILE_FLAG_BACKUP_SEMANTICS, FILE_FLAG_OPEN_REPARSE_POINT, FILE_NOTIFY_CHANGE_ATTRIBUTES,
    FILE_NOTIFY_CHANGE_CREATION, FILE_NOTIFY_CHANGE_DIR_NAME, FILE_NOTIFY_CHANGE_FILE_NAME,
    FILE_NOTIFY_CHANGE_LAST_ACCESS, FILE_NOTIFY_CHANGE_LAST_WRITE, FILE_NOTIFY_CHANGE_SECURITY,
    FILE_NOTIFY_CHANGE_SIZE, FILE_READ_EA, FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE,
    INVALID_FILE_ATTRIBUTES, OPEN_EXISTING, WIN32_FIND_DATAW,
};
use windows_sys::Win32::System::Ioctl::FSCTL_GET_REPARSE_POINT;
use windows_sys::Win32::System::Threading::WaitForMultipleObjects;
use windows_sys::Win32::System::IO::DeviceIoControl;

use crate::common::error::OsError;
use crate::common::longpath::LongPath;
use crate::common::reparse::MAXIMUM_REPARSE_DATA_BUFFER_SIZE;
use crate::common::types::*;

/// Closes the wrapped handle on drop.
struct HandleGuard(HANDLE);

impl Drop for HandleGuard {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

pub fn wide_slice_from_find_data(name: &[u16]) -> &[u16] {
    let nul = name.iter().position(|c| *c == 0).unwrap_or(name.len());
    &name[..nul]
}

/// Looks up the directory entry for exactly `path`.
pub fn find_first(path: &LongPath) -> Result<WIN32_FIND_DATAW, OsError> {
    let mut find_data: WIN32_FIND_DATAW = unsafe { std::mem::zeroed() };
    let handle = unsafe { FindFirstFileW(path.as_ptr(), &mut find_data) };
    if handle == INVALID_HANDLE_VALUE {
        return Err(OsError::last());
    }
    unsafe {
        FindClose(handle);
    }
    Ok(find_data)
}

pub fn get_file_attributes(path: &LongPath) -> Result<u32, OsError> {
    let attrs = unsafe { GetFileAttributesW(path.as_ptr()) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        return Err(OsError::last());
    }
    Ok(attrs)
}

pub fn set_file_attributes(path: &LongPath, attrs: u32) -> Result<(), OsError> {
    let ok = unsafe { SetFileAttributesW(path.as_ptr(), attrs) };
    if ok == 0 {
        return Err(OsError::last());
    }
    Ok(())
}

/// Reads the raw reparse data of `path` without following it.
pub fn read_reparse_point(path: &LongPath) -> Result<Vec<u8>, OsError> {
    let handle = unsafe {
        CreateFileW(
            path.as_ptr(),
            FILE_READ_EA,
            FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
            std::ptr::null_mut(),
            OPEN_EXISTING,
            FILE_FLAG_BACKUP_SEMANTICS | FILE_FLAG_OPEN_REPARSE_POINT,
            0,
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(OsError::last());
    }
    let handle = HandleGuard(handle);

    let mut buf = vec![0u8; MAXIMUM_REPARSE_DATA_BUFFER_SIZE];
    let mut returned: u32 = 0;
    let ok = unsafe {
        DeviceIoControl(
            handle.0,
            FSCTL_GET_REPARSE_POINT,
            std::ptr::null(),
            0,
            buf.as_mut_ptr() as *mut c_void,
            buf.len() as u32,
            &mut returned,
            std::ptr::null_mut(),
        )
    };
    if ok == 0 {
        return Err(OsError::last());
    }
    buf.truncate(returned as usize);
    Ok(buf)
}

pub fn native_notify_filter(filter: u32) -> u32 {
    const TABLE: [(u32, u32); 8] = [
        (FSMETA_NOTIFY_FILE_NAME, FILE_NOTIFY_CHANGE_FILE_NAME),
        (FSMETA_NOTIFY_DIR_NAME, FILE_NOTIFY_CHANGE_DIR_NAME),
        (FSMETA_NOTIFY_ATTRIBUTES, FILE_NOTIFY_CHANGE_ATTRIBUTES),
        (FSMETA_NOTIFY_SIZE, FILE_NOTIFY_CHANGE_SIZE),
        (FSMETA_NOTIFY_LAST_WRITE, FILE_NOTIFY_CHANGE_LAST_WRITE),
        (FSMETA_NOTIFY_LAST_ACCESS, FILE_NOTIFY_CHANGE_LAST_ACCESS),
        (FSMETA_NOTIFY_CREATION, FILE_NOTIFY_CHANGE_CREATION),
        (FSMETA_NOTIFY_SECURITY, FILE_NOTIFY_CHANGE_SECURITY),
    ];
    TABLE
        .iter()
        .filter(|(ours, _)| filter & ours != 0)
        .fold(0, |acc, (_, native)| acc | native)
}

pub fn find_first_change_notification(
    path: &LongPath,
    watch_subtree: bool,
    native_filter: u32,
) -> Result<HANDLE, OsError> {
    let handle = unsafe {
        FindFirstChangeNotificationW(path.as_ptr(), watch_subtree as BOOL, native_filter)
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(OsError::last());
    }
    Ok(handle)
}

pub fn find_next_change_notification(handle: HANDLE) -> Result<(), OsError> {
    if unsafe { FindNextChangeNotification(handle) } == 0 {
        return Err(OsError::last());
    }
    Ok(())
}

pub fn find_close_change_notification(handle: HANDLE) -> Result<(), OsError> {
    if unsafe { FindCloseChangeNotification(handle) } == 0 {
        return Err(OsError::last());
    }
    Ok(())
}

/// Returns the raw wait code and the last error captured immediately after it.
pub fn wait_for_multiple_objects(handles: &[HANDLE], wait_all: bool, timeout_ms: u32) -> (u32, u32) {
    let raw = unsafe {
        WaitForMultipleObjects(
            handles.len() as u32,
            handles.as_ptr(),
            wait_all as BOOL,
            timeout_ms,
        )
    };
    let last_error = OsError::last().code();
    (raw, last_error)
}
