use core::ffi::{c_char, c_void};
use std::mem::ManuallyDrop;

use crate::common::error::{last_error, set_last_error, OsError};
use crate::common::metadata::FileInfo;
use crate::common::types::*;
use crate::common::wait::WaitOutcome;
use crate::config::{config_from_ffi, Config};
use crate::logging::{self, FsLogCallback};
use crate::natives::{self, RawWatchHandle};
use crate::watch::{self, ChangeWatch};

// Windows paths top out at 32767 UTF-16 units, at most three UTF-8 bytes each.
const MAX_INPUT_PATH_BYTES: usize = 3 * 32 * 1024;

unsafe fn string_view_to_str<'a>(view: *const FsStringView) -> Result<&'a str, FsStatus> {
    let view = view.as_ref().ok_or(FsStatus::InvalidArgument)?;
    if view.ptr.is_null() {
        return if view.len == 0 {
            Ok("")
        } else {
            Err(FsStatus::InvalidArgument)
        };
    }
    if view.len > MAX_INPUT_PATH_BYTES {
        return Err(FsStatus::InvalidArgument);
    }
    let bytes = std::slice::from_raw_parts(view.ptr as *const u8, view.len);
    std::str::from_utf8(bytes).map_err(|_| FsStatus::EncodingError)
}

fn alloc_string(value: &str) -> Option<FsStringView> {
    let ptr = unsafe { libc::malloc(value.len().max(1)) } as *mut u8;
    if ptr.is_null() {
        return None;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(value.as_ptr(), ptr, value.len());
    }
    Some(FsStringView {
        ptr: ptr as *const c_char,
        len: value.len(),
    })
}

fn release_string(view: &mut FsStringView) {
    if !view.ptr.is_null() {
        unsafe {
            libc::free(view.ptr as *mut c_void);
        }
    }
    *view = FsStringView::empty();
}

fn file_info_to_ffi(info: &FileInfo) -> Result<FsFileInfo, OsError> {
    export_file_info(info, alloc_string)
}

/// Copies `info` into the ABI record, allocating its strings with `alloc`.
/// If any allocation fails, the ones already made are released, so a
/// reported symlink always carries its target.
fn export_file_info(
    info: &FileInfo,
    alloc: impl Fn(&str) -> Option<FsStringView>,
) -> Result<FsFileInfo, OsError> {
    let mut out = FsFileInfo::empty();
    if info.exists {
        out.flags |= FSMETA_INFO_EXISTS;
        out.attributes = info.attributes.bits();
        out.last_modified = info.last_modified;
        out.length = info.length;
        out.name = alloc(&info.name).ok_or_else(OsError::out_of_memory)?;
        if let Some(target) = info.link_target() {
            match alloc(target) {
                Some(view) => out.link_target = view,
                None => {
                    release_string(&mut out.name);
                    return Err(OsError::out_of_memory());
                }
            }
        }
    }
    if let Some(code) = info.io_error {
        out.flags |= FSMETA_INFO_IO_ERROR;
        out.io_error = code;
    }
    Ok(out)
}

/// Fills `out_info` for `path`.
///
/// Returns `Ok` when the file exists, `NotFound` when it does not and
/// `IoError` when the lookup failed (the code is in `out_info.io_error`).
/// Release the record with `fsmeta_file_info_free`.
#[no_mangle]
pub extern "C" fn fsmeta_query_metadata(
    path: *const FsStringView,
    out_info: *mut FsFileInfo,
) -> FsStatus {
    let Some(out_info) = (unsafe { out_info.as_mut() }) else {
        set_last_error(OsError::invalid_parameter());
        return FsStatus::InvalidArgument;
    };
    *out_info = FsFileInfo::empty();
    let path = match unsafe { string_view_to_str(path) } {
        Ok(path) => path,
        Err(status) => {
            set_last_error(OsError::invalid_parameter());
            return status;
        }
    };

    let info = natives::query_metadata(path);
    match file_info_to_ffi(&info) {
        Ok(exported) => *out_info = exported,
        Err(err) => {
            out_info.flags = FSMETA_INFO_IO_ERROR;
            out_info.io_error = err.code();
            set_last_error(err);
            return FsStatus::IoError;
        }
    }
    if info.exists {
        FsStatus::Ok
    } else if let Some(code) = info.io_error {
        set_last_error(OsError::from_raw(code));
        FsStatus::IoError
    } else {
        FsStatus::NotFound
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_file_info_free(info: *mut FsFileInfo) {
    let Some(info) = (unsafe { info.as_mut() }) else {
        return;
    };
    release_string(&mut info.name);
    release_string(&mut info.link_target);
}

#[no_mangle]
pub extern "C" fn fsmeta_write_attributes(
    path: *const FsStringView,
    read_only: bool,
    archive: bool,
    hidden: bool,
) -> bool {
    let path = match unsafe { string_view_to_str(path) } {
        Ok(path) => path,
        Err(_) => {
            set_last_error(OsError::invalid_parameter());
            return false;
        }
    };
    match natives::write_attributes(path, read_only, archive, hidden) {
        Ok(()) => true,
        Err(err) => {
            set_last_error(err);
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_supported_attributes() -> u32 {
    natives::supported_attributes().bits()
}

/// Returns the watch handle, or `FSMETA_INVALID_HANDLE` with the cause in
/// `fsmeta_last_error`.
#[no_mangle]
pub extern "C" fn fsmeta_watch_open(
    path: *const FsStringView,
    watch_subtree: bool,
    filter: u32,
) -> i64 {
    let path = match unsafe { string_view_to_str(path) } {
        Ok(path) => path,
        Err(_) => {
            set_last_error(OsError::invalid_parameter());
            return FSMETA_INVALID_HANDLE;
        }
    };
    match ChangeWatch::open(path, watch_subtree, filter) {
        Ok(watch) => watch.into_raw(),
        Err(err) => {
            set_last_error(err);
            FSMETA_INVALID_HANDLE
        }
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_watch_next(handle: i64) -> bool {
    let watch = ManuallyDrop::new(ChangeWatch::from_raw(handle));
    match watch.advance() {
        Ok(()) => true,
        Err(err) => {
            set_last_error(err);
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_watch_close(handle: i64) -> bool {
    match ChangeWatch::from_raw(handle).close() {
        Ok(()) => true,
        Err(err) => {
            set_last_error(err);
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_wait_any(
    handles: *const i64,
    count: u32,
    wait_all: bool,
    timeout_ms: u32,
) -> FsWaitResult {
    let outcome = if handles.is_null() || count == 0 || count > FSMETA_MAXIMUM_WAIT_OBJECTS {
        WaitOutcome::Failed(OsError::invalid_parameter().code())
    } else {
        let handles: &[RawWatchHandle] =
            unsafe { std::slice::from_raw_parts(handles, count as usize) };
        watch::wait_any(handles, wait_all, timeout_ms)
    };
    if let WaitOutcome::Failed(code) = outcome {
        set_last_error(OsError::from_raw(code));
    }
    outcome.to_ffi()
}

/// Error code of the most recent failed call on the calling thread.
#[no_mangle]
pub extern "C" fn fsmeta_last_error() -> u32 {
    last_error()
}

#[no_mangle]
pub extern "C" fn fsmeta_maximum_wait_objects() -> u32 {
    FSMETA_MAXIMUM_WAIT_OBJECTS
}

#[no_mangle]
pub extern "C" fn fsmeta_configure(config: *const FsConfig) -> FsStatus {
    match unsafe { config_from_ffi(config) } {
        Ok(config) => {
            config.apply();
            FsStatus::Ok
        }
        Err(status) => status,
    }
}

#[no_mangle]
pub extern "C" fn fsmeta_current_flags() -> u32 {
    Config::current().flags()
}

#[no_mangle]
pub extern "C" fn fsmeta_free_string(value: FsStringView) {
    let mut value = value;
    release_string(&mut value);
}

#[no_mangle]
pub extern "C" fn fsmeta_log_set_stderr(level: FsLogLevel) -> FsStatus {
    logging::log_set_stderr(level)
}

#[no_mangle]
pub extern "C" fn fsmeta_log_set_callback(
    callback: FsLogCallback,
    user_data: *mut c_void,
    level: FsLogLevel,
) -> FsStatus {
    logging::log_set_callback(callback, user_data, level)
}

#[no_mangle]
pub extern "C" fn fsmeta_log_set_level(level: FsLogLevel) -> FsStatus {
    logging::log_set_level(level)
}

#[no_mangle]
pub extern "C" fn fsmeta_log_disable() -> FsStatus {
    logging::log_disable()
}
