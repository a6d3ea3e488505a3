use core::ffi::c_char;

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FsStatus {
    Ok = 0,
    NotFound = 1,
    IoError = 2,
    PermissionDenied = 3,
    InvalidArgument = 4,
    EncodingError = 5,
}

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FsLogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FsWaitKind {
    Signaled = 0,
    Abandoned = 1,
    Timeout = 2,
    Failed = 3,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct FsStringView {
    pub ptr: *const c_char,
    pub len: usize,
}

impl FsStringView {
    pub const fn empty() -> Self {
        Self {
            ptr: core::ptr::null(),
            len: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct FsConfig {
    pub size: u32,
    pub flags: u32,
    pub reserved: [u64; 6],
}

/// Metadata record filled by `fsmeta_query_metadata`.
///
/// `name` and `link_target` are owned by the library until released with
/// `fsmeta_file_info_free`.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct FsFileInfo {
    pub size: u32,
    pub flags: u32,
    pub attributes: u32,
    pub io_error: u32,
    pub last_modified: i64,
    pub length: u64,
    pub name: FsStringView,
    pub link_target: FsStringView,
    pub reserved: [u64; 4],
}

impl FsFileInfo {
    pub const fn empty() -> Self {
        Self {
            size: core::mem::size_of::<FsFileInfo>() as u32,
            flags: 0,
            attributes: 0,
            io_error: 0,
            last_modified: 0,
            length: 0,
            name: FsStringView::empty(),
            link_target: FsStringView::empty(),
            reserved: [0; 4],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FsWaitResult {
    pub kind: FsWaitKind,
    pub index: u32,
    pub error: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct FsLogRecord {
    pub level: FsLogLevel,
    /// OS error code the record reports, 0 when none.
    pub os_error: u32,
    /// Emitting module below the crate root, e.g. `watch`.
    pub component: FsStringView,
    pub message: FsStringView,
}

pub const FSMETA_ATTR_DIRECTORY: u32 = 1 << 0;
pub const FSMETA_ATTR_READ_ONLY: u32 = 1 << 1;
pub const FSMETA_ATTR_ARCHIVE: u32 = 1 << 2;
pub const FSMETA_ATTR_HIDDEN: u32 = 1 << 3;
pub const FSMETA_ATTR_SYMLINK: u32 = 1 << 4;
pub const FSMETA_ATTR_LINK_TARGET: u32 = 1 << 5;

pub const FSMETA_INFO_EXISTS: u32 = 1 << 0;
pub const FSMETA_INFO_IO_ERROR: u32 = 1 << 1;

pub const FSMETA_NOTIFY_FILE_NAME: u32 = 1 << 0;
pub const FSMETA_NOTIFY_DIR_NAME: u32 = 1 << 1;
pub const FSMETA_NOTIFY_ATTRIBUTES: u32 = 1 << 2;
pub const FSMETA_NOTIFY_SIZE: u32 = 1 << 3;
pub const FSMETA_NOTIFY_LAST_WRITE: u32 = 1 << 4;
pub const FSMETA_NOTIFY_LAST_ACCESS: u32 = 1 << 5;
pub const FSMETA_NOTIFY_CREATION: u32 = 1 << 6;
pub const FSMETA_NOTIFY_SECURITY: u32 = 1 << 7;
pub const FSMETA_NOTIFY_ALL: u32 = (1 << 8) - 1;

pub const FSMETA_FLAG_SKIP_LINK_TARGETS: u32 = 1 << 0;
pub const FSMETA_FLAG_NO_SUBTREE_RESCAN: u32 = 1 << 1;

/// Upper bound on the handle count accepted by `fsmeta_wait_any`.
pub const FSMETA_MAXIMUM_WAIT_OBJECTS: u32 = 64;
/// Timeout value that blocks until a handle is signaled.
pub const FSMETA_INFINITE: u32 = u32::MAX;
pub const FSMETA_INVALID_HANDLE: i64 = -1;
