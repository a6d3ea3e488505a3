use crate::common::types::{FsWaitKind, FsWaitResult};

// Raw WaitForMultipleObjects return codes.
pub const WAIT_OBJECT_0: u32 = 0x0000_0000;
pub const WAIT_ABANDONED_0: u32 = 0x0000_0080;
pub const WAIT_TIMEOUT: u32 = 0x0000_0102;
pub const WAIT_FAILED: u32 = 0xFFFF_FFFF;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    Signaled(usize),
    Abandoned(usize),
    Timeout,
    Failed(u32),
}

impl WaitOutcome {
    pub fn to_ffi(self) -> FsWaitResult {
        match self {
            WaitOutcome::Signaled(index) => FsWaitResult {
                kind: FsWaitKind::Signaled,
                index: index as u32,
                error: 0,
            },
            WaitOutcome::Abandoned(index) => FsWaitResult {
                kind: FsWaitKind::Abandoned,
                index: index as u32,
                error: 0,
            },
            WaitOutcome::Timeout => FsWaitResult {
                kind: FsWaitKind::Timeout,
                index: 0,
                error: 0,
            },
            WaitOutcome::Failed(code) => FsWaitResult {
                kind: FsWaitKind::Failed,
                index: 0,
                error: code,
            },
        }
    }
}

/// Maps a raw wait return code for `count` handles.
///
/// `last_error` must have been captured right after the wait returned.
pub fn map_wait_code(raw: u32, count: usize, last_error: u32) -> WaitOutcome {
    let count = count as u32;
    if raw >= WAIT_OBJECT_0 && raw < WAIT_OBJECT_0 + count {
        return WaitOutcome::Signaled((raw - WAIT_OBJECT_0) as usize);
    }
    if raw >= WAIT_ABANDONED_0 && raw < WAIT_ABANDONED_0 + count {
        return WaitOutcome::Abandoned((raw - WAIT_ABANDONED_0) as usize);
    }
    if raw == WAIT_TIMEOUT {
        return WaitOutcome::Timeout;
    }
    WaitOutcome::Failed(last_error)
}
