use crate::common::error::OsError;
use crate::common::types::FSMETA_MAXIMUM_WAIT_OBJECTS;
use crate::common::wait::WaitOutcome;
use crate::natives::{Natives, RawWatchHandle};
use crate::PlatformNatives;

/// A directory change notification.
///
/// The handle is signaled when a change matching the filter happens below the
/// directory and stays signaled until [`ChangeWatch::advance`] re-arms it.
/// Dropping the watch closes it. Closing while another thread waits on the
/// same handle is not supported.
#[derive(Debug)]
pub struct ChangeWatch {
    handle: RawWatchHandle,
}

impl ChangeWatch {
    /// Opens a watch on `path`; `filter` is a set of `FSMETA_NOTIFY_*` bits.
    pub fn open(path: &str, watch_subtree: bool, filter: u32) -> Result<Self, OsError> {
        log::trace!("watch_open {path} subtree={watch_subtree} filter={filter:#x}");
        let handle = PlatformNatives.watch_open(path, watch_subtree, filter)?;
        Ok(Self { handle })
    }

    /// Takes ownership of a handle previously released with [`ChangeWatch::into_raw`].
    pub fn from_raw(handle: RawWatchHandle) -> Self {
        Self { handle }
    }

    pub fn into_raw(self) -> RawWatchHandle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }

    pub fn raw(&self) -> RawWatchHandle {
        self.handle
    }

    /// Marks the current notification consumed and arms the next one.
    pub fn advance(&self) -> Result<(), OsError> {
        PlatformNatives.watch_next(self.handle)
    }

    pub fn close(self) -> Result<(), OsError> {
        PlatformNatives.watch_close(self.into_raw())
    }

    pub fn wait(&self, timeout_ms: u32) -> WaitOutcome {
        wait_any(&[self.handle], false, timeout_ms)
    }
}

impl Drop for ChangeWatch {
    fn drop(&mut self) {
        if let Err(err) = PlatformNatives.watch_close(self.handle) {
            log::warn!(os_error = err.code(); "closing change watch {} failed", self.handle);
        }
    }
}

/// Blocks until one handle (or all, with `wait_all`) is signaled or
/// `timeout_ms` elapses. `FSMETA_INFINITE` waits forever.
///
/// Between one and `FSMETA_MAXIMUM_WAIT_OBJECTS` handles are accepted; any
/// other count fails without waiting.
pub fn wait_any(handles: &[RawWatchHandle], wait_all: bool, timeout_ms: u32) -> WaitOutcome {
    if handles.is_empty() || handles.len() > FSMETA_MAXIMUM_WAIT_OBJECTS as usize {
        return WaitOutcome::Failed(OsError::invalid_parameter().code());
    }
    let outcome = PlatformNatives.wait(handles, wait_all, timeout_ms);
    match outcome {
        WaitOutcome::Failed(code) => {
            log::warn!(os_error = code; "wait on {} handles failed", handles.len())
        }
        other => log::trace!("wait on {} handles: {other:?}", handles.len()),
    }
    outcome
}
