//! Change watches over inotify descriptors.
//!
//! A watch handle is the inotify descriptor itself, so it can be polled
//! directly. Like a Win32 change notification it stays signaled until
//! `advance` drains the queued events.

use std::collections::HashMap;
use std::ffi::{CString, OsStr};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use crate::common::error::OsError;
use crate::common::longpath::strip_long_path_prefix;
use crate::common::types::*;
use crate::common::wait::WaitOutcome;
use crate::config::Config;
use crate::natives::RawWatchHandle;

const NAME_CHANGES: u32 =
    libc::IN_CREATE | libc::IN_DELETE | libc::IN_MOVED_FROM | libc::IN_MOVED_TO;
const EVENT_BUFFER_BYTES: usize = 4096;
const EVENT_HEADER_BYTES: usize = std::mem::size_of::<libc::inotify_event>();

struct Watch {
    subtree: bool,
    mask: u32,
    dirs: HashMap<i32, PathBuf>,
}

impl Watch {
    fn add_dir(&mut self, fd: i32, dir: &Path) -> Result<(), OsError> {
        let c_path =
            CString::new(dir.as_os_str().as_bytes()).map_err(|_| OsError::invalid_parameter())?;
        let wd = unsafe { libc::inotify_add_watch(fd, c_path.as_ptr(), self.mask | libc::IN_ONLYDIR) };
        if wd < 0 {
            return Err(OsError::last());
        }
        self.dirs.insert(wd, dir.to_path_buf());
        Ok(())
    }

    /// Watches `dir` and, for subtree watches, every directory below it.
    /// Failures below `dir` are skipped.
    fn add_tree(&mut self, fd: i32, dir: &Path) -> Result<(), OsError> {
        self.add_dir(fd, dir)?;
        if !self.subtree {
            return Ok(());
        }
        let Ok(entries) = fs::read_dir(dir) else {
            return Ok(());
        };
        for entry in entries.flatten() {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            let child = entry.path();
            if let Err(err) = self.add_tree(fd, &child) {
                log::debug!(os_error = err.code(); "not watching {}", child.display());
            }
        }
        Ok(())
    }
}

fn registry() -> MutexGuard<'static, HashMap<i32, Watch>> {
    static WATCHES: OnceLock<Mutex<HashMap<i32, Watch>>> = OnceLock::new();
    WATCHES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn inotify_mask(filter: u32) -> u32 {
    const TABLE: [(u32, u32); 8] = [
        (FSMETA_NOTIFY_FILE_NAME, NAME_CHANGES),
        (FSMETA_NOTIFY_DIR_NAME, NAME_CHANGES),
        (FSMETA_NOTIFY_ATTRIBUTES, libc::IN_ATTRIB),
        (FSMETA_NOTIFY_SIZE, libc::IN_MODIFY),
        (FSMETA_NOTIFY_LAST_WRITE, libc::IN_MODIFY | libc::IN_CLOSE_WRITE),
        (FSMETA_NOTIFY_LAST_ACCESS, libc::IN_ACCESS),
        (FSMETA_NOTIFY_CREATION, libc::IN_CREATE),
        (FSMETA_NOTIFY_SECURITY, libc::IN_ATTRIB),
    ];
    TABLE
        .iter()
        .filter(|(ours, _)| filter & ours != 0)
        .fold(0, |acc, (_, native)| acc | native)
}

fn fd_from_handle(handle: RawWatchHandle) -> Result<i32, OsError> {
    match i32::try_from(handle) {
        Ok(fd) if fd >= 0 => Ok(fd),
        _ => Err(OsError::invalid_handle()),
    }
}

pub fn open(path: &str, watch_subtree: bool, filter: u32) -> Result<RawWatchHandle, OsError> {
    let root = PathBuf::from(strip_long_path_prefix(path));
    let fd = unsafe { libc::inotify_init1(libc::IN_NONBLOCK | libc::IN_CLOEXEC) };
    if fd < 0 {
        return Err(OsError::last());
    }

    let mut watch = Watch {
        subtree: watch_subtree,
        mask: inotify_mask(filter),
        dirs: HashMap::new(),
    };
    if let Err(err) = watch.add_tree(fd, &root) {
        unsafe {
            libc::close(fd);
        }
        return Err(err);
    }
    log::debug!(
        "watching {} ({} directories, fd {fd})",
        root.display(),
        watch.dirs.len()
    );
    registry().insert(fd, watch);
    Ok(fd as RawWatchHandle)
}

pub fn advance(handle: RawWatchHandle) -> Result<(), OsError> {
    let fd = fd_from_handle(handle)?;
    let mut registry = registry();
    let watch = registry.get_mut(&fd).ok_or_else(OsError::invalid_handle)?;
    let rescan = watch.subtree && !Config::current().no_subtree_rescan;

    let mut new_dirs: Vec<PathBuf> = Vec::new();
    let mut buf = [0u8; EVENT_BUFFER_BYTES];
    loop {
        let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n < 0 {
            let err = OsError::last();
            match err.code() as i32 {
                libc::EAGAIN => break,
                libc::EINTR => continue,
                _ => return Err(err),
            }
        }
        if n == 0 {
            break;
        }

        let mut offset = 0usize;
        let filled = n as usize;
        while offset + EVENT_HEADER_BYTES <= filled {
            let event = unsafe {
                std::ptr::read_unaligned(buf.as_ptr().add(offset) as *const libc::inotify_event)
            };
            let name_start = offset + EVENT_HEADER_BYTES;
            let name_end = (name_start + event.len as usize).min(filled);
            let raw_name = &buf[name_start..name_end];
            let name = &raw_name[..raw_name.iter().position(|b| *b == 0).unwrap_or(raw_name.len())];

            if event.mask & libc::IN_Q_OVERFLOW != 0 {
                log::debug!("inotify queue overflow on fd {fd}");
            }
            if event.mask & libc::IN_IGNORED != 0 {
                watch.dirs.remove(&event.wd);
            }
            if rescan
                && event.mask & libc::IN_ISDIR != 0
                && event.mask & (libc::IN_CREATE | libc::IN_MOVED_TO) != 0
            {
                if let Some(parent) = watch.dirs.get(&event.wd) {
                    new_dirs.push(parent.join(OsStr::from_bytes(name)));
                }
            }
            offset = name_start + event.len as usize;
        }
    }

    for dir in new_dirs {
        if let Err(err) = watch.add_tree(fd, &dir) {
            log::debug!(os_error = err.code(); "not watching new directory {}", dir.display());
        }
    }
    Ok(())
}

pub fn close(handle: RawWatchHandle) -> Result<(), OsError> {
    let fd = fd_from_handle(handle)?;
    if registry().remove(&fd).is_none() {
        return Err(OsError::invalid_handle());
    }
    if unsafe { libc::close(fd) } < 0 {
        return Err(OsError::last());
    }
    Ok(())
}

fn remaining_ms(deadline: Option<Instant>) -> libc::c_int {
    let Some(deadline) = deadline else {
        return -1;
    };
    let left = deadline.saturating_duration_since(Instant::now());
    let millis = (left.as_micros() + 999) / 1000;
    millis.min(libc::c_int::MAX as u128) as libc::c_int
}

pub fn wait(handles: &[RawWatchHandle], wait_all: bool, timeout_ms: u32) -> WaitOutcome {
    let mut fds = Vec::with_capacity(handles.len());
    for handle in handles {
        match fd_from_handle(*handle) {
            Ok(fd) => fds.push(fd),
            Err(err) => return WaitOutcome::Failed(err.code()),
        }
    }
    let deadline = (timeout_ms != FSMETA_INFINITE)
        .then(|| Instant::now() + Duration::from_millis(timeout_ms as u64));

    let mut ready = vec![false; fds.len()];
    loop {
        let pending: Vec<usize> = (0..fds.len()).filter(|i| !ready[*i]).collect();
        let mut pollfds: Vec<libc::pollfd> = pending
            .iter()
            .map(|i| libc::pollfd {
                fd: fds[*i],
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        let rc = unsafe {
            libc::poll(
                pollfds.as_mut_ptr(),
                pollfds.len() as libc::nfds_t,
                remaining_ms(deadline),
            )
        };
        if rc < 0 {
            let err = OsError::last();
            if err.code() as i32 == libc::EINTR {
                continue;
            }
            return WaitOutcome::Failed(err.code());
        }

        for (index, pollfd) in pending.iter().zip(&pollfds) {
            if pollfd.revents & libc::POLLNVAL != 0 {
                return WaitOutcome::Failed(OsError::invalid_handle().code());
            }
            if pollfd.revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0 {
                ready[*index] = true;
            }
        }

        if wait_all {
            if ready.iter().all(|r| *r) {
                return WaitOutcome::Signaled(0);
            }
        } else if let Some(index) = ready.iter().position(|r| *r) {
            return WaitOutcome::Signaled(index);
        }
        if rc == 0 {
            return WaitOutcome::Timeout;
        }
    }
}
