//! `log` backend for the library's own records.
//!
//! Nothing is emitted until the host picks a sink: stderr or a callback.
//! Call sites attach the OS error they report as an `os_error` key-value,
//! which reaches hosts as `FsLogRecord::os_error` and stderr as a suffix.

use core::ffi::{c_char, c_void};
use std::sync::{OnceLock, RwLock};

use log::kv::Key;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::common::types::{FsLogLevel, FsLogRecord, FsStatus, FsStringView};

pub type FsLogCallback = Option<extern "C" fn(record: *const FsLogRecord, user_data: *mut c_void)>;

const OS_ERROR_KEY: &str = "os_error";

#[derive(Copy, Clone)]
enum Sink {
    Disabled,
    Stderr,
    Callback {
        callback: extern "C" fn(record: *const FsLogRecord, user_data: *mut c_void),
        user_data: usize,
    },
}

struct FsLogger {
    sink: RwLock<Sink>,
}

static LOGGER: FsLogger = FsLogger {
    sink: RwLock::new(Sink::Disabled),
};

impl FsLogger {
    fn sink(&self) -> Sink {
        self.sink.read().map(|sink| *sink).unwrap_or(Sink::Disabled)
    }

    fn set_sink(&self, sink: Sink) {
        match self.sink.write() {
            Ok(mut slot) => *slot = sink,
            Err(poisoned) => *poisoned.into_inner() = sink,
        }
    }
}

impl Log for FsLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && !matches!(self.sink(), Sink::Disabled)
    }

    fn log(&self, record: &Record) {
        if record.level() > log::max_level() {
            return;
        }
        // The sink is copied out so a callback may reconfigure logging.
        match self.sink() {
            Sink::Disabled => {}
            Sink::Stderr => match os_error_of(record) {
                0 => eprintln!(
                    "[fsmeta][{}] {}: {}",
                    record.level(),
                    component_of(record.target()),
                    record.args()
                ),
                code => eprintln!(
                    "[fsmeta][{}] {}: {} (os error {code})",
                    record.level(),
                    component_of(record.target()),
                    record.args()
                ),
            },
            Sink::Callback { callback, user_data } => {
                let message = record.args().to_string();
                let raw = FsLogRecord {
                    level: fs_level(record.level()),
                    os_error: os_error_of(record),
                    component: view_of(component_of(record.target())),
                    message: view_of(&message),
                };
                callback(&raw, user_data as *mut c_void);
            }
        }
    }

    fn flush(&self) {}
}

/// Module path below the crate root, e.g. `watch` for `fsmeta::watch`.
fn component_of(target: &str) -> &str {
    target.strip_prefix("fsmeta::").unwrap_or(target)
}

fn os_error_of(record: &Record) -> u32 {
    record
        .key_values()
        .get(Key::from_str(OS_ERROR_KEY))
        .and_then(|value| value.to_u64())
        .map_or(0, |code| code as u32)
}

fn view_of(value: &str) -> FsStringView {
    FsStringView {
        ptr: value.as_ptr() as *const c_char,
        len: value.len(),
    }
}

fn fs_level(level: Level) -> FsLogLevel {
    match level {
        Level::Error => FsLogLevel::Error,
        Level::Warn => FsLogLevel::Warn,
        Level::Info => FsLogLevel::Info,
        Level::Debug => FsLogLevel::Debug,
        Level::Trace => FsLogLevel::Trace,
    }
}

fn level_filter(level: FsLogLevel) -> LevelFilter {
    match level {
        FsLogLevel::Off => LevelFilter::Off,
        FsLogLevel::Error => LevelFilter::Error,
        FsLogLevel::Warn => LevelFilter::Warn,
        FsLogLevel::Info => LevelFilter::Info,
        FsLogLevel::Debug => LevelFilter::Debug,
        FsLogLevel::Trace => LevelFilter::Trace,
    }
}

/// Whether `FsLogger` is the process's `log` backend. Decided on first use.
fn owns_facade() -> bool {
    static OWNED: OnceLock<bool> = OnceLock::new();
    *OWNED.get_or_init(|| log::set_logger(&LOGGER).is_ok())
}

/// Single entry point behind every logging export. `None` keeps the sink.
///
/// When another logger owns the facade only the level can be honored, so
/// selecting an output sink fails with `IoError`.
fn configure(sink: Option<Sink>, level: FsLogLevel) -> FsStatus {
    let owned = owns_facade();
    match sink {
        Some(Sink::Disabled) if !owned => {}
        Some(_) if !owned => return FsStatus::IoError,
        Some(sink) => LOGGER.set_sink(sink),
        None => {}
    }
    log::set_max_level(level_filter(level));
    FsStatus::Ok
}

pub fn log_set_stderr(level: FsLogLevel) -> FsStatus {
    configure(Some(Sink::Stderr), level)
}

/// A null callback disables logging.
pub fn log_set_callback(callback: FsLogCallback, user_data: *mut c_void, level: FsLogLevel) -> FsStatus {
    match callback {
        Some(callback) => configure(
            Some(Sink::Callback {
                callback,
                user_data: user_data as usize,
            }),
            level,
        ),
        None => log_disable(),
    }
}

pub fn log_set_level(level: FsLogLevel) -> FsStatus {
    configure(None, level)
}

pub fn log_disable() -> FsStatus {
    configure(Some(Sink::Disabled), FsLogLevel::Off)
}
