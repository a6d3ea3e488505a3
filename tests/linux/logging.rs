use std::ffi::{c_char, c_void};
use std::sync::Mutex;

use fsmeta::{
    fsmeta_log_disable, fsmeta_log_set_callback, fsmeta_log_set_level, fsmeta_log_set_stderr,
    fsmeta_wait_any, FsLogLevel, FsLogRecord, FsStatus, FsStringView,
};

// Serializes tests that swap the process-wide sink.
static LOG_MUTEX: Mutex<()> = Mutex::new(());

#[derive(Clone, Debug, PartialEq)]
struct Captured {
    level: FsLogLevel,
    os_error: u32,
    component: String,
    message: String,
}

static CAPTURED: Mutex<Vec<Captured>> = Mutex::new(Vec::new());
static TAG: c_char = b'x' as c_char;

fn text(view: FsStringView) -> String {
    if view.ptr.is_null() {
        return String::new();
    }
    let bytes = unsafe { std::slice::from_raw_parts(view.ptr as *const u8, view.len) };
    String::from_utf8_lossy(bytes).into_owned()
}

extern "C" fn capture(record: *const FsLogRecord, user_data: *mut c_void) {
    let Some(record) = (unsafe { record.as_ref() }) else {
        return;
    };
    let captured = Captured {
        level: record.level,
        os_error: record.os_error,
        component: text(record.component),
        message: text(record.message),
    };
    if !user_data.is_null() {
        let tag = unsafe { &*(user_data as *const c_char) };
        assert_eq!(*tag, b'x' as c_char);
    }
    CAPTURED.lock().unwrap().push(captured);
}

fn captured_from(component: &str) -> Vec<Captured> {
    CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.component == component)
        .cloned()
        .collect()
}

fn reset() {
    fsmeta_log_disable();
    CAPTURED.lock().unwrap().clear();
}

#[test]
fn callback_receives_component_and_message() {
    let _guard = LOG_MUTEX.lock().unwrap();
    reset();
    let user_data = &TAG as *const c_char as *mut c_void;

    assert_eq!(
        fsmeta_log_set_callback(Some(capture), user_data, FsLogLevel::Info),
        FsStatus::Ok
    );
    log::info!(target: "fsmeta::host_records", "opened {} watches", 3);
    log::debug!(target: "fsmeta::host_records", "below the level");
    fsmeta_log_disable();

    assert_eq!(
        captured_from("host_records"),
        vec![Captured {
            level: FsLogLevel::Info,
            os_error: 0,
            component: "host_records".to_string(),
            message: "opened 3 watches".to_string(),
        }]
    );
}

#[test]
fn failed_waits_report_their_os_error() {
    let _guard = LOG_MUTEX.lock().unwrap();
    reset();
    assert_eq!(
        fsmeta_log_set_callback(Some(capture), std::ptr::null_mut(), FsLogLevel::Warn),
        FsStatus::Ok
    );

    let handles = [-5i64];
    fsmeta_wait_any(handles.as_ptr(), 1, false, 0);
    fsmeta_log_disable();

    let records = captured_from("watch");
    assert!(!records.is_empty());
    assert!(records
        .iter()
        .any(|r| r.level == FsLogLevel::Warn && r.os_error == libc::EBADF as u32));
}

#[test]
fn level_off_suppresses_records() {
    let _guard = LOG_MUTEX.lock().unwrap();
    reset();
    assert_eq!(
        fsmeta_log_set_callback(Some(capture), std::ptr::null_mut(), FsLogLevel::Trace),
        FsStatus::Ok
    );
    assert_eq!(fsmeta_log_set_level(FsLogLevel::Off), FsStatus::Ok);

    log::error!(target: "fsmeta::silenced", "should not arrive");
    fsmeta_log_disable();
    assert!(captured_from("silenced").is_empty());
}

#[test]
fn missing_callback_disables_logging() {
    let _guard = LOG_MUTEX.lock().unwrap();
    assert_eq!(fsmeta_log_set_stderr(FsLogLevel::Error), FsStatus::Ok);
    assert_eq!(
        fsmeta_log_set_callback(None, std::ptr::null_mut(), FsLogLevel::Trace),
        FsStatus::Ok
    );
    assert_eq!(log::max_level(), log::LevelFilter::Off);
}
