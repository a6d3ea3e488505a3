use std::ffi::c_char;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use fsmeta::*;

// Serializes tests that depend on the process-wide configuration.
static CONFIG_LOCK: Mutex<()> = Mutex::new(());

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(label: &str) -> Self {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("fsmeta_linux_{label}_{}_{}", std::process::id(), nanos));
        fs::create_dir_all(&path).expect("create temp dir");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn make_view(value: &str) -> (Vec<u8>, FsStringView) {
    let bytes = value.as_bytes().to_vec();
    let view = FsStringView {
        ptr: bytes.as_ptr() as *const c_char,
        len: bytes.len(),
    };
    (bytes, view)
}

fn read_view(view: FsStringView) -> Option<String> {
    if view.ptr.is_null() {
        return None;
    }
    let bytes = unsafe { std::slice::from_raw_parts(view.ptr as *const u8, view.len) };
    Some(String::from_utf8_lossy(bytes).into_owned())
}

struct Queried {
    status: FsStatus,
    info: FsFileInfo,
    name: Option<String>,
    link_target: Option<String>,
}

fn query(path: &Path) -> Queried {
    let (_buf, view) = make_view(&path.to_string_lossy());
    let mut info = FsFileInfo::empty();
    let status = fsmeta_query_metadata(&view, &mut info);
    let name = read_view(info.name);
    let link_target = read_view(info.link_target);
    fsmeta_file_info_free(&mut info);
    Queried {
        status,
        info,
        name,
        link_target,
    }
}

fn write_attributes_raw(path: &Path, read_only: bool, archive: bool, hidden: bool) -> bool {
    let (_buf, view) = make_view(&path.to_string_lossy());
    fsmeta_write_attributes(&view, read_only, archive, hidden)
}

fn has(info: &FsFileInfo, attr: u32) -> bool {
    info.attributes & attr != 0
}

#[test]
fn existing_file_reports_size_and_name() {
    let temp = TempDir::new("file");
    let path = temp.path.join("data.bin");
    fs::write(&path, vec![7u8; 1234]).expect("write file");

    let result = query(&path);
    assert_eq!(result.status, FsStatus::Ok);
    assert_ne!(result.info.flags & FSMETA_INFO_EXISTS, 0);
    assert_eq!(result.info.length, 1234);
    assert_eq!(result.name.as_deref(), Some("data.bin"));
    assert!(!has(&result.info, FSMETA_ATTR_DIRECTORY));
    assert!(!has(&result.info, FSMETA_ATTR_SYMLINK));
    assert!(result.link_target.is_none());

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    assert!((now - result.info.last_modified).abs() < 24 * 60 * 60 * 1000);
}

#[test]
fn directories_are_flagged() {
    let temp = TempDir::new("dir");
    let result = query(&temp.path);
    assert_eq!(result.status, FsStatus::Ok);
    assert!(has(&result.info, FSMETA_ATTR_DIRECTORY));
}

#[test]
fn missing_file_is_absent_without_error() {
    let temp = TempDir::new("missing");
    let result = query(&temp.path.join("nope.txt"));
    assert_eq!(result.status, FsStatus::NotFound);
    assert_eq!(result.info.flags, 0);
    assert_eq!(result.info.io_error, 0);
    assert!(result.name.is_none());
}

#[test]
fn drive_roots_are_directories_without_a_lookup() {
    for path in [r"\\?\C:\", r"C:\", r"\\?\z:\"] {
        let (_buf, view) = make_view(path);
        let mut info = FsFileInfo::empty();
        assert_eq!(fsmeta_query_metadata(&view, &mut info), FsStatus::Ok, "{path}");
        assert_eq!(info.flags, FSMETA_INFO_EXISTS, "{path}");
        assert_eq!(info.attributes, FSMETA_ATTR_DIRECTORY, "{path}");
        assert_eq!(info.last_modified, 0);
        assert_eq!(info.length, 0);
        fsmeta_file_info_free(&mut info);
    }

    let info = query_metadata(r"\\?\C:\");
    assert!(info.exists);
    assert!(info.is_directory());
    assert!(info.name.is_empty());
}

#[test]
fn drive_letter_without_root_is_a_plain_lookup() {
    let info = query_metadata(r"\\?\C:");
    assert!(!info.exists);
    assert!(info.io_error.is_none());
}

#[test]
fn lookup_through_a_file_is_an_io_error() {
    let temp = TempDir::new("notdir");
    let file = temp.path.join("plain.txt");
    fs::write(&file, b"x").expect("write file");

    let result = query(&file.join("child"));
    assert_eq!(result.status, FsStatus::IoError);
    assert_eq!(result.info.flags, FSMETA_INFO_IO_ERROR);
    assert_eq!(result.info.io_error, libc::ENOTDIR as u32);
    assert_eq!(fsmeta_last_error(), libc::ENOTDIR as u32);
}

#[test]
fn long_path_prefix_is_accepted() {
    let temp = TempDir::new("prefix");
    let path = temp.path.join("file.txt");
    fs::write(&path, b"abc").expect("write file");

    let info = query_metadata(&format!(r"\\?\{}", path.display()));
    assert!(info.exists);
    assert_eq!(info.length, 3);
}

#[test]
fn symlink_reports_its_target() {
    let _guard = CONFIG_LOCK.lock().unwrap();
    let temp = TempDir::new("symlink");
    let target = temp.path.join("target.txt");
    fs::write(&target, b"hello").expect("write target");
    let link = temp.path.join("link.txt");
    symlink("target.txt", &link).expect("create symlink");

    let result = query(&link);
    assert_eq!(result.status, FsStatus::Ok);
    assert!(has(&result.info, FSMETA_ATTR_SYMLINK));
    assert_eq!(result.link_target.as_deref(), Some("target.txt"));
    assert_eq!(result.info.length, 5);
    assert_eq!(result.name.as_deref(), Some("link.txt"));
}

#[test]
fn directory_symlink_is_a_directory() {
    let _guard = CONFIG_LOCK.lock().unwrap();
    let temp = TempDir::new("dirlink");
    let target = temp.path.join("real");
    fs::create_dir(&target).expect("create dir");
    let link = temp.path.join("alias");
    symlink(&target, &link).expect("create symlink");

    let expected = target.to_string_lossy().into_owned();
    let info = query_metadata(&link.to_string_lossy());
    assert!(info.is_directory());
    assert!(info.is_symlink());
    assert_eq!(info.link_target(), Some(expected.as_str()));
}

#[test]
fn dangling_symlink_still_exists() {
    let _guard = CONFIG_LOCK.lock().unwrap();
    let temp = TempDir::new("dangling");
    let link = temp.path.join("broken");
    symlink("does-not-exist", &link).expect("create symlink");

    let info = query_metadata(&link.to_string_lossy());
    assert!(info.exists);
    assert!(info.is_symlink());
    assert_eq!(info.link_target(), Some("does-not-exist"));
}

#[test]
fn skipping_link_targets_hides_symlinks() {
    let _guard = CONFIG_LOCK.lock().unwrap();
    let temp = TempDir::new("skiplinks");
    let link = temp.path.join("link");
    symlink("elsewhere", &link).expect("create symlink");

    let config = FsConfig {
        size: std::mem::size_of::<FsConfig>() as u32,
        flags: FSMETA_FLAG_SKIP_LINK_TARGETS,
        reserved: [0; 6],
    };
    assert_eq!(fsmeta_configure(&config), FsStatus::Ok);
    assert_eq!(fsmeta_current_flags(), FSMETA_FLAG_SKIP_LINK_TARGETS);
    let info = query_metadata(&link.to_string_lossy());
    assert_eq!(fsmeta_configure(std::ptr::null()), FsStatus::Ok);

    assert!(info.exists);
    assert!(!info.is_symlink());
    assert_eq!(info.link_target(), None);
}

#[test]
fn read_only_round_trip() {
    let temp = TempDir::new("readonly");
    let path = temp.path.join("file.txt");
    fs::write(&path, b"x").expect("write file");

    assert!(write_attributes_raw(&path, true, false, true));
    let result = query(&path);
    assert!(has(&result.info, FSMETA_ATTR_READ_ONLY));
    assert!(!has(&result.info, FSMETA_ATTR_ARCHIVE));
    assert!(!has(&result.info, FSMETA_ATTR_HIDDEN));

    assert!(write_attributes_raw(&path, false, false, false));
    let result = query(&path);
    assert!(!has(&result.info, FSMETA_ATTR_READ_ONLY));
}

#[test]
fn write_attributes_keeps_the_directory_bit() {
    let temp = TempDir::new("dirattrs");
    assert!(write_attributes_raw(&temp.path, false, true, true));
    let info = query_metadata(&temp.path.to_string_lossy());
    assert!(info.is_directory());
    assert!(!info.is_read_only());
}

#[test]
fn write_attributes_on_missing_path_fails() {
    let temp = TempDir::new("writemissing");
    assert!(!write_attributes_raw(&temp.path.join("nope"), true, false, false));
    assert_eq!(fsmeta_last_error(), libc::ENOENT as u32);

    let err = write_attributes(&temp.path.join("nope").to_string_lossy(), true, false, false)
        .unwrap_err();
    assert_eq!(err.status(), FsStatus::NotFound);
}

#[test]
fn supported_attributes_match_the_emulation() {
    let bits = fsmeta_supported_attributes();
    assert_ne!(bits & FSMETA_ATTR_READ_ONLY, 0);
    assert_ne!(bits & FSMETA_ATTR_SYMLINK, 0);
    assert_ne!(bits & FSMETA_ATTR_LINK_TARGET, 0);
    assert_eq!(bits & FSMETA_ATTR_HIDDEN, 0);
    assert_eq!(bits & FSMETA_ATTR_ARCHIVE, 0);
}

#[test]
fn invalid_utf8_path_is_rejected() {
    let bytes = [b'/', 0xff, b'x'];
    let view = FsStringView {
        ptr: bytes.as_ptr() as *const c_char,
        len: bytes.len(),
    };
    let mut info = FsFileInfo::empty();
    assert_eq!(fsmeta_query_metadata(&view, &mut info), FsStatus::EncodingError);
    assert_eq!(info.flags, 0);
}
