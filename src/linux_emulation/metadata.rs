use std::fs;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use crate::common::error::OsError;
use crate::common::longpath::{normalize_long_path, strip_long_path_prefix};
use crate::common::metadata::{FileAttributes, FileInfo};
use crate::config::Config;

const OWNER_WRITE: u32 = 0o200;
const ANY_WRITE: u32 = 0o222;

fn unix_millis(meta: &fs::Metadata) -> i64 {
    meta.mtime() * 1000 + meta.mtime_nsec() / 1_000_000
}

pub fn query_metadata(path: &str) -> FileInfo {
    // Drive roots answer without a lookup, as on Windows.
    if normalize_long_path(path).is_drive_root() {
        return FileInfo::root_directory();
    }
    let path = Path::new(strip_long_path_prefix(path));
    let link_meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return FileInfo::absent(),
        Err(err) => return FileInfo::with_io_error(OsError::from_io(&err).code()),
    };

    let is_link = link_meta.file_type().is_symlink();
    // A link reports what it points at, like a Windows directory symlink does.
    let meta = if is_link {
        fs::metadata(path).unwrap_or_else(|_| link_meta.clone())
    } else {
        link_meta
    };

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut info = FileInfo::existing(name, unix_millis(&meta), meta.len());
    if meta.is_dir() {
        info.attributes.insert(FileAttributes::DIRECTORY);
    }
    if meta.permissions().mode() & OWNER_WRITE == 0 {
        info.attributes.insert(FileAttributes::READ_ONLY);
    }

    if is_link && !Config::current().skip_link_targets {
        match fs::read_link(path) {
            Ok(target) => info.set_symlink(target.to_string_lossy().into_owned()),
            Err(err) => log::debug!(
                os_error = OsError::from_io(&err).code();
                "symlink target of {} unavailable",
                path.display()
            ),
        }
    }
    info
}

/// Only the read-only bit has a native representation here.
pub fn write_attributes(
    path: &str,
    read_only: bool,
    archive: bool,
    hidden: bool,
) -> Result<(), OsError> {
    let path = Path::new(strip_long_path_prefix(path));
    let meta = fs::metadata(path).map_err(|err| OsError::from_io(&err))?;
    if archive || hidden {
        log::debug!(
            "archive/hidden not persisted for {} (archive={archive} hidden={hidden})",
            path.display()
        );
    }

    let mut permissions = meta.permissions();
    let mode = permissions.mode();
    let updated = if read_only {
        mode & !ANY_WRITE
    } else {
        mode | OWNER_WRITE
    };
    permissions.set_mode(updated);
    fs::set_permissions(path, permissions).map_err(|err| OsError::from_io(&err))
}
