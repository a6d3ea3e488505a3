use crate::common::types::*;

/// Milliseconds between 1601-01-01 and 1970-01-01 UTC.
pub const FILETIME_UNIX_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;
const FILETIME_TICKS_PER_MS: u64 = 10_000;

/// Converts 100ns ticks since 1601-01-01 UTC to milliseconds since the Unix epoch.
pub fn filetime_to_unix_millis(ticks: u64) -> i64 {
    (ticks / FILETIME_TICKS_PER_MS) as i64 - FILETIME_UNIX_EPOCH_OFFSET_MS
}

/// Joins the split 32-bit halves used by FILETIME and find-data sizes.
pub fn combine_size(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FileAttributes(u32);

impl FileAttributes {
    pub const DIRECTORY: Self = Self(FSMETA_ATTR_DIRECTORY);
    pub const READ_ONLY: Self = Self(FSMETA_ATTR_READ_ONLY);
    pub const ARCHIVE: Self = Self(FSMETA_ATTR_ARCHIVE);
    pub const HIDDEN: Self = Self(FSMETA_ATTR_HIDDEN);
    pub const SYMLINK: Self = Self(FSMETA_ATTR_SYMLINK);
    pub const LINK_TARGET: Self = Self(FSMETA_ATTR_LINK_TARGET);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl core::ops::BitOr for FileAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Result of a metadata query.
///
/// When `exists` is false only `io_error` carries meaning. `link_target` is
/// present exactly when the symlink attribute is set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileInfo {
    pub exists: bool,
    pub name: String,
    pub last_modified: i64,
    pub length: u64,
    pub attributes: FileAttributes,
    link_target: Option<String>,
    pub io_error: Option<u32>,
}

impl FileInfo {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_io_error(code: u32) -> Self {
        Self {
            io_error: Some(code),
            ..Self::default()
        }
    }

    pub fn existing(name: String, last_modified: i64, length: u64) -> Self {
        Self {
            exists: true,
            name,
            last_modified,
            length,
            ..Self::default()
        }
    }

    /// A drive root: exists and is a directory, nothing else is known.
    pub fn root_directory() -> Self {
        Self {
            exists: true,
            attributes: FileAttributes::DIRECTORY,
            ..Self::default()
        }
    }

    pub fn link_target(&self) -> Option<&str> {
        self.link_target.as_deref()
    }

    pub fn set_symlink(&mut self, target: String) {
        self.attributes.insert(FileAttributes::SYMLINK);
        self.link_target = Some(target);
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.contains(FileAttributes::DIRECTORY)
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes.contains(FileAttributes::READ_ONLY)
    }

    pub fn is_archive(&self) -> bool {
        self.attributes.contains(FileAttributes::ARCHIVE)
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.contains(FileAttributes::HIDDEN)
    }

    pub fn is_symlink(&self) -> bool {
        self.attributes.contains(FileAttributes::SYMLINK)
    }
}
