//! Long-path encoding for Win32 wide-character calls.
//!
//! The `\\?\` escape lifts the traditional `MAX_PATH` limit and is also valid
//! for short paths, so it is applied unconditionally. Nothing about the path
//! content is validated here; malformed input fails in the OS call that
//! consumes the buffer.

const PREFIX: [u16; 4] = [b'\\' as u16, b'\\' as u16, b'?' as u16, b'\\' as u16];
const PREFIX_STR: &str = r"\\?\";

/// Owned, null-terminated UTF-16 path carrying the long-path prefix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LongPath {
    units: Vec<u16>,
}

impl LongPath {
    fn from_units<I>(prefix: bool, content: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let content = content.into_iter();
        let mut units = Vec::with_capacity(content.size_hint().0 + PREFIX.len() + 1);
        if prefix {
            units.extend_from_slice(&PREFIX);
        }
        units.extend(content);
        units.push(0);
        Self { units }
    }

    /// Pointer to the null-terminated buffer, valid while `self` lives.
    pub fn as_ptr(&self) -> *const u16 {
        self.units.as_ptr()
    }

    /// Code units excluding the terminator.
    pub fn as_units(&self) -> &[u16] {
        &self.units[..self.units.len() - 1]
    }

    /// Code units including the terminator.
    pub fn as_units_with_nul(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `\\?\X:\`: a bare drive root, which directory search cannot enumerate.
    pub fn is_drive_root(&self) -> bool {
        let units = self.as_units();
        units.len() == 7
            && units[..4] == PREFIX
            && units[5] == b':' as u16
            && units[6] == b'\\' as u16
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.as_units())
    }
}

/// Prefixes `path` with `\\?\` and null-terminates it: `len + 5` code units.
pub fn encode_long_path(path: &str) -> LongPath {
    LongPath::from_units(true, path.encode_utf16())
}

/// Like [`encode_long_path`], but leaves an already prefixed path alone.
pub fn normalize_long_path(path: &str) -> LongPath {
    LongPath::from_units(!has_long_path_prefix(path), path.encode_utf16())
}

pub fn has_long_path_prefix(path: &str) -> bool {
    path.starts_with(PREFIX_STR)
}

pub fn strip_long_path_prefix(path: &str) -> &str {
    path.strip_prefix(PREFIX_STR).unwrap_or(path)
}
