//! Decoding of `REPARSE_DATA_BUFFER` as returned by `FSCTL_GET_REPARSE_POINT`.
//!
//! Symbolic-link layout (little endian):
//!
//! ```text
//! 0  u32 ReparseTag
//! 4  u16 ReparseDataLength
//! 6  u16 Reserved
//! 8  u16 SubstituteNameOffset   (bytes, relative to PathBuffer)
//! 10 u16 SubstituteNameLength   (bytes)
//! 12 u16 PrintNameOffset
//! 14 u16 PrintNameLength
//! 16 u32 Flags
//! 20 u16 PathBuffer[]
//! ```

pub const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;
pub const MAXIMUM_REPARSE_DATA_BUFFER_SIZE: usize = 16 * 1024;

const PATH_BUFFER_OFFSET: usize = 20;

fn read_u16(buf: &[u8], at: usize) -> Option<u16> {
    let bytes = buf.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_name(buf: &[u8], offset: u16, len: u16) -> Option<String> {
    let start = PATH_BUFFER_OFFSET + offset as usize;
    let bytes = buf.get(start..start + len as usize)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Some(String::from_utf16_lossy(&units))
}

pub fn reparse_tag(buf: &[u8]) -> Option<u32> {
    read_u32(buf, 0)
}

/// Extracts a symbolic link's target from a reparse buffer.
///
/// Prefers the print name and falls back to the substitute name when the print
/// name is empty. Returns `None` when the tag is not a symlink tag (the entry
/// may have changed since it was listed) or when the buffer is truncated.
pub fn decode_symlink_target(buf: &[u8]) -> Option<String> {
    if reparse_tag(buf)? != IO_REPARSE_TAG_SYMLINK {
        return None;
    }
    let substitute_offset = read_u16(buf, 8)?;
    let substitute_len = read_u16(buf, 10)?;
    let print_offset = read_u16(buf, 12)?;
    let print_len = read_u16(buf, 14)?;

    if print_len / 2 > 0 {
        read_name(buf, print_offset, print_len)
    } else {
        read_name(buf, substitute_offset, substitute_len)
    }
}
