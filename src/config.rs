use crate::common::types::*;
use std::sync::atomic::{AtomicU32, Ordering};

static FLAGS: AtomicU32 = AtomicU32::new(0);

/// Process-wide behavior switches, set through `fsmeta_configure`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    pub skip_link_targets: bool,
    pub no_subtree_rescan: bool,
}

impl Config {
    pub fn from_flags(flags: u32) -> Self {
        Self {
            skip_link_targets: flags & FSMETA_FLAG_SKIP_LINK_TARGETS != 0,
            no_subtree_rescan: flags & FSMETA_FLAG_NO_SUBTREE_RESCAN != 0,
        }
    }

    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.skip_link_targets {
            flags |= FSMETA_FLAG_SKIP_LINK_TARGETS;
        }
        if self.no_subtree_rescan {
            flags |= FSMETA_FLAG_NO_SUBTREE_RESCAN;
        }
        flags
    }

    pub fn current() -> Self {
        Self::from_flags(FLAGS.load(Ordering::Relaxed))
    }

    pub fn apply(self) {
        FLAGS.store(self.flags(), Ordering::Relaxed);
        log::debug!("configuration applied: {self:?}");
    }
}

/// Validates a host-supplied config record.
///
/// # Safety
/// `config` must be null or point to at least `(*config).size` readable bytes.
pub unsafe fn config_from_ffi(config: *const FsConfig) -> Result<Config, FsStatus> {
    let Some(config) = config.as_ref() else {
        return Ok(Config::default());
    };
    if (config.size as usize) < core::mem::size_of::<FsConfig>() {
        return Err(FsStatus::InvalidArgument);
    }
    Ok(Config::from_flags(config.flags))
}
