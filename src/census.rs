/// Dual-threshold presence counting and crowd-size classification.
///
/// `CycleCounts` is the per-cycle state: created empty when a scan round
/// starts, filled by tallying each observation, and dropped when the cycle
/// ends. Nothing in this module survives across cycles — the published
/// command lives in [`crate::channel::CommandLatch`] instead.

use crate::filter::{self, SenseConfig};
use crate::scanner::Observation;

/// Per-cycle presence counters.
///
/// Invariant: `close <= general`. The close radius is a stricter
/// sub-condition of the general radius and is only evaluated once the
/// general condition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCounts {
    /// Unknown advertisers inside the general radius.
    pub general: u16,
    /// Unknown advertisers inside the close radius.
    pub close: u16,
    /// True iff `general` was ever incremented this cycle.
    pub general_seen: bool,
    /// True iff `close` was ever incremented this cycle.
    pub close_seen: bool,
}

impl CycleCounts {
    pub const fn new() -> Self {
        Self {
            general: 0,
            close: 0,
            general_seen: false,
            close_seen: false,
        }
    }

    /// Tally one observation.
    ///
    /// The exclusion check runs here, per observation, so a known device is
    /// skipped entirely regardless of what the scanner saw before or after
    /// it. Both threshold comparisons are strict: a signal exactly at a
    /// threshold does not count.
    pub fn tally(&mut self, obs: &Observation, cfg: &SenseConfig) {
        if filter::is_known(&obs.addr) {
            return;
        }
        if obs.rssi > cfg.general_rssi {
            self.general += 1;
            self.general_seen = true;
            if obs.rssi > cfg.close_rssi {
                self.close += 1;
                self.close_seen = true;
            }
        }
    }
}

impl Default for CycleCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Size class of a non-empty crowd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdSize {
    /// 1 to 4 unknown devices. Below the small band; the reference
    /// deployment drives this exactly like `Large` (random vibration).
    Sparse,
    /// 5 to 15 unknown devices — the footstep effect.
    Small,
    /// More than 15 unknown devices.
    Large,
}

/// Crowd classification for one cycle, derived solely from the general
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No unknown devices inside the general radius.
    Absent,
    Present(CrowdSize),
}

impl Classification {
    pub fn from_count(general: u16) -> Self {
        match general {
            0 => Classification::Absent,
            1..=4 => Classification::Present(CrowdSize::Sparse),
            5..=15 => Classification::Present(CrowdSize::Small),
            _ => Classification::Present(CrowdSize::Large),
        }
    }

    /// Device presence: whether anyone unknown is in range at all.
    pub fn present(&self) -> bool {
        matches!(self, Classification::Present(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Absent => "absent",
            Classification::Present(CrowdSize::Sparse) => "sparse",
            Classification::Present(CrowdSize::Small) => "small",
            Classification::Present(CrowdSize::Large) => "large",
        }
    }
}
