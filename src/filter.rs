/// Known-device exclusion filter and sensing thresholds.
///
/// Devices on the compiled-in allow-list are installation equipment and
/// staff phones; they must never inflate the presence counts. The check is
/// an exact-match linear scan, evaluated independently for every
/// observation immediately before it is tallied.

use crate::defaults::{self, CLOSE_RSSI_THRESHOLD, GENERAL_RSSI_THRESHOLD};

/// Signal-strength thresholds for one sensing cycle.
///
/// The deployed firmware only ever uses [`SenseConfig::new`]; the checked
/// constructor exists for tests and future hosts.
#[derive(Clone, Copy)]
pub struct SenseConfig {
    /// General presence radius (dBm). Strictly stronger signals count.
    pub general_rssi: i8,
    /// Close presence radius (dBm). Strictly stronger signals also count
    /// toward the footstep effect. Must be nearer than `general_rssi`.
    pub close_rssi: i8,
}

impl SenseConfig {
    pub const fn new() -> Self {
        Self {
            general_rssi: GENERAL_RSSI_THRESHOLD,
            close_rssi: CLOSE_RSSI_THRESHOLD,
        }
    }

    /// Construct with explicit thresholds. The close radius must be
    /// stricter (nearer, i.e. larger dBm) than the general radius.
    pub fn with_thresholds(general_rssi: i8, close_rssi: i8) -> Self {
        debug_assert!(close_rssi > general_rssi);
        Self {
            general_rssi,
            close_rssi,
        }
    }
}

impl Default for SenseConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check one advertiser address against the allow-list.
///
/// Exact byte equality, first match wins. Must be called per observation —
/// the result is never cached across observations within a cycle.
pub fn is_known(addr: &[u8; 6]) -> bool {
    for known in defaults::KNOWN_DEVICES {
        if known == addr {
            return true;
        }
    }
    false
}
