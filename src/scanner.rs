/// BLE scan observation types.
///
/// The firmware's scan event handler copies `(address, rssi)` pairs out of
/// advertisement reports; everything else in the advertisement is ignored.
/// One `ScanResult` is materialized per cycle and dropped at cycle end.

use heapless::Vec;

/// Upper bound on observations kept per cycle. Far above the point where
/// the classifier saturates (more than 15 unknown devices is already the
/// largest crowd class), so hitting the cap cannot change the command.
pub const MAX_OBSERVATIONS: usize = 64;

/// One advertiser seen during a scan round: raw 6-byte BLE address plus
/// received signal strength in dBm (larger = nearer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub addr: [u8; 6],
    pub rssi: i8,
}

impl Observation {
    pub const fn new(addr: [u8; 6], rssi: i8) -> Self {
        Self { addr, rssi }
    }
}

/// All observations from one scan round. Cycle-local; never survives the
/// cycle that produced it.
pub type ScanResult = Vec<Observation, MAX_OBSERVATIONS>;

/// Insert an observation unless its device was already recorded this round.
///
/// Advertisers report repeatedly during a scan round; keeping only the
/// first report per address stops one chatty device from filling the
/// result and crowding out later distinct devices. Returns false if the
/// observation was a repeat or the result is full.
pub fn record(scan: &mut ScanResult, obs: Observation) -> bool {
    if scan.iter().any(|seen| seen.addr == obs.addr) {
        return false;
    }
    scan.push(obs).is_ok()
}
