/// Per-cycle pipeline: filter and count, classify, encode.
///
/// The firmware loop materializes one [`ScanResult`](crate::scanner::ScanResult)
/// per scan round and hands it here. Everything below is pure: the per-cycle
/// state is created at the top of `run_cycle` and returned in the outcome,
/// so nothing can leak into the next cycle. Publishing the command and
/// firing the indicator stay with the caller.

use heapless::Vec;

use crate::census::{Classification, CycleCounts};
use crate::command::Command;
use crate::filter::SenseConfig;
use crate::protocol::{format_mac, MacString};
use crate::scanner::{Observation, MAX_OBSERVATIONS};

/// Everything one cycle produced. The counts snapshot outlives the cycle
/// just long enough for the caller to drive the indicator.
#[derive(Debug, Clone, Copy)]
pub struct CycleOutcome {
    pub counts: CycleCounts,
    pub classification: Classification,
    pub command: Command,
}

/// Run one full cycle over a materialized scan.
///
/// BLE devices advertise repeatedly, so the scan may carry several reports
/// for one address; each device is counted once per cycle, on its first
/// report (later reports of the same address are dropped, as the radio's
/// duplicate filter would). An empty scan is not an error: it degenerates
/// to zero counts, `Absent`, and `Stop`. There are no other failure paths —
/// scanner trouble is the scanner's concern and shows up here as an empty
/// or short scan.
pub fn run_cycle(scan: &[Observation], cfg: &SenseConfig) -> CycleOutcome {
    let mut counts = CycleCounts::new();
    let mut seen: Vec<[u8; 6], MAX_OBSERVATIONS> = Vec::new();
    for obs in scan {
        if seen.iter().any(|addr| addr == &obs.addr) {
            continue;
        }
        let _ = seen.push(obs.addr);
        if log::log_enabled!(log::Level::Debug) {
            let mut mac = MacString::new();
            format_mac(&obs.addr, &mut mac);
            log::debug!("observation: {} at {} dBm", mac.as_str(), obs.rssi);
        }
        counts.tally(obs, cfg);
    }

    let classification = Classification::from_count(counts.general);
    let command = Command::from_classification(classification);

    log::info!(
        "cycle: {} in range, {} close, crowd {}, command '{}'",
        counts.general,
        counts.close,
        classification.as_str(),
        command.as_str(),
    );

    CycleOutcome {
        counts,
        classification,
        command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::CrowdSize;
    use crate::scanner::{Observation, ScanResult};

    fn obs(last_byte: u8, rssi: i8) -> Observation {
        Observation::new([0x11, 0x22, 0x33, 0x44, 0x55, last_byte], rssi)
    }

    fn scan_of(n: u16, rssi: i8) -> ScanResult {
        let mut scan = ScanResult::new();
        for i in 0..n {
            let _ = scan.push(obs(i as u8, rssi));
        }
        scan
    }

    #[test]
    fn empty_scan_stops() {
        let outcome = run_cycle(&[], &SenseConfig::new());
        assert_eq!(outcome.counts, crate::census::CycleCounts::new());
        assert_eq!(outcome.classification, Classification::Absent);
        assert_eq!(outcome.command, Command::Stop);
    }

    #[test]
    fn empty_scan_stops_regardless_of_prior_cycles() {
        // State is cycle-scoped: a busy cycle leaves nothing behind.
        let cfg = SenseConfig::new();
        let busy = run_cycle(&scan_of(20, -40), &cfg);
        assert_eq!(busy.command, Command::Vibrate);

        let idle = run_cycle(&[], &cfg);
        assert_eq!(idle.counts.general, 0);
        assert_eq!(idle.command, Command::Stop);
    }

    #[test]
    fn ten_devices_footstep() {
        let outcome = run_cycle(&scan_of(10, -60), &SenseConfig::new());
        assert_eq!(outcome.counts.general, 10);
        assert_eq!(
            outcome.classification,
            Classification::Present(CrowdSize::Small)
        );
        assert_eq!(outcome.command, Command::Footstep);
    }

    #[test]
    fn twenty_devices_vibrate() {
        let outcome = run_cycle(&scan_of(20, -60), &SenseConfig::new());
        assert_eq!(outcome.command, Command::Vibrate);
    }

    #[test]
    fn three_devices_vibrate() {
        // The sparse 1-4 band drives the same mode as a large crowd.
        let outcome = run_cycle(&scan_of(3, -60), &SenseConfig::new());
        assert_eq!(
            outcome.classification,
            Classification::Present(CrowdSize::Sparse)
        );
        assert_eq!(outcome.command, Command::Vibrate);
    }

    #[test]
    fn reference_scenario() {
        // Registry device at -40 excluded; -60 counts general only;
        // -90 out of range. One unknown in range => vibrate.
        let cfg = SenseConfig::new();
        let scan = [
            Observation::new([0xAA, 0xBC, 0xCC, 0xDD, 0xEE, 0xEE], -40),
            obs(0x01, -60),
            obs(0x02, -90),
        ];
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 1);
        assert_eq!(outcome.counts.close, 0);
        assert_eq!(
            outcome.classification,
            Classification::Present(CrowdSize::Sparse)
        );
        assert_eq!(outcome.command, Command::Vibrate);
    }

    #[test]
    fn repeated_reports_of_one_device_count_once() {
        // One phone advertising at a few Hz across the round is still one
        // person, not a large crowd.
        let cfg = SenseConfig::new();
        let mut scan = ScanResult::new();
        for _ in 0..20 {
            let _ = scan.push(obs(0x01, -60));
        }
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 1);
        assert_eq!(
            outcome.classification,
            Classification::Present(CrowdSize::Sparse)
        );
        assert_eq!(outcome.command, Command::Vibrate);
    }

    #[test]
    fn repeated_close_reports_count_once() {
        let cfg = SenseConfig::new();
        let mut scan = ScanResult::new();
        for _ in 0..10 {
            let _ = scan.push(obs(0x01, -40));
        }
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 1);
        assert_eq!(outcome.counts.close, 1);
    }

    #[test]
    fn duplicates_do_not_shift_the_classification() {
        // 6 distinct devices reported 5 times each: a small crowd, not 30.
        let cfg = SenseConfig::new();
        let mut scan = ScanResult::new();
        for round in 0..5 {
            for dev in 0..6 {
                let _ = scan.push(obs(dev, -60 - round));
            }
        }
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 6);
        assert_eq!(outcome.command, Command::Footstep);
    }

    #[test]
    fn first_report_wins_for_a_repeated_address() {
        // The first report carries the RSSI that counts, as with the
        // radio's own duplicate filter.
        let cfg = SenseConfig::new();
        let scan = [obs(0x01, -90), obs(0x01, -40)];
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 0);
        assert_eq!(outcome.command, Command::Stop);
    }

    #[test]
    fn mixed_ranges_count_correctly() {
        let cfg = SenseConfig::new();
        let mut scan = ScanResult::new();
        let _ = scan.push(obs(1, -40)); // close + general
        let _ = scan.push(obs(2, -45)); // close + general
        let _ = scan.push(obs(3, -70)); // general only
        let _ = scan.push(obs(4, -80)); // boundary, no count
        let _ = scan.push(obs(5, -100)); // out of range
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 3);
        assert_eq!(outcome.counts.close, 2);
        assert!(outcome.counts.general_seen);
        assert!(outcome.counts.close_seen);
        assert_eq!(outcome.command, Command::Vibrate);
    }

    #[test]
    fn known_devices_do_not_shift_the_classification() {
        // 10 unknowns plus every registry device up close: still "small".
        let cfg = SenseConfig::new();
        let mut scan = ScanResult::new();
        for i in 0..10 {
            let _ = scan.push(obs(i, -60));
        }
        for known in crate::defaults::KNOWN_DEVICES {
            let _ = scan.push(Observation::new(*known, -30));
        }
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 10);
        assert_eq!(outcome.command, Command::Footstep);
    }

    #[test]
    fn custom_thresholds_apply() {
        let cfg = SenseConfig::with_thresholds(-70, -30);
        let scan = [obs(1, -75), obs(2, -60), obs(3, -20)];
        let outcome = run_cycle(&scan, &cfg);
        assert_eq!(outcome.counts.general, 2);
        assert_eq!(outcome.counts.close, 1);
    }
}
