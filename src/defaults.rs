/// Compiled-in constants for the reference deployment.
///
/// The allow-list, thresholds, and scan timing are fixed at build time.
/// There is no runtime configuration surface; changing any of these means
/// reflashing.

/// BLE addresses of devices that belong to the installation itself
/// (staff phones, the effect controller, house equipment). Devices on
/// this list never contribute to the presence counts.
pub static KNOWN_DEVICES: &[[u8; 6]] = &[
    [0xAA, 0xBC, 0xCC, 0xDD, 0xEE, 0xEE],
    [0x54, 0x2C, 0x7B, 0x87, 0x71, 0xA2],
    [0x72, 0x09, 0xB9, 0x28, 0x37, 0x6C],
    [0x6C, 0x9A, 0x00, 0x3A, 0x65, 0x47],
    [0x66, 0xF4, 0xD1, 0x6C, 0xFC, 0xB2],
    [0x5A, 0x2B, 0xF4, 0x61, 0x71, 0xAA],
    [0xF2, 0xDC, 0x7E, 0xBD, 0xF1, 0xAB],
    [0x49, 0x36, 0xEF, 0xF5, 0x9F, 0x0C],
    [0x4F, 0x08, 0x07, 0x83, 0xC3, 0x62],
    [0x5B, 0x51, 0xF2, 0x1D, 0x66, 0x4D],
    [0x53, 0x11, 0xD2, 0xBF, 0xFD, 0x04],
    [0x74, 0xBE, 0xF6, 0xA4, 0x81, 0x2F],
    [0xD7, 0x42, 0x99, 0x28, 0x27, 0x63],
];

/// General presence radius: an advertiser must be strictly stronger than
/// this to count at all.
pub const GENERAL_RSSI_THRESHOLD: i8 = -80;

/// Close presence radius for the footstep effect. Strictly nearer than the
/// general radius; evaluated only for advertisers that already passed it.
pub const CLOSE_RSSI_THRESHOLD: i8 = -50;

/// Duration of one scan round in seconds.
pub const SCAN_SECS: u64 = 5;

/// BLE scan interval, in 0.625 ms units.
pub const SCAN_INTERVAL: u16 = 25;

/// BLE scan window, in 0.625 ms units. Must be <= SCAN_INTERVAL.
pub const SCAN_WINDOW: u16 = 24;

/// Indicator LED pulse width in milliseconds (on phase and off phase each).
pub const INDICATOR_PULSE_MS: u64 = 15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_reference_deployment_size() {
        assert_eq!(KNOWN_DEVICES.len(), 13);
    }

    #[test]
    fn close_threshold_is_stricter_than_general() {
        assert!(CLOSE_RSSI_THRESHOLD > GENERAL_RSSI_THRESHOLD);
    }

    #[test]
    fn scan_window_fits_interval() {
        assert!(SCAN_WINDOW <= SCAN_INTERVAL);
    }
}
