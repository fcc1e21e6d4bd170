/// Serial debug message schema.
///
/// The firmware emits one newline-delimited JSON message per cycle plus a
/// periodic status report, mirroring what the effect operators watch on the
/// serial console. Uses `heapless` types for no_std/no-alloc operation.
use heapless::{String, Vec};
use serde::Serialize;

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Messages emitted on the serial console as NDJSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage {
    /// Result of one scan-classify-publish cycle
    #[serde(rename = "cycle")]
    Cycle {
        /// Unknown devices inside the general radius
        general: u16,
        /// Unknown devices inside the close radius
        close: u16,
        /// Whether anything counted toward the general radius this cycle
        in_range: bool,
        /// Whether anything counted toward the close radius this cycle
        in_close_range: bool,
        /// Crowd classification: "absent", "sparse", "small", "large"
        crowd: &'static str,
        /// Command byte latched for the effect controller: "s", "f", "r"
        cmd: &'static str,
        /// Uptime in milliseconds when the cycle finished
        ts: u32,
    },
    /// Device status report
    #[serde(rename = "status")]
    Status {
        /// Uptime in seconds
        uptime: u32,
        /// Cycles completed since boot
        cycles: u32,
        /// Free heap in bytes
        heap_free: u32,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 256;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6], buf: &mut MacString) {
    use core::fmt::Write;
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}
