/// Command channel — the I2C responder side and serial NDJSON transport.
///
/// The effect controller is the I2C master; this sensor is the addressed
/// responder. Every master read is answered with the one byte currently in
/// the [`CommandLatch`], nothing else. Cycle results are additionally
/// streamed as newline-delimited JSON over serial for the operators.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::command::Command;
use crate::protocol::DeviceMessage;

/// I2C address this sensor answers on.
pub const RESPONDER_ADDRESS: u8 = 8;

/// Serial baud rate
pub const SERIAL_BAUD: u32 = 115200;

/// The published actuation command — the only state that outlives a cycle.
///
/// Written once per cycle at the encoding step, read at arbitrary times by
/// the I2C responder when the master polls. A single atomic byte, so a
/// concurrent read can never observe a torn value; no further
/// synchronization is needed for this write-once/read-any pattern.
pub struct CommandLatch(AtomicU8);

impl CommandLatch {
    /// A fresh latch holds `Stop` until the first cycle overwrites it.
    pub const fn new() -> Self {
        Self(AtomicU8::new(Command::Stop as u8))
    }

    /// Overwrite the published command. Called once per cycle; the latch is
    /// deliberately not touched by the per-cycle reset.
    pub fn publish(&self, cmd: Command) {
        self.0.store(cmd.as_byte(), Ordering::Relaxed);
    }

    /// The command currently served to the master.
    pub fn current(&self) -> Command {
        // Only `publish` ever writes, so the stored byte is always one of
        // the three command bytes.
        match Command::from_byte(self.0.load(Ordering::Relaxed)) {
            Some(cmd) => cmd,
            None => Command::Stop,
        }
    }

    /// Raw byte for the bus response.
    pub fn current_byte(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CommandLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MAX_MSG_LEN;

    #[test]
    fn fresh_latch_serves_stop() {
        let latch = CommandLatch::new();
        assert_eq!(latch.current(), Command::Stop);
        assert_eq!(latch.current_byte(), b's');
    }

    #[test]
    fn publish_overwrites() {
        let latch = CommandLatch::new();
        latch.publish(Command::Footstep);
        assert_eq!(latch.current(), Command::Footstep);
        assert_eq!(latch.current_byte(), b'f');
        latch.publish(Command::Vibrate);
        assert_eq!(latch.current_byte(), b'r');
    }

    #[test]
    fn latch_persists_until_next_publish() {
        // The per-cycle reset never clears the latch; only a publish does.
        let latch = CommandLatch::new();
        latch.publish(Command::Vibrate);
        for _ in 0..3 {
            assert_eq!(latch.current(), Command::Vibrate);
        }
        latch.publish(Command::Stop);
        assert_eq!(latch.current(), Command::Stop);
    }

    #[test]
    fn serialize_appends_newline() {
        let msg = DeviceMessage::Cycle {
            general: 1,
            close: 0,
            in_range: true,
            in_close_range: false,
            crowd: "sparse",
            cmd: "r",
            ts: 42,
        };
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(&msg, &mut buf).unwrap();
        assert_eq!(buf[len - 1], b'\n');
        let json = core::str::from_utf8(&buf[..len - 1]).unwrap();
        assert!(json.contains(r#""cmd":"r""#));
    }

    #[test]
    fn serialize_fails_cleanly_on_tiny_buffer() {
        let msg = DeviceMessage::Status {
            uptime: 0,
            cycles: 0,
            heap_free: 0,
            board: "b",
            version: "0.1.0",
        };
        let mut buf = [0u8; 4];
        assert!(serialize_message(&msg, &mut buf).is_none());
    }
}
