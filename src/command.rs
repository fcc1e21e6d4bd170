/// Actuation command encoding.
///
/// The effect controller understands three modes, one ASCII byte each.
/// These byte values are the wire protocol of the I2C command channel and
/// must not change without reflashing both controllers.

use crate::census::{Classification, CrowdSize};

/// Actuation mode served to the effect controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Mode 0 — no audience, all effects off.
    Stop = b's',
    /// Mode 2 — small crowd, footstep effect.
    Footstep = b'f',
    /// Mode 1 — random vibration. Driven for large crowds and for the
    /// sparse 1-4 band alike.
    Vibrate = b'r',
}

impl Command {
    /// Encode a crowd classification.
    ///
    /// Anything present that is not a small crowd vibrates; only the
    /// 5-15 band gets the footstep effect.
    pub fn from_classification(c: Classification) -> Self {
        match c {
            Classification::Absent => Command::Stop,
            Classification::Present(CrowdSize::Small) => Command::Footstep,
            Classification::Present(_) => Command::Vibrate,
        }
    }

    /// The single byte sent on the bus.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a bus byte. Unknown bytes are not a `Command`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' => Some(Command::Stop),
            b'f' => Some(Command::Footstep),
            b'r' => Some(Command::Vibrate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Stop => "s",
            Command::Footstep => "f",
            Command::Vibrate => "r",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::Classification;

    #[test]
    fn absent_stops() {
        assert_eq!(
            Command::from_classification(Classification::from_count(0)),
            Command::Stop
        );
    }

    #[test]
    fn small_crowd_footsteps() {
        for n in 5..=15 {
            assert_eq!(
                Command::from_classification(Classification::from_count(n)),
                Command::Footstep,
                "count {n}"
            );
        }
    }

    #[test]
    fn large_crowd_vibrates() {
        assert_eq!(
            Command::from_classification(Classification::from_count(20)),
            Command::Vibrate
        );
    }

    #[test]
    fn sparse_band_vibrates_like_large() {
        // 1-4 devices drive the same mode as >15 — deployed behavior.
        for n in 1..=4 {
            assert_eq!(
                Command::from_classification(Classification::from_count(n)),
                Command::Vibrate,
                "count {n}"
            );
        }
    }

    #[test]
    fn wire_bytes() {
        assert_eq!(Command::Stop.as_byte(), b's');
        assert_eq!(Command::Footstep.as_byte(), b'f');
        assert_eq!(Command::Vibrate.as_byte(), b'r');
    }

    #[test]
    fn byte_round_trip() {
        for cmd in [Command::Stop, Command::Footstep, Command::Vibrate] {
            assert_eq!(Command::from_byte(cmd.as_byte()), Some(cmd));
        }
        assert_eq!(Command::from_byte(b'x'), None);
        assert_eq!(Command::from_byte(0), None);
    }
}
