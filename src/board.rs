/// Hardware abstraction for supported boards.
///
/// Each board module defines pin assignments and capabilities
/// selected at compile time via feature flags.

#[cfg(feature = "board-devkit")]
mod hw {
    /// Green LED — pulses once per device inside the general radius.
    pub const LED_GENERAL_PIN: u8 = 18;
    /// Red LED — pulses once per device inside the close radius.
    pub const LED_CLOSE_PIN: u8 = 5;
    pub const HAS_PSRAM: bool = false;
    pub const BOARD_NAME: &str = "esp32_devkit";
}

#[cfg(not(feature = "board-devkit"))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
