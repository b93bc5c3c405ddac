//! Backlight control
//!
//! See https://wiki.pine64.org/wiki/PineTime for the pin assignment.

use embassy_nrf::gpio::{AnyPin, Output};

/// Highest brightness level
pub const MAX_BRIGHTNESS: u8 = 7;

/// Control the backlight.
///
/// There are three active-low backlight pins, each connected to a FET that
/// toggles backlight power through a resistor.
///
/// - Low: 2.2 kΩ
/// - Mid: 100 Ω
/// - High: 30 Ω
///
/// Through combinations of these pins, 7 brightness levels (+ off) can be
/// configured.
pub struct Backlight {
    low: Output<'static, AnyPin>,
    mid: Output<'static, AnyPin>,
    high: Output<'static, AnyPin>,

    /// The current brightness level (value between 0 and 7).
    brightness: u8,
}

impl Backlight {
    /// Initialize the backlight with the specified level (0–7).
    pub fn init(
        low: Output<'static, AnyPin>,
        mid: Output<'static, AnyPin>,
        high: Output<'static, AnyPin>,
        brightness: u8,
    ) -> Self {
        let mut backlight = Self {
            low,
            mid,
            high,
            brightness,
        };
        backlight.set(brightness);
        backlight
    }

    /// Set the brightness level between 0 (off) and 7. Higher values are
    /// clamped to 7.
    pub fn set(&mut self, brightness: u8) {
        let brightness = brightness.min(MAX_BRIGHTNESS);
        defmt::debug!("Setting backlight brightness to {}", brightness);

        set_active_low(&mut self.low, brightness & 0x01 > 0);
        set_active_low(&mut self.mid, brightness & 0x02 > 0);
        set_active_low(&mut self.high, brightness & 0x04 > 0);
        self.brightness = brightness;
    }

    /// Return the current brightness level (value between 0 and 7).
    pub fn brightness(&self) -> u8 {
        self.brightness
    }
}

fn set_active_low(pin: &mut Output<'static, AnyPin>, on: bool) {
    if on {
        pin.set_low();
    } else {
        pin.set_high();
    }
}
