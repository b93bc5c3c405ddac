//! Board and firmware settings

use embassy_nrf::{
    config::{Config, Debug},
    interrupt::Priority,
    spim,
};

/// Backlight level while the watchface runs (0–7)
pub const BACKLIGHT_LEVEL: u8 = 3;

/// Settings messages waiting for the watchface task
pub const MESSAGE_QUEUE_LEN: usize = 4;

/// Name in advertisements and the GAP device name
pub const DEVICE_NAME: &str = "SimpleDigital";

/// Whether the clock shows hours in 24-hour form
pub const CLOCK_24H: bool = true;

/// nRF52832 peripheral configuration for running next to the SoftDevice.
///
/// The SoftDevice owns the clocks. Interrupt priorities 0, 1 and 4 are
/// reserved for it.
pub fn nrf_config() -> Config {
    // `Config` is `non_exhaustive`
    let mut config = Config::default();

    // Enable DC/DC regulator to massively reduce runtime current consumption
    config.dcdc.reg1 = true;

    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    config.debug = Debug::Allowed;

    config
}

/// SPI2 settings shared by the LCD and the flash
pub fn spim_config() -> spim::Config {
    let mut config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    config.mode = spim::MODE_3;
    config
}
