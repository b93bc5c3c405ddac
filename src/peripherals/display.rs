//! LCD control
//!
//! The ST7789 shares SPI2 with the NOR flash; each device gets its own
//! chip-select through a shared bus.

use core::cell::RefCell;

use display_interface_spi::SPIInterfaceNoCS;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_nrf::{
    gpio::{AnyPin, Output},
    peripherals::SPI2,
    spim::Spim,
};
use embassy_sync::blocking_mutex::{raw::NoopRawMutex, Mutex};
use embassy_time::Delay;
use embedded_graphics::prelude::*;
use mipidsi::{models::ST7789, Builder, Orientation};

use simple_digital::{
    config::{BACKGROUND, SCREEN_HEIGHT, SCREEN_WIDTH},
    Error,
};

/// SPI2, shared between the LCD and the flash
pub type SpiBus = Mutex<NoopRawMutex, RefCell<Spim<'static, SPI2>>>;

/// One device on [`SpiBus`]
pub type SharedSpi = SpiDevice<'static, NoopRawMutex, Spim<'static, SPI2>, Output<'static, AnyPin>>;

/// The 240x240 panel
pub type Lcd = mipidsi::Display<
    SPIInterfaceNoCS<SharedSpi, Output<'static, AnyPin>>,
    ST7789,
    Output<'static, AnyPin>,
>;

/// Reset and configure the panel, then clear it to the watchface background.
pub fn init(
    spi: SharedSpi,
    dc: Output<'static, AnyPin>,
    rst: Output<'static, AnyPin>,
) -> Result<Lcd, Error> {
    let mut lcd = Builder::st7789(SPIInterfaceNoCS::new(spi, dc))
        .with_display_size(SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16)
        .with_orientation(Orientation::Portrait(false))
        .init(&mut Delay, Some(rst))
        .map_err(|_| Error::Display)?;

    lcd.clear(BACKGROUND).map_err(|_| Error::Display)?;
    Ok(lcd)
}
