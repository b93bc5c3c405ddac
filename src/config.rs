//! Watchface configuration: layout presets, persistence keys and limits.

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
    text::Alignment,
};

// =============================================================================
// Display
// =============================================================================

/// Display width in pixels (ST7789, 240x240)
pub const SCREEN_WIDTH: u32 = 240;

/// Display height in pixels
pub const SCREEN_HEIGHT: u32 = 240;

/// Screen background
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Hour digits (0x55FFFF)
pub const ELECTRIC_BLUE: Rgb565 = Rgb565::new(10, 63, 31);

/// Minute digits (0xFF55FF)
pub const SHOCKING_PINK: Rgb565 = Rgb565::new(31, 21, 31);

/// Point size of the hour and minute digits
pub const TIME_FONT_PT: u8 = 24;

/// Point size of the date
pub const DATE_FONT_PT: u8 = 18;

// =============================================================================
// Persistence and messaging
// =============================================================================

/// Store key and message key of the "show date" flag.
///
/// The companion app addresses the flag with the same key.
pub const KEY_SHOW_DATE: u32 = 1;

/// Store key of the marker written once the defaults are in place.
pub const KEY_DEFAULTS_SET: u32 = 3489;

/// Largest inbound settings message in bytes
pub const INBOX_SIZE: usize = 128;

// =============================================================================
// Layout
// =============================================================================

/// Placement and styling of one text region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionLayout {
    /// Region bounds on screen
    pub frame: Rectangle,
    /// Text color
    pub text_color: Rgb565,
    /// Font size in points
    pub font_pt: u8,
    /// Horizontal text alignment inside the frame
    pub alignment: Alignment,
}

impl RegionLayout {
    const fn centered(x: i32, y: i32, width: u32, height: u32, text_color: Rgb565, font_pt: u8) -> Self {
        Self {
            frame: Rectangle::new(Point::new(x, y), Size::new(width, height)),
            text_color,
            font_pt,
            alignment: Alignment::Center,
        }
    }
}

/// Screen layout of the watchface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Background of the whole screen and of every region
    pub background: Rgb565,
    pub hour: RegionLayout,
    pub minute: RegionLayout,
    /// Only constructed when the date setting is enabled
    pub date: RegionLayout,
}

impl LayoutConfig {
    /// Hour and minute side by side above a full-width date line.
    pub const WITH_DATE: Self = Self {
        background: BACKGROUND,
        hour: RegionLayout::centered(13, 47, 107, 111, ELECTRIC_BLUE, TIME_FONT_PT),
        minute: RegionLayout::centered(120, 47, 120, 111, SHOCKING_PINK, TIME_FONT_PT),
        date: RegionLayout::centered(0, 173, 240, 46, Rgb565::WHITE, DATE_FONT_PT),
    };

    /// Hour and minute side by side, vertically centered.
    pub const TIME_ONLY: Self = Self {
        background: BACKGROUND,
        hour: RegionLayout::centered(0, 64, 120, 112, ELECTRIC_BLUE, TIME_FONT_PT),
        minute: RegionLayout::centered(120, 64, 120, 112, SHOCKING_PINK, TIME_FONT_PT),
        date: RegionLayout::centered(0, 176, 240, 46, Rgb565::WHITE, DATE_FONT_PT),
    };
}

/// Watchface variant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchfaceOptions {
    /// Whether the date region exists and follows the persisted preference
    pub date_setting: bool,
    pub layout: LayoutConfig,
}

impl WatchfaceOptions {
    /// Hour, minute and a date the companion app can show or hide.
    pub const CONFIGURABLE: Self = Self {
        date_setting: true,
        layout: LayoutConfig::WITH_DATE,
    };

    /// Hour and minute only.
    pub const PLAIN: Self = Self {
        date_setting: false,
        layout: LayoutConfig::TIME_ONLY,
    };
}

impl Default for WatchfaceOptions {
    fn default() -> Self {
        Self::CONFIGURABLE
    }
}
