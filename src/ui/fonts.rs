//! Fonts of the text regions

use embedded_graphics::mono_font::MonoFont;
use profont::{
    PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT,
    PROFONT_7_POINT, PROFONT_9_POINT,
};

use crate::{config::WatchfaceOptions, Error};

/// Font in the given point size
pub fn mono_font(pt: u8) -> Result<&'static MonoFont<'static>, Error> {
    match pt {
        7 => Ok(&PROFONT_7_POINT),
        9 => Ok(&PROFONT_9_POINT),
        10 => Ok(&PROFONT_10_POINT),
        12 => Ok(&PROFONT_12_POINT),
        14 => Ok(&PROFONT_14_POINT),
        18 => Ok(&PROFONT_18_POINT),
        24 => Ok(&PROFONT_24_POINT),
        _ => Err(Error::FontUnavailable(pt)),
    }
}

/// Fonts loaded for the lifetime of a watchface
pub struct Fonts {
    /// Hour and minute digits
    pub time: &'static MonoFont<'static>,
    /// Date, only loaded when the date region exists
    pub date: Option<&'static MonoFont<'static>>,
}

impl Fonts {
    /// Load every font the variant needs.
    pub fn load(options: &WatchfaceOptions) -> Result<Self, Error> {
        let layout = &options.layout;
        // Both time regions share one font
        if layout.hour.font_pt != layout.minute.font_pt {
            return Err(Error::FontUnavailable(layout.minute.font_pt));
        }
        let time = mono_font(layout.hour.font_pt)?;
        let date = if options.date_setting {
            Some(mono_font(layout.date.font_pt)?)
        } else {
            None
        };
        Ok(Self { time, date })
    }
}
