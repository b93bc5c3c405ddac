//! Screen contents of the watchface

use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::PrimitiveStyle};

use crate::{clock::DisplayStrings, config::WatchfaceOptions};

mod fonts;
mod label;

pub use fonts::{mono_font, Fonts};
pub use label::Label;

/// Text regions of the watchface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionId {
    Hour,
    Minute,
    Date,
}

/// Which regions are shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Visibility {
    pub hour: bool,
    pub minute: bool,
    pub date: bool,
}

/// Region visibility for a "show date" preference.
///
/// Hour and minute are always shown.
pub fn derive_visibility(show_date: bool) -> Visibility {
    Visibility {
        hour: true,
        minute: true,
        date: show_date,
    }
}

/// The text regions on screen
pub struct DisplayState {
    background: Rgb565,
    hour: Label,
    minute: Label,
    /// Only exists when the date setting is enabled
    date: Option<Label>,
}

impl DisplayState {
    /// Create the regions of a watchface variant, all visible and empty.
    pub fn new(options: &WatchfaceOptions, fonts: &Fonts) -> Self {
        let layout = &options.layout;
        Self {
            background: layout.background,
            hour: Label::new(&layout.hour, fonts.time, layout.background),
            minute: Label::new(&layout.minute, fonts.time, layout.background),
            date: fonts
                .date
                .filter(|_| options.date_setting)
                .map(|font| Label::new(&layout.date, font, layout.background)),
        }
    }

    /// Overwrite the text of every region, hidden ones included.
    pub fn apply_strings(&mut self, strings: &DisplayStrings) {
        self.hour.set_text(strings.hour());
        self.minute.set_text(strings.minute());
        if let Some(date) = self.date.as_mut() {
            date.set_text(strings.date());
        }
    }

    /// Show or hide regions.
    pub fn apply_visibility(&mut self, visibility: Visibility) {
        self.hour.set_hidden(!visibility.hour);
        self.minute.set_hidden(!visibility.minute);
        if let Some(date) = self.date.as_mut() {
            date.set_hidden(!visibility.date);
        }
    }

    /// Current visibility; a missing region counts as hidden.
    pub fn visibility(&self) -> Visibility {
        Visibility {
            hour: self.is_visible(RegionId::Hour),
            minute: self.is_visible(RegionId::Minute),
            date: self.is_visible(RegionId::Date),
        }
    }

    pub fn label(&self, id: RegionId) -> Option<&Label> {
        match id {
            RegionId::Hour => Some(&self.hour),
            RegionId::Minute => Some(&self.minute),
            RegionId::Date => self.date.as_ref(),
        }
    }

    pub fn text(&self, id: RegionId) -> Option<&str> {
        self.label(id).map(Label::text)
    }

    pub fn is_visible(&self, id: RegionId) -> bool {
        self.label(id).is_some_and(|label| !label.is_hidden())
    }

    /// Redraw a single region in place. A hidden region is filled with the
    /// background; a missing one draws nothing.
    pub fn draw_region<D>(&self, id: RegionId, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match self.label(id) {
            Some(label) if label.is_hidden() => label
                .frame()
                .into_styled(PrimitiveStyle::with_fill(self.background))
                .draw(target),
            Some(label) => label.draw(target),
            None => Ok(()),
        }
    }
}

impl Drawable for DisplayState {
    type Color = Rgb565;
    type Output = ();

    /// Clear the screen, then draw every visible region.
    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        target.clear(self.background)?;
        self.hour.draw(target)?;
        self.minute.draw(target)?;
        if let Some(date) = &self.date {
            date.draw(target)?;
        }
        Ok(())
    }
}
