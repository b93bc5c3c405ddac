//! Watchface controller
//!
//! Reacts to two kinds of events, delivered one at a time by the firmware:
//! the minute tick and inbound settings messages.

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

use crate::{
    clock::{format, ClockReading, WallClock},
    config::{WatchfaceOptions, KEY_SHOW_DATE},
    message::Dictionary,
    settings::{KeyValueStore, Preferences},
    ui::{derive_visibility, DisplayState, Fonts, RegionId},
    Error,
};

/// Tactile acknowledgment
pub trait Haptics {
    /// Start one short vibration pulse without waiting for it to end.
    fn short_pulse(&mut self);
}

/// Collaborators of a watchface
pub struct Parts<D, K, C, H> {
    /// Render target
    pub display: D,
    /// Preference store
    pub store: K,
    /// Wall clock
    pub clock: C,
    /// Vibration motor
    pub haptics: H,
}

/// Event delivered by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// Start of a new minute
    MinuteTick,
    /// Settings message from the companion app
    Message(&'a [u8]),
}

/// Running watchface
pub struct Watchface<D, K, C, H> {
    options: WatchfaceOptions,
    fonts: Fonts,
    state: DisplayState,
    prefs: Preferences<K>,
    show_date: bool,
    display: D,
    clock: C,
    haptics: H,
}

impl<D, K, C, H> Watchface<D, K, C, H>
where
    D: DrawTarget<Color = Rgb565>,
    K: KeyValueStore,
    C: WallClock,
    H: Haptics,
{
    /// Load fonts and preferences, create the regions and draw the current
    /// time right away.
    pub fn start(options: WatchfaceOptions, parts: Parts<D, K, C, H>) -> Result<Self, Error> {
        let fonts = Fonts::load(&options)?;
        let state = DisplayState::new(&options, &fonts);

        let mut face = Self {
            options,
            fonts,
            state,
            prefs: Preferences::new(parts.store),
            show_date: false,
            display: parts.display,
            clock: parts.clock,
            haptics: parts.haptics,
        };
        if face.options.date_setting {
            face.load_preferences()?;
        }
        face.state.apply_visibility(derive_visibility(face.show_date));
        info!(
            "Watchface started (date setting: {}, show date: {})",
            face.options.date_setting,
            face.show_date
        );

        face.refresh_time()?;
        Ok(face)
    }

    /// Redraw with the current time.
    pub fn on_minute_tick(&mut self) -> Result<(), Error> {
        self.refresh_time()
    }

    /// Apply a settings message, then redraw the date region with its new
    /// visibility and acknowledge with a vibration pulse.
    ///
    /// Unknown keys are skipped. A malformed message is applied up to the
    /// fault. Only a failure to persist a preference is returned.
    pub fn on_message(&mut self, payload: &[u8]) -> Result<(), Error> {
        if !self.options.date_setting {
            trace!("Settings message ignored ({} bytes)", payload.len());
            return Ok(());
        }

        match Dictionary::parse(payload) {
            Ok(dict) => {
                for tuple in dict.iter() {
                    match tuple {
                        Ok(tuple) if tuple.key == KEY_SHOW_DATE => {
                            let show = tuple.value.is_true();
                            info!("Show date set to {}", show);
                            self.prefs.set_show_date(show)?;
                        }
                        Ok(tuple) => trace!("Ignoring settings key {}", tuple.key),
                        Err(err) => warn!("Settings message cut short: {}", err),
                    }
                }
            }
            Err(err) => warn!("Settings message dropped: {}", err),
        }

        self.load_preferences()?;
        self.state
            .apply_visibility(derive_visibility(self.show_date));
        self.state
            .draw_region(RegionId::Date, &mut self.display)
            .map_err(|_| Error::Display)?;
        self.haptics.short_pulse();
        Ok(())
    }

    /// Dispatch an event.
    pub fn handle(&mut self, event: Event<'_>) -> Result<(), Error> {
        match event {
            Event::MinuteTick => self.on_minute_tick(),
            Event::Message(payload) => self.on_message(payload),
        }
    }

    /// Release the fonts and regions and hand back the collaborators.
    pub fn stop(self) -> Parts<D, K, C, H> {
        let Self {
            prefs,
            display,
            clock,
            haptics,
            ..
        } = self;
        info!("Watchface stopped");

        Parts {
            display,
            store: prefs.into_inner(),
            clock,
            haptics,
        }
    }

    /// Regions as currently shown
    pub fn display_state(&self) -> &DisplayState {
        &self.state
    }

    /// "Show date" preference as last loaded
    pub fn show_date(&self) -> bool {
        self.show_date
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn load_preferences(&mut self) -> Result<(), Error> {
        self.prefs.ensure_defaults()?;
        self.show_date = self.prefs.show_date();
        Ok(())
    }

    fn refresh_time(&mut self) -> Result<(), Error> {
        let strings = format(&ClockReading::read(&self.clock));
        debug!(
            "Time {}:{}, date {}",
            strings.hour(),
            strings.minute(),
            strings.date()
        );
        self.state.apply_strings(&strings);
        self.render()
    }

    fn render(&mut self) -> Result<(), Error> {
        self.state
            .draw(&mut self.display)
            .map_err(|_| Error::Display)
    }
}
