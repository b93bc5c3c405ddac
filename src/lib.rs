//! Simple digital watchface for the PineTime.
//!
//! This library holds the watchface logic that can be tested on the host
//! machine: time formatting, the persisted date preference, inbound settings
//! messages, the text regions on screen and the controller tying them
//! together. The firmware binary (`main.rs`) wires it to the nRF52832
//! peripherals.
//!
//! Run the tests on the host with:
//! ```bash
//! cargo test --lib
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

// This must go first so the logging macros are visible to every other module.
pub(crate) mod fmt;

pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod settings;
pub mod ui;
pub mod watchface;

pub use config::{LayoutConfig, WatchfaceOptions};
pub use error::Error;
pub use watchface::{Event, Haptics, Parts, Watchface};
