//! Drivers for the PineTime peripherals used by the watchface

pub(crate) mod backlight;
pub(crate) mod display;
pub(crate) mod vibration;
