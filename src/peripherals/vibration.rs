//! Control the vibration motor
//!
//! See https://wiki.pine64.org/wiki/PineTime for the pin assignment.

use embassy_nrf::gpio::{AnyPin, Output};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, signal::Signal};
use embassy_time::Timer;

use simple_digital::Haptics;

/// Pulse length used for notifications
pub const PULSE_MS: u64 = 200;

/// Pulse requests for the notify task
pub type PulseSignal = Signal<ThreadModeRawMutex, ()>;

/// Controller for the internal vibration motor
pub struct VibrationMotor<'a> {
    /// Pin P0.16: High = off, Low = on
    control_pin: Output<'a, AnyPin>,
}

impl<'a> VibrationMotor<'a> {
    /// Initialize vibration controller
    pub fn init(control_pin: Output<'a, AnyPin>) -> Self {
        Self { control_pin }
    }

    /// Pulse the vibration motor once for the specified time in ms.
    pub async fn pulse_once(&mut self, duration_ms: u64) {
        self.on();
        Timer::after_millis(duration_ms).await;
        self.off();
    }

    fn on(&mut self) {
        self.control_pin.set_low();
    }

    fn off(&mut self) {
        self.control_pin.set_high();
    }
}

/// Watchface side of the motor: hands pulses to the notify task so the
/// watchface never waits for the motor.
pub struct MotorSignal {
    signal: &'static PulseSignal,
}

impl MotorSignal {
    pub fn new(signal: &'static PulseSignal) -> Self {
        Self { signal }
    }
}

impl Haptics for MotorSignal {
    fn short_pulse(&mut self) {
        self.signal.signal(());
    }
}
