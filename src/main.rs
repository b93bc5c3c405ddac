#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Device
use core::cell::RefCell;

use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::{
    bind_interrupts,
    gpio::{Level, Output, OutputDrive, Pin as _},
    peripherals::SPI2,
    spim,
};
use embassy_sync::{blocking_mutex::Mutex, channel::Channel, signal::Signal};
use embassy_time::{Delay, Duration, Timer};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{
    backlight::Backlight,
    display::{self, Lcd, SpiBus},
    vibration::{MotorSignal, PulseSignal, VibrationMotor, PULSE_MS},
};
use system::{
    bluetooth::{self, MessageQueue, Server, TimeSync},
    config::{nrf_config, spim_config, BACKLIGHT_LEVEL, CLOCK_24H},
    time::{TimeManager, TimeReference},
};

// Watchface
use simple_digital::{
    clock::{seconds_until_next_minute, WallClock},
    settings::{FlashStore, SETTINGS_ADDRESS},
    Event, Parts, Watchface, WatchfaceOptions,
};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

type Flash = FlashStore<display::SharedSpi, Delay>;
type Face = Watchface<Lcd, Flash, TimeManager, MotorSignal>;

// Communication channels
static MESSAGES: MessageQueue = Channel::new();
static NOTIFY: PulseSignal = Signal::new();
static TIME_SYNC: TimeSync = Signal::new();

static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
static SERVER: StaticCell<Server> = StaticCell::new();

/// Run the SoftDevice event loop.
#[embassy_executor::task]
async fn softdevice(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Serve the companion app.
#[embassy_executor::task]
async fn ble(sd: &'static Softdevice, server: &'static Server) -> ! {
    bluetooth::serve(sd, server, &MESSAGES, &TIME_SYNC).await
}

/// Vibrate on request.
#[embassy_executor::task(pool_size = 1)]
async fn notify(mut motor: VibrationMotor<'static>) {
    loop {
        // Requests made while vibrating coalesce into one
        NOTIFY.wait().await;
        motor.pulse_once(PULSE_MS).await;
    }
}

/// Drive the watchface: redraw at each minute boundary, apply settings
/// messages and time updates as they arrive.
#[embassy_executor::task(pool_size = 1)]
async fn watchface(mut face: Face) {
    loop {
        let wait = seconds_until_next_minute(&face.clock_mut().now());
        let tick = Timer::after(Duration::from_secs(wait as u64));

        let result = match select3(tick, MESSAGES.receive(), TIME_SYNC.wait()).await {
            Either3::First(()) => face.handle(Event::MinuteTick),
            Either3::Second(payload) => face.handle(Event::Message(&payload)),
            Either3::Third(reference) => {
                defmt::info!("Clock set from phone");
                face.clock_mut().set_time(reference);
                face.handle(Event::MinuteTick)
            }
        };
        // Storage and display failures leave the watch in an unknown state
        unwrap!(result);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(nrf_config());
    defmt::info!("Initializing");

    // Bluetooth, must be enabled before the SoftDevice task runs
    let sd = Softdevice::enable(&bluetooth::softdevice_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;

    // Initialize Backlight
    let mut backlight = Backlight::init(
        Output::new(p.P0_14.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_23.degrade(), Level::High, OutputDrive::Standard),
        0,
    );

    // Initialize vibration motor
    let vibration = VibrationMotor::init(Output::new(
        p.P0_16.degrade(),
        Level::High,
        OutputDrive::Standard,
    ));

    // Initialize SPI, shared by the LCD (CS P0.25) and the flash (CS P0.05)
    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config());
    let bus = SPI_BUS.init(Mutex::new(RefCell::new(spim)));
    let lcd_spi = SpiDevice::new(
        bus,
        Output::new(p.P0_25.degrade(), Level::High, OutputDrive::Standard),
    );
    let flash_spi = SpiDevice::new(
        bus,
        Output::new(p.P0_05.degrade(), Level::High, OutputDrive::Standard),
    );

    // Initialize LCD
    let lcd = unwrap!(display::init(
        lcd_spi,
        Output::new(p.P0_18.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26.degrade(), Level::Low, OutputDrive::Standard),
    ));
    backlight.set(BACKLIGHT_LEVEL);
    defmt::debug!("Backlight at level {}", backlight.brightness());

    // Initialize flash
    let mut flash = FlashStore::new(flash_spi, Delay, SETTINGS_ADDRESS);
    match flash.read_id() {
        Ok(id) => defmt::info!("Flash ID {=u8:#x}", id),
        Err(err) => defmt::warn!("Flash not responding: {:?}", err),
    }

    // Clock starts at the build time until the phone sets it
    let clock = TimeManager::new(unwrap!(TimeReference::from_epoch(UTC_EPOCH)), CLOCK_24H);

    let face = unwrap!(Watchface::start(
        WatchfaceOptions::CONFIGURABLE,
        Parts {
            display: lcd,
            store: flash,
            clock,
            haptics: MotorSignal::new(&NOTIFY),
        },
    ));

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(softdevice(sd)));
    unwrap!(spawner.spawn(ble(sd, server)));
    unwrap!(spawner.spawn(notify(vibration)));
    unwrap!(spawner.spawn(watchface(face)));
}
