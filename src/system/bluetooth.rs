//! Bluetooth: advertising, the GATT server and its events

use core::mem;

use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel, signal::Signal};
use nrf_softdevice::{
    self,
    ble::{
        advertisement_builder::{
            Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
            ServiceUuid16,
        },
        gatt_server, peripheral,
    },
    raw, Config, Softdevice,
};

use simple_digital::{clock::CTS_LEN, config::INBOX_SIZE};

use super::{
    config::{DEVICE_NAME, MESSAGE_QUEUE_LEN},
    time::TimeReference,
};

/// One settings message as written by the companion app
pub type Payload = heapless::Vec<u8, INBOX_SIZE>;

/// Settings messages in arrival order
pub type MessageQueue = Channel<ThreadModeRawMutex, Payload, MESSAGE_QUEUE_LEN>;

/// Latest time written by the phone, referenced to its arrival
pub type TimeSync = Signal<ThreadModeRawMutex, TimeReference>;

pub static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .full_name(DEVICE_NAME)
    .build();

pub static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::CURRENT_TIME])
    .build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub settings: SettingsService,
    pub cts: CurrentTimeService,
}

/// Watchface settings written by the companion app
#[nrf_softdevice::gatt_service(uuid = "5d0a0001-7c2e-4bd5-9a0b-51a4e1f2c301")]
pub struct SettingsService {
    #[characteristic(uuid = "5d0a0002-7c2e-4bd5-9a0b-51a4e1f2c301", write)]
    pub payload: Payload,
}

#[nrf_softdevice::gatt_service(uuid = "1805")]
pub struct CurrentTimeService {
    #[characteristic(uuid = "2a2b", write)]
    pub current_time: [u8; CTS_LEN],
}

/// SoftDevice configuration: one peripheral link, no central role.
pub fn softdevice_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 256 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Advertise, serve one connection at a time, repeat.
pub async fn serve(
    sd: &'static Softdevice,
    server: &'static Server,
    messages: &'static MessageQueue,
    time: &'static TimeSync,
) -> ! {
    let config = peripheral::Config::default();
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(err) => {
                defmt::warn!("Advertising failed: {:?}", err);
                continue;
            }
        };
        defmt::info!("Companion connected");

        let reason = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Settings(SettingsServiceEvent::PayloadWrite(payload)) => {
                defmt::debug!("Settings message ({} bytes)", payload.len());
                if messages.try_send(payload).is_err() {
                    defmt::warn!("Settings queue full, message dropped");
                }
            }
            ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeWrite(bytes)) => {
                match TimeReference::from_cts_bytes(&bytes) {
                    Some(reference) => time.signal(reference),
                    None => defmt::warn!("Invalid current time {:?}", bytes),
                }
            }
        })
        .await;
        defmt::info!("Companion disconnected: {:?}", reason);
    }
}
