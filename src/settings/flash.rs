//! Preferences on the external SPI NOR flash
//!
//! The PineTime carries a 4 MiB XT25F32B on the shared SPI bus. One 4 KiB
//! sector holds a small record table:
//!
//! | offset | size | content                    |
//! |--------|------|----------------------------|
//! | 0      | 4    | magic `SDPF`               |
//! | 4      | 1    | table version              |
//! | 5      | 1    | record count               |
//! | 6      | 5·n  | records: key (u32 LE), u8  |
//!
//! Every write rewrites the whole table, so all entries of one
//! [`KeyValueStore::write_bools`] call land in the same page program.

use embedded_hal::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};
use heapless::Vec;

use super::{KeyValueStore, StorageError};

/// Start of the settings sector (last sector of the flash)
pub const SETTINGS_ADDRESS: u32 = 0x3F_F000;

const SECTOR_SIZE: u32 = 4096;

// Instructions
const CMD_PAGE_PROGRAM: u8 = 0x02;
const CMD_READ: u8 = 0x03;
const CMD_READ_STATUS: u8 = 0x05;
const CMD_WRITE_ENABLE: u8 = 0x06;
const CMD_SECTOR_ERASE: u8 = 0x20;
const CMD_RELEASE_POWER_DOWN: u8 = 0xab;
const CMD_POWER_DOWN: u8 = 0xb9;

/// Write in progress bit of the status register
const STATUS_WIP: u8 = 0x01;

/// Busy polling: 10 000 × 100 µs gives a sector erase up to one second
const POLL_INTERVAL_US: u32 = 100;
const MAX_POLLS: u32 = 10_000;

const MAGIC: [u8; 4] = *b"SDPF";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 6;
const RECORD_LEN: usize = 5;

/// Most keys the table can hold
pub const MAX_RECORDS: usize = 16;

const TABLE_LEN: usize = HEADER_LEN + MAX_RECORDS * RECORD_LEN;

type Records = Vec<(u32, bool), MAX_RECORDS>;

/// Key value store in one flash sector
pub struct FlashStore<SPI, D> {
    /// Flash SPI device (handles chip select)
    spi: SPI,
    /// Delay between status polls
    delay: D,
    /// Start of the sector
    address: u32,
    /// Table as last read or written
    records: Option<Records>,
}

impl<SPI, D> FlashStore<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    /// Use the sector starting at `address`.
    ///
    /// # Panics
    ///
    /// Panics if `address` is not sector aligned.
    pub fn new(spi: SPI, delay: D, address: u32) -> Self {
        assert!(address % SECTOR_SIZE == 0, "settings address not sector aligned");
        Self {
            spi,
            delay,
            address,
            records: None,
        }
    }

    /// Give back the SPI device and delay.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    /// Read the electronic device ID.
    ///
    /// Also releases the flash from deep power down.
    pub fn read_id(&mut self) -> Result<u8, StorageError> {
        let mut id = [0];
        self.spi
            .transaction(&mut [
                Operation::Write(&[CMD_RELEASE_POWER_DOWN, 0x00, 0x00, 0x00]),
                Operation::Read(&mut id),
            ])
            .map_err(|_| StorageError::Bus)?;
        Ok(id[0])
    }

    /// Enter deep power down.
    pub fn power_down(&mut self) -> Result<(), StorageError> {
        self.spi
            .write(&[CMD_POWER_DOWN])
            .map_err(|_| StorageError::Bus)?;
        // tDP
        self.delay.delay_us(3);
        Ok(())
    }

    /// Leave deep power down.
    pub fn wake(&mut self) -> Result<(), StorageError> {
        self.spi
            .write(&[CMD_RELEASE_POWER_DOWN])
            .map_err(|_| StorageError::Bus)?;
        // tRES1
        self.delay.delay_us(20);
        Ok(())
    }

    /// Cached table, read from flash on first use.
    fn table(&mut self) -> Result<&Records, StorageError> {
        if self.records.is_none() {
            let mut raw = [0; TABLE_LEN];
            self.read(self.address, &mut raw)?;
            self.records = Some(decode(&raw)?);
        }
        Ok(self.records.get_or_insert_with(Records::new))
    }

    /// Erase the sector and program the table.
    fn commit(&mut self, records: &Records) -> Result<(), StorageError> {
        let (table, len) = encode(records);

        self.command(CMD_WRITE_ENABLE)?;
        self.spi
            .write(&with_address(CMD_SECTOR_ERASE, self.address))
            .map_err(|_| StorageError::Bus)?;
        self.wait_idle()?;

        self.command(CMD_WRITE_ENABLE)?;
        self.spi
            .transaction(&mut [
                Operation::Write(&with_address(CMD_PAGE_PROGRAM, self.address)),
                Operation::Write(&table[..len]),
            ])
            .map_err(|_| StorageError::Bus)?;
        self.wait_idle()
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        self.spi
            .transaction(&mut [
                Operation::Write(&with_address(CMD_READ, address)),
                Operation::Read(buf),
            ])
            .map_err(|_| StorageError::Bus)
    }

    fn command(&mut self, command: u8) -> Result<(), StorageError> {
        self.spi.write(&[command]).map_err(|_| StorageError::Bus)
    }

    /// Poll the status register until the running erase or program finishes.
    fn wait_idle(&mut self) -> Result<(), StorageError> {
        for _ in 0..MAX_POLLS {
            let mut status = [0];
            self.spi
                .transaction(&mut [
                    Operation::Write(&[CMD_READ_STATUS]),
                    Operation::Read(&mut status),
                ])
                .map_err(|_| StorageError::Bus)?;
            if status[0] & STATUS_WIP == 0 {
                return Ok(());
            }
            self.delay.delay_us(POLL_INTERVAL_US);
        }
        Err(StorageError::Timeout)
    }
}

impl<SPI, D> KeyValueStore for FlashStore<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    fn exists(&mut self, key: u32) -> Result<bool, StorageError> {
        Ok(self.table()?.iter().any(|&(k, _)| k == key))
    }

    fn read_bool(&mut self, key: u32) -> Result<Option<bool>, StorageError> {
        Ok(self
            .table()?
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, value)| value))
    }

    fn write_bool(&mut self, key: u32, value: bool) -> Result<(), StorageError> {
        self.write_bools(&[(key, value)])
    }

    fn write_bools(&mut self, entries: &[(u32, bool)]) -> Result<(), StorageError> {
        let mut records = match self.table() {
            Ok(records) => records.clone(),
            Err(StorageError::Corrupt) => {
                warn!("Settings sector unreadable, starting over");
                Records::new()
            }
            Err(err) => return Err(err),
        };
        for &(key, value) in entries {
            upsert(&mut records, key, value)?;
        }

        if self.records.as_ref() == Some(&records) {
            return Ok(());
        }

        // Forget the cache until the new table is on flash
        self.records = None;
        self.commit(&records)?;
        debug!("Settings sector written ({} records)", records.len());
        self.records = Some(records);
        Ok(())
    }
}

fn upsert(records: &mut Records, key: u32, value: bool) -> Result<(), StorageError> {
    match records.iter_mut().find(|(k, _)| *k == key) {
        Some(record) => record.1 = value,
        None => records
            .push((key, value))
            .map_err(|_| StorageError::Full)?,
    }
    Ok(())
}

fn with_address(command: u8, address: u32) -> [u8; 4] {
    let [_, a2, a1, a0] = address.to_be_bytes();
    [command, a2, a1, a0]
}

fn encode(records: &Records) -> ([u8; TABLE_LEN], usize) {
    let mut table = [0xff; TABLE_LEN];
    table[..4].copy_from_slice(&MAGIC);
    table[4] = VERSION;
    table[5] = records.len() as u8;
    for (record, &(key, value)) in table[HEADER_LEN..]
        .chunks_exact_mut(RECORD_LEN)
        .zip(records.iter())
    {
        record[..4].copy_from_slice(&key.to_le_bytes());
        record[4] = value as u8;
    }
    (table, HEADER_LEN + records.len() * RECORD_LEN)
}

fn decode(table: &[u8; TABLE_LEN]) -> Result<Records, StorageError> {
    // Erased or never written
    if table[..4] != MAGIC {
        return Ok(Records::new());
    }
    if table[4] != VERSION {
        return Err(StorageError::Corrupt);
    }
    let count = table[5] as usize;
    if count > MAX_RECORDS {
        return Err(StorageError::Corrupt);
    }

    let mut records = Records::new();
    for record in table[HEADER_LEN..].chunks_exact(RECORD_LEN).take(count) {
        let key = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let value = match record[4] {
            0 => false,
            1 => true,
            _ => return Err(StorageError::Corrupt),
        };
        records
            .push((key, value))
            .map_err(|_| StorageError::Corrupt)?;
    }
    Ok(records)
}
