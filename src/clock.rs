//! Wall-clock readings and their fixed-width text form

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Source of the current local wall-clock time
pub trait WallClock {
    /// Current local time
    fn now(&self) -> NaiveDateTime;

    /// Whether hours are shown in 24-hour form
    fn is_24h(&self) -> bool;
}

/// Calendar fields of one instant, as needed by the watchface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockReading {
    /// 0–23
    pub hour: u8,
    /// 0–59
    pub minute: u8,
    /// 1–31
    pub day: u8,
    /// 1–12
    pub month: u8,
    pub is_24h: bool,
}

impl ClockReading {
    /// Take the fields of a local date and time.
    pub fn from_datetime(time: &NaiveDateTime, is_24h: bool) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            day: time.day() as u8,
            month: time.month() as u8,
            is_24h,
        }
    }

    /// Read the current time from a clock.
    pub fn read(clock: &impl WallClock) -> Self {
        Self::from_datetime(&clock.now(), clock.is_24h())
    }

    fn in_range(&self) -> bool {
        self.hour < 24
            && self.minute < 60
            && (1..=31).contains(&self.day)
            && (1..=12).contains(&self.month)
    }
}

/// Seconds from `time` to the start of the next minute (1–60)
pub fn seconds_until_next_minute(time: &NaiveDateTime) -> u32 {
    60 - time.second().min(59)
}

/// Decode a Bluetooth Current Time characteristic value.
///
/// Layout: year (u16 LE), month, day, hours, minutes, seconds, day of week,
/// fractions of 1/256 s, adjust reason. Returns `None` for short payloads
/// and impossible dates; an unknown year or month (0) counts as impossible.
pub fn datetime_from_cts(bytes: &[u8]) -> Option<NaiveDateTime> {
    let bytes: &[u8; CTS_LEN] = bytes.get(..CTS_LEN)?.try_into().ok()?;
    let year = u16::from_le_bytes([bytes[0], bytes[1]]) as i32;
    let milli = bytes[8] as u32 * 1000 / 256;

    NaiveDate::from_ymd_opt(year, bytes[2] as u32, bytes[3] as u32)?.and_hms_milli_opt(
        bytes[4] as u32,
        bytes[5] as u32,
        bytes[6] as u32,
        milli,
    )
}

/// Length of a Current Time characteristic value
pub const CTS_LEN: usize = 10;

/// Text of the hour, minute and date regions
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DisplayStrings {
    hour: [u8; 2],
    minute: [u8; 2],
    date: [u8; 5],
}

impl DisplayStrings {
    /// Two digits, zero padded
    pub fn hour(&self) -> &str {
        as_str(&self.hour)
    }

    /// Two digits, zero padded
    pub fn minute(&self) -> &str {
        as_str(&self.minute)
    }

    /// Day right-aligned in two characters, a dot, the month zero padded
    pub fn date(&self) -> &str {
        as_str(&self.date)
    }
}

impl fmt::Debug for DisplayStrings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayStrings")
            .field("hour", &self.hour())
            .field("minute", &self.minute())
            .field("date", &self.date())
            .finish()
    }
}

/// Format a reading into the three region strings.
///
/// # Panics
///
/// Panics if a field of `reading` is out of its calendar range.
pub fn format(reading: &ClockReading) -> DisplayStrings {
    assert!(reading.in_range(), "clock reading out of range");

    let hour = if reading.is_24h {
        reading.hour
    } else {
        match reading.hour % 12 {
            0 => 12,
            h => h,
        }
    };

    let mut strings = DisplayStrings {
        hour: *b"00",
        minute: *b"00",
        date: *b"00.00",
    };
    fill(&mut strings.hour, format_args!("{:02}", hour));
    fill(&mut strings.minute, format_args!("{:02}", reading.minute));
    fill(
        &mut strings.date,
        format_args!("{:>2}.{:02}", reading.day, reading.month),
    );
    strings
}

/// Write into a buffer that the arguments fill exactly.
fn fill(buf: &mut [u8], args: fmt::Arguments) {
    let len = buf.len();
    let written = format_no_std::show(buf, args).map(str::len);
    debug_assert_eq!(written, Ok(len));
}

fn as_str(bytes: &[u8]) -> &str {
    // Only ASCII digits, spaces and dots are ever written
    core::str::from_utf8(bytes).unwrap_or_default()
}
