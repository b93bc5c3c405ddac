//! Inbound settings messages from the companion app
//!
//! A message is a dictionary of key/value tuples:
//!
//! ```text
//! count: u8
//! count × { key: u32 LE, type: u8, length: u16 LE, value: [u8; length] }
//! ```
//!
//! Types: 0 byte array, 1 C string (optionally NUL terminated), 2 unsigned
//! and 3 signed little-endian integers of 1, 2 or 4 bytes.

use crate::config::INBOX_SIZE;

const TUPLE_HEADER_LEN: usize = 7;

const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Malformed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// The payload ends inside a tuple
    Truncated,
    /// The payload exceeds the inbox size
    TooLarge,
}

/// Value of one tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleValue<'a> {
    Bytes(&'a [u8]),
    CString(&'a str),
    Uint(u32),
    Int(i32),
}

impl<'a> TupleValue<'a> {
    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::CString(s) => Some(s),
            _ => None,
        }
    }

    /// Flag value as the companion app sends it: only the string `"true"`
    /// means true.
    pub fn is_true(&self) -> bool {
        self.as_str() == Some("true")
    }
}

/// One key/value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuple<'a> {
    pub key: u32,
    pub value: TupleValue<'a>,
}

/// Received settings message
#[derive(Debug, Clone, Copy)]
pub struct Dictionary<'a> {
    count: u8,
    tuples: &'a [u8],
}

impl<'a> Dictionary<'a> {
    /// Check the message header.
    ///
    /// Tuples are decoded lazily by [`Dictionary::iter`].
    pub fn parse(payload: &'a [u8]) -> Result<Self, MessageError> {
        if payload.len() > INBOX_SIZE {
            return Err(MessageError::TooLarge);
        }
        match payload.split_first() {
            Some((&count, tuples)) => Ok(Self { count, tuples }),
            None => Err(MessageError::Truncated),
        }
    }

    /// Number of tuples announced in the header
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Decode the tuples in order. Decoding stops after the first error.
    pub fn iter(&self) -> Tuples<'a> {
        Tuples {
            remaining: self.count,
            data: self.tuples,
        }
    }
}

impl<'a> IntoIterator for &Dictionary<'a> {
    type Item = Result<Tuple<'a>, MessageError>;
    type IntoIter = Tuples<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tuples of a [`Dictionary`]
pub struct Tuples<'a> {
    remaining: u8,
    data: &'a [u8],
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Result<Tuple<'a>, MessageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.decode_next();
        self.remaining = match result {
            Ok(_) => self.remaining - 1,
            Err(_) => 0,
        };
        Some(result)
    }
}

impl<'a> Tuples<'a> {
    fn decode_next(&mut self) -> Result<Tuple<'a>, MessageError> {
        if self.data.len() < TUPLE_HEADER_LEN {
            return Err(MessageError::Truncated);
        }
        let (header, rest) = self.data.split_at(TUPLE_HEADER_LEN);
        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let kind = header[4];
        let len = u16::from_le_bytes([header[5], header[6]]) as usize;
        if rest.len() < len {
            return Err(MessageError::Truncated);
        }
        let (raw, rest) = rest.split_at(len);
        self.data = rest;

        Ok(Tuple {
            key,
            value: decode_value(kind, raw),
        })
    }
}

fn decode_value(kind: u8, raw: &[u8]) -> TupleValue<'_> {
    match (kind, raw.len()) {
        (TYPE_CSTRING, _) => {
            let text = match raw.iter().position(|&b| b == 0) {
                Some(end) => &raw[..end],
                None => raw,
            };
            match core::str::from_utf8(text) {
                Ok(s) => TupleValue::CString(s),
                Err(_) => TupleValue::Bytes(raw),
            }
        }
        (TYPE_UINT, 1) => TupleValue::Uint(raw[0] as u32),
        (TYPE_UINT, 2) => TupleValue::Uint(u16::from_le_bytes([raw[0], raw[1]]) as u32),
        (TYPE_UINT, 4) => TupleValue::Uint(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        (TYPE_INT, 1) => TupleValue::Int(raw[0] as i8 as i32),
        (TYPE_INT, 2) => TupleValue::Int(i16::from_le_bytes([raw[0], raw[1]]) as i32),
        (TYPE_INT, 4) => TupleValue::Int(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        // Byte arrays, unknown types and odd integer widths
        _ => TupleValue::Bytes(raw),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const TYPE_BYTES: u8 = 0;

    /// Frames a message the way the companion app does.
    pub(crate) struct PayloadBuilder {
        count: u8,
        tuples: std::vec::Vec<u8>,
    }

    impl PayloadBuilder {
        pub(crate) fn new() -> Self {
            Self {
                count: 0,
                tuples: std::vec::Vec::new(),
            }
        }

        pub(crate) fn tuple(mut self, key: u32, kind: u8, value: &[u8]) -> Self {
            self.count += 1;
            self.tuples.extend_from_slice(&key.to_le_bytes());
            self.tuples.push(kind);
            self.tuples.extend_from_slice(&(value.len() as u16).to_le_bytes());
            self.tuples.extend_from_slice(value);
            self
        }

        /// NUL terminated string
        pub(crate) fn cstring(self, key: u32, value: &str) -> Self {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            self.tuple(key, TYPE_CSTRING, &bytes)
        }

        pub(crate) fn build(self) -> std::vec::Vec<u8> {
            let mut out = std::vec![self.count];
            out.extend_from_slice(&self.tuples);
            out
        }
    }

    fn collect(payload: &[u8]) -> std::vec::Vec<Result<Tuple<'_>, MessageError>> {
        Dictionary::parse(payload).unwrap().iter().collect()
    }

    #[test]
    fn test_string_tuples() {
        let data = PayloadBuilder::new()
            .cstring(1, "true")
            .tuple(9, TYPE_CSTRING, b"hello")
            .build();
        assert_eq!(
            collect(&data),
            [
                Ok(Tuple {
                    key: 1,
                    value: TupleValue::CString("true"),
                }),
                Ok(Tuple {
                    key: 9,
                    value: TupleValue::CString("hello"),
                }),
            ]
        );
    }

    #[test]
    fn test_integer_and_byte_tuples() {
        let data = PayloadBuilder::new()
            .tuple(2, TYPE_UINT, &[0x34, 0x12])
            .tuple(3, TYPE_INT, &[0xff])
            .tuple(4, TYPE_INT, &(-70_000i32).to_le_bytes())
            .tuple(5, TYPE_UINT, &[1, 2, 3])
            .tuple(6, TYPE_BYTES, b"true")
            .tuple(7, 0x42, &[9])
            .build();
        let values: std::vec::Vec<_> = collect(&data)
            .into_iter()
            .map(|tuple| tuple.unwrap().value)
            .collect();
        assert_eq!(
            values,
            [
                TupleValue::Uint(0x1234),
                TupleValue::Int(-1),
                TupleValue::Int(-70_000),
                TupleValue::Bytes(&[1, 2, 3]),
                TupleValue::Bytes(b"true"),
                TupleValue::Bytes(&[9]),
            ]
        );
    }

    #[test]
    fn test_flag_interpretation() {
        assert!(TupleValue::CString("true").is_true());
        assert!(!TupleValue::CString("false").is_true());
        assert!(!TupleValue::CString("TRUE").is_true());
        assert!(!TupleValue::CString("").is_true());
        assert!(!TupleValue::Uint(1).is_true());
        assert!(!TupleValue::Bytes(b"true").is_true());
    }

    #[test]
    fn test_invalid_utf8_is_bytes() {
        let data = PayloadBuilder::new()
            .tuple(1, TYPE_CSTRING, &[0xc3, 0x28])
            .build();
        assert_eq!(collect(&data)[0].unwrap().value, TupleValue::Bytes(&[0xc3, 0x28]));
    }

    #[test]
    fn test_truncated_tuple_stops_decoding() {
        let mut data = PayloadBuilder::new()
            .cstring(1, "true")
            .cstring(2, "false")
            .build();
        data.truncate(data.len() - 2);
        let tuples = collect(&data);
        assert_eq!(tuples.len(), 2);
        assert!(tuples[0].is_ok());
        assert_eq!(tuples[1], Err(MessageError::Truncated));
    }

    #[test]
    fn test_count_beyond_data() {
        let mut data = PayloadBuilder::new().cstring(1, "true").build();
        data[0] = 3;
        let tuples = collect(&data);
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[1], Err(MessageError::Truncated));
    }

    #[test]
    fn test_header_errors() {
        assert_eq!(Dictionary::parse(&[]).unwrap_err(), MessageError::Truncated);
        assert_eq!(
            Dictionary::parse(&[0; INBOX_SIZE + 1]).unwrap_err(),
            MessageError::TooLarge
        );
        let empty = Dictionary::parse(&[0]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.iter().count(), 0);
    }
}
