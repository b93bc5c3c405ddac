//! Error types

use core::fmt;

use crate::{message::MessageError, settings::StorageError};

/// Watchface error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No font is available in the requested point size
    FontUnavailable(u8),
    /// The render target rejected a draw call
    Display,
    /// The preference store failed
    Storage(StorageError),
    /// An inbound settings message is malformed
    Message(MessageError),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<MessageError> for Error {
    fn from(err: MessageError) -> Self {
        Self::Message(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontUnavailable(pt) => write!(f, "no {pt}pt font available"),
            Self::Display => f.write_str("display write failed"),
            Self::Storage(err) => write!(f, "preference store: {err:?}"),
            Self::Message(err) => write!(f, "settings message: {err:?}"),
        }
    }
}
