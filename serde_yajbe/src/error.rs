//! Custom error

use serde::{de, ser};
use std::fmt::Display;

/// Errors raised while encoding or decoding YAJBE data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Custom error with message
    #[error("Message {0}")]
    Message(String),

    /// IO error
    #[error("IO {0}")]
    Io(std::io::Error),

    /// A read demanded more bytes than the input held
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// A byte in head position does not classify as any value kind
    #[error("Invalid head byte 0x{0:02x}")]
    InvalidHead(u8),

    /// Found invalid UTF-8 encoding
    #[error("Invalid UTF-8 encoding")]
    InvalidUtf8Encoding,

    /// An indexed field name refers past the end of the index table
    #[error("Field name index {0} out of range")]
    FieldIndexOutOfRange(usize),

    /// A field name delta reaches outside the previous key
    #[error("Field name delta does not fit the previous key")]
    InvalidFieldName,

    /// A length exceeds what the format or this implementation can carry
    #[error("Length {0} out of range")]
    LengthOverflow(u64),

    /// A decoded integer does not fit the requested native type
    #[error("Integer value out of range")]
    IntegerOverflow,

    /// Map keys must be strings
    #[error("Map keys must be strings")]
    KeyMustBeString,

    /// A BigNum payload does not fit the requested native type
    #[error("BigNum value out of range")]
    BigNumOutOfRange,
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Message(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::Io(err),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8Encoding
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8Encoding
    }
}
