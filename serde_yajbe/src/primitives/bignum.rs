//! Custom structs that hold bytes for arbitrary-precision numbers
//!
//! Neither type does arithmetic. They carry the wire bytes so BigNum
//! payloads written by another implementation survive a decode/encode
//! round trip, and they convert to and from the native integer types when
//! the value fits.

use serde::de;
use serde::ser;
use serde_bytes::Bytes;

use crate::constants::{BIG_DECIMAL, BIG_INT};
use crate::error::Error;

/// An arbitrary-precision signed integer, stored as its two's-complement
/// big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(Vec<u8>);

impl BigInt {
    /// Wraps two's-complement big-endian bytes. An empty buffer is zero.
    pub fn from_be_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The two's-complement big-endian bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the wrapper into the inner bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Whether the value is below zero
    pub fn is_negative(&self) -> bool {
        self.0.first().is_some_and(|b| b & 0x80 != 0)
    }
}

impl From<i128> for BigInt {
    fn from(v: i128) -> Self {
        let bytes = v.to_be_bytes();
        // trim redundant sign-extension bytes
        let mut start = 0;
        while start < bytes.len() - 1 {
            let (byte, next) = (bytes[start], bytes[start + 1]);
            let redundant = (byte == 0x00 && next & 0x80 == 0) || (byte == 0xff && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        Self(bytes[start..].to_vec())
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        Self::from(v as i128)
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        Self::from(v as i128)
    }
}

impl TryFrom<&BigInt> for i128 {
    type Error = Error;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        if value.0.len() > 16 {
            return Err(Error::BigNumOutOfRange);
        }
        let fill = if value.is_negative() { 0xff } else { 0x00 };
        let mut buf = [fill; 16];
        buf[16 - value.0.len()..].copy_from_slice(&value.0);
        Ok(i128::from_be_bytes(buf))
    }
}

impl TryFrom<&BigInt> for i64 {
    type Error = Error;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        let wide = i128::try_from(value)?;
        i64::try_from(wide).map_err(|_| Error::BigNumOutOfRange)
    }
}

impl TryFrom<&BigInt> for u64 {
    type Error = Error;

    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        let wide = i128::try_from(value)?;
        u64::try_from(wide).map_err(|_| Error::BigNumOutOfRange)
    }
}

impl ser::Serialize for BigInt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct(BIG_INT, Bytes::new(&self.0))
    }
}

struct BigIntVisitor;

impl de::Visitor<'_> for BigIntVisitor {
    type Value = BigInt;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("struct BigInt")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BigInt::from_be_bytes(v.to_vec()))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BigInt::from_be_bytes(v))
    }
}

impl<'de> de::Deserialize<'de> for BigInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_newtype_struct(BIG_INT, BigIntVisitor)
    }
}

/// An arbitrary-precision decimal: an unscaled integer and a base-10 scale,
/// so the value is `unscaled * 10^(-scale)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i32,
}

impl BigDecimal {
    /// Builds a decimal out of its unscaled value and scale
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// The unscaled integer value
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// The base-10 scale
    pub fn scale(&self) -> i32 {
        self.scale
    }

    // The serde-facing shape: four big-endian scale bytes followed by the
    // unscaled two's-complement bytes.
    pub(crate) fn to_packed(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.unscaled.as_bytes().len());
        buf.extend_from_slice(&self.scale.to_be_bytes());
        buf.extend_from_slice(self.unscaled.as_bytes());
        buf
    }

    pub(crate) fn from_packed(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 4 {
            return Err(Error::LengthOverflow(bytes.len() as u64));
        }
        let mut scale_bytes = [0u8; 4];
        scale_bytes.copy_from_slice(&bytes[..4]);
        Ok(Self {
            unscaled: BigInt::from_be_bytes(bytes[4..].to_vec()),
            scale: i32::from_be_bytes(scale_bytes),
        })
    }
}

impl ser::Serialize for BigDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let packed = self.to_packed();
        serializer.serialize_newtype_struct(BIG_DECIMAL, Bytes::new(&packed))
    }
}

struct BigDecimalVisitor;

impl de::Visitor<'_> for BigDecimalVisitor {
    type Value = BigDecimal;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("struct BigDecimal")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        BigDecimal::from_packed(v).map_err(|err| de::Error::custom(err.to_string()))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        self.visit_bytes(&v)
    }
}

impl<'de> de::Deserialize<'de> for BigDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_newtype_struct(BIG_DECIMAL, BigDecimalVisitor)
    }
}

/// A decoded BigNum payload, either shape.
#[derive(Debug)]
pub(crate) enum BigNum {
    Int(BigInt),
    Decimal(BigDecimal),
}
