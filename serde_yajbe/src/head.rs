//! Head byte classification
//!
//! Every encoded value starts with a single head byte whose top bits select
//! the kind while the low bits inline a small payload: a literal integer, an
//! item count, a byte length, or a magnitude width. [`Head::from_u8`] is the
//! one place that bit layout is decoded.

/// Null value
pub(crate) const NULL: u8 = 0x00;
/// Terminator for containers encoded without an up-front count
pub(crate) const EOF: u8 = 0x01;
pub(crate) const FALSE: u8 = 0x02;
pub(crate) const TRUE: u8 = 0x03;
pub(crate) const FLOAT32: u8 = 0x05;
pub(crate) const FLOAT64: u8 = 0x06;
pub(crate) const BIG_NUM: u8 = 0x07;
pub(crate) const ARRAY: u8 = 0x20;
pub(crate) const MAP: u8 = 0x30;
pub(crate) const POS_INT: u8 = 0x40;
pub(crate) const NEG_INT: u8 = 0x60;
pub(crate) const BYTES: u8 = 0x80;
pub(crate) const STRING: u8 = 0xc0;

/// Classification of a head byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Head {
    Null,
    /// End-of-children sentinel; only legal inside an unsized container
    Eof,
    False,
    True,
    Float16,
    Float32,
    Float64,
    BigNum,
    /// Unassigned head space; always a decode failure
    Reserved,
    /// Positive integer `w + 1` (range 1..=24)
    PosIntInline(u8),
    /// Positive integer, `w` magnitude bytes follow (1..=8)
    PosIntExt(u8),
    /// Non-positive integer `-w` (range -23..=0)
    NegIntInline(u8),
    /// Non-positive integer, `w` magnitude bytes follow (1..=8)
    NegIntExt(u8),
    /// Array holding exactly `w` children (0..=10)
    ArrayInline(u8),
    /// Array, `w` count bytes follow (1..=4)
    ArrayExt(u8),
    /// Array terminated by the EOF sentinel
    ArrayEof,
    MapInline(u8),
    MapExt(u8),
    MapEof,
    /// Bytes with `w` payload bytes (0..=59)
    BytesInline(u8),
    /// Bytes, `w` length bytes follow (1..=4)
    BytesExt(u8),
    StrInline(u8),
    StrExt(u8),
}

impl Head {
    /// Classify a head byte. Total over `u8`; bytes with no assigned
    /// meaning come back as [`Head::Reserved`] and fail at the decoder.
    pub fn from_u8(n: u8) -> Head {
        match n {
            0x00 => Head::Null,
            0x01 => Head::Eof,
            0x02 => Head::False,
            0x03 => Head::True,
            0x04 => Head::Float16,
            0x05 => Head::Float32,
            0x06 => Head::Float64,
            0x07 => Head::BigNum,
            0x08..=0x1f => Head::Reserved,
            0x20..=0x2f => match n & 0x0f {
                w @ 0..=10 => Head::ArrayInline(w),
                15 => Head::ArrayEof,
                w => Head::ArrayExt(w - 10),
            },
            0x30..=0x3f => match n & 0x0f {
                w @ 0..=10 => Head::MapInline(w),
                15 => Head::MapEof,
                w => Head::MapExt(w - 10),
            },
            0x40..=0x5f => match n & 0x1f {
                w @ 0..=23 => Head::PosIntInline(w),
                w => Head::PosIntExt(w - 23),
            },
            0x60..=0x7f => match n & 0x1f {
                w @ 0..=23 => Head::NegIntInline(w),
                w => Head::NegIntExt(w - 23),
            },
            0x80..=0xbf => match n & 0x3f {
                w @ 0..=59 => Head::BytesInline(w),
                w => Head::BytesExt(w - 59),
            },
            0xc0..=0xff => match n & 0x3f {
                w @ 0..=59 => Head::StrInline(w),
                w => Head::StrExt(w - 59),
            },
        }
    }
}

impl From<u8> for Head {
    fn from(n: u8) -> Head {
        Head::from_u8(n)
    }
}
