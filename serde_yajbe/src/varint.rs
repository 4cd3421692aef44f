//! Variable-width unsigned magnitudes
//!
//! Shared by the integer, string/bytes and container codecs: a magnitude is
//! stored in the fewest little-endian bytes that hold it (1..=8), with the
//! byte count carried in the containing head. Each caller applies its own
//! bias before and after.

use std::io::Write;

use crate::error::Error;
use crate::read::Read;

/// Number of little-endian bytes needed to carry `m`, always at least one.
pub(crate) fn uint_width(m: u64) -> u8 {
    let bits = 64 - m.leading_zeros();
    (bits.div_ceil(8)).max(1) as u8
}

pub(crate) fn write_uint_le<W: Write>(writer: &mut W, m: u64, width: u8) -> Result<(), Error> {
    let bytes = m.to_le_bytes();
    writer.write_all(&bytes[..width as usize])?;
    Ok(())
}

pub(crate) fn read_uint_le<'de, R: Read<'de>>(reader: &mut R, width: u8) -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf[..width as usize])?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::SliceReader;

    #[test]
    fn width_boundaries() {
        assert_eq!(uint_width(0), 1);
        assert_eq!(uint_width(0xff), 1);
        assert_eq!(uint_width(0x100), 2);
        assert_eq!(uint_width(0xffff), 2);
        assert_eq!(uint_width(0x0001_0000), 3);
        assert_eq!(uint_width(0xffff_ffff), 4);
        assert_eq!(uint_width(0x1_0000_0000), 5);
        assert_eq!(uint_width(u64::MAX), 8);
    }

    #[test]
    fn round_trip_every_width() {
        for shift in 0..64 {
            let m = 1u64 << shift;
            let width = uint_width(m);
            let mut buf = Vec::new();
            write_uint_le(&mut buf, m, width).unwrap();
            assert_eq!(buf.len(), width as usize);
            let mut reader = SliceReader::new(&buf);
            assert_eq!(read_uint_le(&mut reader, width).unwrap(), m);
        }
    }

    #[test]
    fn wide_reads_accept_padding() {
        // a decoder must take any legal width, not just the narrowest
        let buf = [0x05, 0x00, 0x00, 0x00];
        let mut reader = SliceReader::new(&buf);
        assert_eq!(read_uint_le(&mut reader, 4).unwrap(), 5);
    }
}
