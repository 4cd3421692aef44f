//! Stateful compression of map keys
//!
//! Map keys are not written as plain strings. Within one document the
//! encoder keeps an index table of every key emitted so far plus the raw
//! bytes of the most recent key; repeated keys collapse to a table index
//! and near-misses are delta-encoded against the previous key. The decoder
//! mirrors the same state, so both sides must append to their tables under
//! exactly the same rules.
//!
//! Four forms exist, selected by the top three bits of the key head:
//! `100` full bytes, `101` table index, `110` shared prefix plus tail,
//! `111` shared prefix and suffix around a middle. The low five bits start
//! a shared length scheme: values up to 29 inline, 30 adds one byte
//! (`byte + 29`), 31 adds two bytes high-first (`284 + 256*b1 + b2`).

use std::io::Write;

use indexmap::IndexSet;

use crate::error::Error;
use crate::read::Read;

/// Largest value the field-name length scheme can carry. Doubles as the
/// index-table capacity and the longest legal key.
pub(crate) const MAX_FIELD_TABLE: usize = 65819;

const FULL: u8 = 0b1000_0000;
const INDEXED: u8 = 0b1010_0000;
const PREFIX: u8 = 0b1100_0000;
const PREFIX_SUFFIX: u8 = 0b1110_0000;

/// Encoder-side field name state: lookup table plus last-key buffer.
/// Created fresh for every top-level encode.
#[derive(Debug)]
pub(crate) struct FieldNameEncoder {
    table: IndexSet<Box<[u8]>>,
    last_key: Vec<u8>,
}

impl FieldNameEncoder {
    pub(crate) fn new() -> Self {
        Self {
            table: IndexSet::new(),
            last_key: Vec::new(),
        }
    }

    /// Seed the index table with well-known names. The decoding side must
    /// be seeded with the same names in the same order.
    pub(crate) fn with_initial<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut encoder = Self::new();
        for name in names {
            if encoder.table.len() >= MAX_FIELD_TABLE {
                break;
            }
            encoder.table.insert(name.as_bytes().into());
        }
        encoder
    }

    pub(crate) fn encode<W: Write>(&mut self, writer: &mut W, name: &str) -> Result<(), Error> {
        let key = name.as_bytes();
        if let Some(index) = self.table.get_index_of(key) {
            write_length(writer, INDEXED, index)?;
        } else {
            if key.len() > MAX_FIELD_TABLE {
                return Err(Error::LengthOverflow(key.len() as u64));
            }
            let prefix = common_prefix(&self.last_key, key);
            let suffix = common_suffix(&self.last_key, &key[prefix..]);
            if suffix > 2 {
                let middle = &key[prefix..key.len() - suffix];
                write_length(writer, PREFIX_SUFFIX, middle.len())?;
                writer.write_all(&[prefix as u8, suffix as u8])?;
                writer.write_all(middle)?;
            } else if prefix > 2 {
                let tail = &key[prefix..];
                write_length(writer, PREFIX, tail.len())?;
                writer.write_all(&[prefix as u8])?;
                writer.write_all(tail)?;
            } else {
                write_length(writer, FULL, key.len())?;
                writer.write_all(key)?;
            }
            if self.table.len() < MAX_FIELD_TABLE {
                self.table.insert(key.into());
            }
        }
        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        Ok(())
    }
}

/// Decoder-side mirror of [`FieldNameEncoder`].
#[derive(Debug)]
pub(crate) struct FieldNameDecoder {
    table: Vec<Vec<u8>>,
    last_key: Vec<u8>,
}

impl FieldNameDecoder {
    pub(crate) fn new() -> Self {
        Self {
            table: Vec::new(),
            last_key: Vec::new(),
        }
    }

    pub(crate) fn with_initial<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut decoder = Self::new();
        for name in names {
            if decoder.table.len() >= MAX_FIELD_TABLE {
                break;
            }
            let key = name.as_bytes().to_vec();
            if !decoder.table.contains(&key) {
                decoder.table.push(key);
            }
        }
        decoder
    }

    pub(crate) fn decode<'de, R: Read<'de>>(&mut self, reader: &mut R) -> Result<String, Error> {
        let head = reader.next()?;
        let length = read_length(reader, head)?;
        let key = match head >> 5 {
            0b100 => reader.read_bytes(length)?,
            0b101 => {
                let key = self
                    .table
                    .get(length)
                    .ok_or(Error::FieldIndexOutOfRange(length))?
                    .clone();
                self.last_key.clone_from(&key);
                return String::from_utf8(key).map_err(Error::from);
            }
            0b110 => {
                let prefix = reader.next()? as usize;
                if prefix > self.last_key.len() {
                    return Err(Error::InvalidFieldName);
                }
                let mut key = Vec::with_capacity(prefix + length);
                key.extend_from_slice(&self.last_key[..prefix]);
                key.extend_from_slice(&reader.read_bytes(length)?);
                key
            }
            0b111 => {
                let prefix = reader.next()? as usize;
                let suffix = reader.next()? as usize;
                if prefix > self.last_key.len() || suffix > self.last_key.len() {
                    return Err(Error::InvalidFieldName);
                }
                let mut key = Vec::with_capacity(prefix + length + suffix);
                key.extend_from_slice(&self.last_key[..prefix]);
                key.extend_from_slice(&reader.read_bytes(length)?);
                key.extend_from_slice(&self.last_key[self.last_key.len() - suffix..]);
                key
            }
            _ => return Err(Error::InvalidHead(head)),
        };
        if self.table.len() < MAX_FIELD_TABLE {
            self.table.push(key.clone());
        }
        self.last_key.clone_from(&key);
        String::from_utf8(key).map_err(Error::from)
    }
}

fn write_length<W: Write>(writer: &mut W, form: u8, length: usize) -> Result<(), Error> {
    if length < 30 {
        writer.write_all(&[form | length as u8])?;
    } else if length < 285 {
        writer.write_all(&[form | 30, (length - 29) as u8])?;
    } else if length <= MAX_FIELD_TABLE {
        let m = length - 284;
        writer.write_all(&[form | 31, (m >> 8) as u8, (m & 0xff) as u8])?;
    } else {
        return Err(Error::LengthOverflow(length as u64));
    }
    Ok(())
}

fn read_length<'de, R: Read<'de>>(reader: &mut R, head: u8) -> Result<usize, Error> {
    match head & 0x1f {
        30 => Ok(reader.next()? as usize + 29),
        31 => {
            let b = reader.read_const_bytes::<2>()?;
            Ok(284 + ((b[0] as usize) << 8) + b[1] as usize)
        }
        n => Ok(n as usize),
    }
}

fn common_prefix(last: &[u8], key: &[u8]) -> usize {
    let max = last.len().min(key.len()).min(255);
    let mut n = 0;
    while n < max && last[n] == key[n] {
        n += 1;
    }
    n
}

fn common_suffix(last: &[u8], tail: &[u8]) -> usize {
    let max = last.len().min(tail.len()).min(255);
    let mut n = 0;
    while n < max && last[last.len() - 1 - n] == tail[tail.len() - 1 - n] {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::SliceReader;

    fn encode_all(encoder: &mut FieldNameEncoder, names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        for name in names {
            encoder.encode(&mut buf, name).unwrap();
        }
        buf
    }

    fn decode_all(decoder: &mut FieldNameDecoder, buf: &[u8], count: usize) -> Vec<String> {
        let mut reader = SliceReader::new(buf);
        (0..count).map(|_| decoder.decode(&mut reader).unwrap()).collect()
    }

    #[test]
    fn all_four_forms() {
        let names = ["aaaaa", "bbbbb", "aaaaa", "aaabb", "aaacc"];
        let buf = encode_all(&mut FieldNameEncoder::new(), &names);
        let expected = [
            0x85, 0x61, 0x61, 0x61, 0x61, 0x61, // full "aaaaa"
            0x85, 0x62, 0x62, 0x62, 0x62, 0x62, // full "bbbbb"
            0xa0, // indexed 0
            0xc2, 0x03, 0x62, 0x62, // prefix 3 + "bb"
            0xc2, 0x03, 0x63, 0x63, // prefix 3 + "cc"
        ];
        assert_eq!(buf, expected);

        let decoded = decode_all(&mut FieldNameDecoder::new(), &buf, names.len());
        assert_eq!(decoded, names);
    }

    #[test]
    fn prefix_and_suffix_form() {
        // shares "user_" up front and "_name" at the back
        let names = ["user_first_name", "user_last_name"];
        let buf = encode_all(&mut FieldNameEncoder::new(), &names);
        let expected = [
            0x8f, b'u', b's', b'e', b'r', b'_', b'f', b'i', b'r', b's', b't', b'_', b'n', b'a',
            b'm', b'e', // full
            0xe2, 0x05, 0x07, b'l', b'a', // prefix 5, suffix 7, middle "la"
        ];
        assert_eq!(buf, expected);

        let decoded = decode_all(&mut FieldNameDecoder::new(), &buf, names.len());
        assert_eq!(decoded, names);
    }

    #[test]
    fn length_scheme_edges() {
        let mut buf = Vec::new();
        write_length(&mut buf, FULL, 29).unwrap();
        assert_eq!(buf, [FULL | 29]);

        buf.clear();
        write_length(&mut buf, FULL, 30).unwrap();
        assert_eq!(buf, [FULL | 30, 1]);

        buf.clear();
        write_length(&mut buf, FULL, 284).unwrap();
        assert_eq!(buf, [FULL | 30, 255]);

        buf.clear();
        write_length(&mut buf, FULL, 285).unwrap();
        assert_eq!(buf, [FULL | 31, 0x00, 0x01]);

        buf.clear();
        write_length(&mut buf, FULL, MAX_FIELD_TABLE).unwrap();
        assert_eq!(buf, [FULL | 31, 0xff, 0xff]);

        buf.clear();
        assert!(write_length(&mut buf, FULL, MAX_FIELD_TABLE + 1).is_err());
    }

    #[test]
    fn length_scheme_round_trip() {
        for length in [0, 1, 29, 30, 284, 285, 1000, MAX_FIELD_TABLE] {
            let mut buf = Vec::new();
            write_length(&mut buf, FULL, length).unwrap();
            let mut reader = SliceReader::new(&buf);
            let head = reader.next().unwrap();
            assert_eq!(read_length(&mut reader, head).unwrap(), length);
        }
    }

    #[test]
    fn long_key_uses_extended_length() {
        let name = "k".repeat(300);
        let buf = encode_all(&mut FieldNameEncoder::new(), &[&name]);
        assert_eq!(buf[0], FULL | 31);
        assert_eq!(buf.len(), 3 + 300);
        let decoded = decode_all(&mut FieldNameDecoder::new(), &buf, 1);
        assert_eq!(decoded[0], name);
    }

    #[test]
    fn indexed_reference_past_table_fails() {
        let mut decoder = FieldNameDecoder::new();
        let mut reader = SliceReader::new(&[0xa1]);
        assert!(matches!(
            decoder.decode(&mut reader),
            Err(Error::FieldIndexOutOfRange(1))
        ));
    }

    #[test]
    fn delta_outside_last_key_fails() {
        let mut decoder = FieldNameDecoder::new();
        // prefix 5 against an empty last key
        let mut reader = SliceReader::new(&[0xc2, 0x05, 0x62, 0x62]);
        assert!(matches!(
            decoder.decode(&mut reader),
            Err(Error::InvalidFieldName)
        ));
    }

    #[test]
    fn invalid_key_utf8_fails() {
        let mut decoder = FieldNameDecoder::new();
        let mut reader = SliceReader::new(&[0x81, 0xff]);
        assert!(matches!(
            decoder.decode(&mut reader),
            Err(Error::InvalidUtf8Encoding)
        ));
    }

    #[test]
    fn initial_dictionary_is_indexed() {
        let mut encoder = FieldNameEncoder::with_initial(["id", "name"]);
        let buf = encode_all(&mut encoder, &["name", "id"]);
        assert_eq!(buf, [0xa1, 0xa0]);

        let mut decoder = FieldNameDecoder::with_initial(["id", "name"]);
        let decoded = decode_all(&mut decoder, &buf, 2);
        assert_eq!(decoded, ["name", "id"]);
    }

    #[test]
    fn prefix_capped_at_255() {
        let a = format!("{}x", "p".repeat(400));
        let b = format!("{}y", "p".repeat(400));
        let buf = encode_all(&mut FieldNameEncoder::new(), &[&a, &b]);
        let decoded = decode_all(&mut FieldNameDecoder::new(), &buf, 2);
        assert_eq!(decoded, [a, b]);
    }

    #[test]
    fn table_stops_growing_at_capacity() {
        let mut encoder = FieldNameEncoder::new();
        let mut buf = Vec::new();
        let total = MAX_FIELD_TABLE + 5;
        for i in 0..total {
            encoder.encode(&mut buf, &format!("k{:08x}", i)).unwrap();
        }
        // the five keys past capacity were not appended
        assert_eq!(encoder.table.len(), MAX_FIELD_TABLE);

        // references into the capped table still resolve, including the
        // last slot, which takes the two-byte index form
        let mark = buf.len();
        encoder.encode(&mut buf, "k00000000").unwrap();
        assert_eq!(buf[mark..], [0xa0]);
        let mark = buf.len();
        let last_slot = format!("k{:08x}", MAX_FIELD_TABLE - 1);
        encoder.encode(&mut buf, &last_slot).unwrap();
        assert_eq!(buf[mark..], [0xbf, 0xff, 0xfe]);

        // a key first seen after the cap never becomes indexed; repeats
        // re-emit as full or delta forms
        let mark = buf.len();
        encoder.encode(&mut buf, "zzz-extra").unwrap();
        assert_eq!(buf[mark] >> 5, 0b100);
        let mark = buf.len();
        encoder.encode(&mut buf, "zzz-extra").unwrap();
        assert_eq!(buf[mark] >> 5, 0b110);
        assert_eq!(encoder.table.len(), MAX_FIELD_TABLE);

        // the decoder mirrors the same cap and resolves the whole stream
        let mut decoder = FieldNameDecoder::new();
        let mut reader = SliceReader::new(&buf);
        for i in 0..total {
            assert_eq!(decoder.decode(&mut reader).unwrap(), format!("k{:08x}", i));
        }
        assert_eq!(decoder.decode(&mut reader).unwrap(), "k00000000");
        assert_eq!(decoder.decode(&mut reader).unwrap(), last_slot);
        assert_eq!(decoder.decode(&mut reader).unwrap(), "zzz-extra");
        assert_eq!(decoder.decode(&mut reader).unwrap(), "zzz-extra");
        assert_eq!(decoder.table.len(), MAX_FIELD_TABLE);
    }

    #[test]
    fn repeated_key_is_not_reappended() {
        let names = ["a", "b", "a", "b", "c"];
        let buf = encode_all(&mut FieldNameEncoder::new(), &names);
        // "c" must land at index 2, so a later reference resolves correctly
        let mut encoder = FieldNameEncoder::new();
        let mut all = encode_all(&mut encoder, &names);
        encoder.encode(&mut all, "c").unwrap();
        assert_eq!(all[..buf.len()], buf);
        assert_eq!(all[buf.len()..], [0xa2]);
    }
}
