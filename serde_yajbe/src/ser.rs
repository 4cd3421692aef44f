//! Serializer implementation

use std::io::Write;

use serde::ser::{self, Serialize};

use crate::{
    constants::{BIG_DECIMAL, BIG_INT},
    error::Error,
    field::FieldNameEncoder,
    head,
    util::NewType,
    varint::{uint_width, write_uint_le},
};

/// Serializes the given value into a byte vector
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: Serialize,
{
    let mut writer = Vec::new();
    let mut serializer = Serializer::new(&mut writer);
    value.serialize(&mut serializer)?;
    Ok(writer)
}

/// Serializes the given value into the supplied writer
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<(), Error>
where
    W: Write,
    T: Serialize,
{
    let mut serializer = Serializer::new(writer);
    value.serialize(&mut serializer)?;
    serializer.writer.flush()?;
    Ok(())
}

/// A structure that serializes Rust values into YAJBE wire format.
///
/// The field-name state lives here, so one `Serializer` corresponds to one
/// document: keys emitted earlier in the document compress references to
/// keys emitted later.
#[derive(Debug)]
pub struct Serializer<W> {
    /// The output of serialized data
    pub writer: W,

    field_names: FieldNameEncoder,

    // Set by a magic newtype name; consumed by the next serialize_bytes
    new_type: NewType,
}

impl<W: Write> From<W> for Serializer<W> {
    fn from(writer: W) -> Self {
        Self::new(writer)
    }
}

impl<W: Write> Serializer<W> {
    /// Creates a new YAJBE serializer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            field_names: FieldNameEncoder::new(),
            new_type: NewType::None,
        }
    }

    /// Creates a serializer whose field-name table is seeded with `names`.
    /// The decoding side must be seeded with the same names in the same
    /// order.
    pub fn with_initial_field_names<'n, I>(writer: W, names: I) -> Self
    where
        I: IntoIterator<Item = &'n str>,
    {
        Self {
            writer,
            field_names: FieldNameEncoder::with_initial(names),
            new_type: NewType::None,
        }
    }

    /// Consume the serializer and obtain the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_field_name(&mut self, name: &str) -> Result<(), Error> {
        self.field_names.encode(&mut self.writer, name)
    }

    fn write_unsigned(&mut self, v: u64) -> Result<(), Error> {
        if v == 0 {
            // zero lives on the non-positive side
            self.writer.write_all(&[head::NEG_INT])?;
        } else if v <= 24 {
            self.writer.write_all(&[head::POS_INT | (v - 1) as u8])?;
        } else {
            let m = v - 25;
            let width = uint_width(m);
            self.writer.write_all(&[head::POS_INT | (23 + width)])?;
            write_uint_le(&mut self.writer, m, width)?;
        }
        Ok(())
    }

    fn write_signed(&mut self, v: i64) -> Result<(), Error> {
        if v >= 1 {
            return self.write_unsigned(v as u64);
        }
        let magnitude = v.unsigned_abs();
        if magnitude <= 23 {
            self.writer.write_all(&[head::NEG_INT | magnitude as u8])?;
        } else {
            let m = magnitude - 24;
            let width = uint_width(m);
            self.writer.write_all(&[head::NEG_INT | (23 + width)])?;
            write_uint_le(&mut self.writer, m, width)?;
        }
        Ok(())
    }

    fn write_container_head(&mut self, tag: u8, count: usize) -> Result<(), Error> {
        if count <= 10 {
            self.writer.write_all(&[tag | count as u8])?;
        } else {
            let m = (count - 10) as u64;
            let width = uint_width(m);
            if width > 4 {
                return Err(Error::LengthOverflow(count as u64));
            }
            self.writer.write_all(&[tag | (10 + width)])?;
            write_uint_le(&mut self.writer, m, width)?;
        }
        Ok(())
    }

    fn write_sized_head(&mut self, tag: u8, len: usize) -> Result<(), Error> {
        if len <= 59 {
            self.writer.write_all(&[tag | len as u8])?;
        } else {
            let m = (len - 59) as u64;
            let width = uint_width(m);
            if width > 4 {
                return Err(Error::LengthOverflow(len as u64));
            }
            self.writer.write_all(&[tag | (59 + width)])?;
            write_uint_le(&mut self.writer, m, width)?;
        }
        Ok(())
    }

    // flags byte: bit 0 sign, bit 1 kind, bits 2..3 scale width - 1
    fn write_bignum_int(&mut self, magnitude: &[u8]) -> Result<(), Error> {
        let sign = magnitude.first().map_or(0, |b| b >> 7);
        self.writer.write_all(&[head::BIG_NUM, sign])?;
        self.write_sized_head(head::BYTES, magnitude.len())?;
        self.writer.write_all(magnitude)?;
        Ok(())
    }

    fn write_bignum_decimal(&mut self, scale: i32, magnitude: &[u8]) -> Result<(), Error> {
        let sign = magnitude.first().map_or(0, |b| b >> 7);
        let zigzag = ((scale << 1) ^ (scale >> 31)) as u32;
        let width = uint_width(zigzag as u64);
        let flags = sign | 0b10 | ((width - 1) << 2);
        self.writer.write_all(&[head::BIG_NUM, flags])?;
        write_uint_le(&mut self.writer, zigzag as u64, width)?;
        self.write_sized_head(head::BYTES, magnitude.len())?;
        self.writer.write_all(magnitude)?;
        Ok(())
    }
}

impl<'a, W: Write + 'a> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, W>;
    type SerializeTuple = SeqSerializer<'a, W>;
    type SerializeTupleStruct = SeqSerializer<'a, W>;
    type SerializeTupleVariant = VariantSerializer<'a, W>;
    type SerializeMap = MapSerializer<'a, W>;
    type SerializeStruct = StructSerializer<'a, W>;
    type SerializeStructVariant = VariantSerializer<'a, W>;

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        let byte = if v { head::TRUE } else { head::FALSE };
        self.writer.write_all(&[byte]).map_err(Into::into)
    }

    #[inline]
    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.write_signed(v as i64)
    }

    #[inline]
    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.write_signed(v as i64)
    }

    #[inline]
    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.write_signed(v as i64)
    }

    #[inline]
    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        self.write_signed(v)
    }

    #[inline]
    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.write_unsigned(v as u64)
    }

    #[inline]
    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.write_unsigned(v as u64)
    }

    #[inline]
    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.write_unsigned(v as u64)
    }

    #[inline]
    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        self.write_unsigned(v)
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.writer.write_all(&[head::FLOAT32])?;
        self.writer.write_all(&v.to_le_bytes()).map_err(Into::into)
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.writer.write_all(&[head::FLOAT64])?;
        self.writer.write_all(&v.to_le_bytes()).map_err(Into::into)
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.write_sized_head(head::STRING, v.len())?;
        self.writer.write_all(v.as_bytes()).map_err(Into::into)
    }

    #[inline]
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        match self.new_type {
            NewType::None => {
                self.write_sized_head(head::BYTES, v.len())?;
                self.writer.write_all(v).map_err(Into::into)
            }
            NewType::BigInt => {
                self.new_type = NewType::None;
                self.write_bignum_int(v)
            }
            NewType::BigDecimal => {
                self.new_type = NewType::None;
                if v.len() < 4 {
                    return Err(Error::LengthOverflow(v.len() as u64));
                }
                let mut scale = [0u8; 4];
                scale.copy_from_slice(&v[..4]);
                self.write_bignum_decimal(i32::from_be_bytes(scale), &v[4..])
            }
        }
    }

    #[inline]
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.writer.write_all(&[head::NULL]).map_err(Into::into)
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        match name {
            BIG_INT => self.new_type = NewType::BigInt,
            BIG_DECIMAL => self.new_type = NewType::BigDecimal,
            _ => {}
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.write_container_head(head::MAP, 1)?;
        self.write_field_name(variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        match len {
            Some(count) => {
                self.write_container_head(head::ARRAY, count)?;
                Ok(SeqSerializer {
                    se: self,
                    eof_terminated: false,
                })
            }
            None => {
                self.writer.write_all(&[head::ARRAY | 0x0f])?;
                Ok(SeqSerializer {
                    se: self,
                    eof_terminated: true,
                })
            }
        }
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.write_container_head(head::MAP, 1)?;
        self.write_field_name(variant)?;
        self.write_container_head(head::ARRAY, len)?;
        Ok(VariantSerializer { se: self })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        match len {
            Some(count) => {
                self.write_container_head(head::MAP, count)?;
                Ok(MapSerializer {
                    se: self,
                    eof_terminated: false,
                })
            }
            None => {
                self.writer.write_all(&[head::MAP | 0x0f])?;
                Ok(MapSerializer {
                    se: self,
                    eof_terminated: true,
                })
            }
        }
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.write_container_head(head::MAP, len)?;
        Ok(StructSerializer { se: self })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.write_container_head(head::MAP, 1)?;
        self.write_field_name(variant)?;
        self.write_container_head(head::MAP, len)?;
        Ok(VariantSerializer { se: self })
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Serializer for array elements
#[derive(Debug)]
pub struct SeqSerializer<'a, W> {
    se: &'a mut Serializer<W>,
    eof_terminated: bool,
}

impl<'a, W: Write + 'a> ser::SerializeSeq for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.se)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        if self.eof_terminated {
            self.se.writer.write_all(&[head::EOF])?;
        }
        Ok(())
    }
}

impl<'a, W: Write + 'a> ser::SerializeTuple for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a, W: Write + 'a> ser::SerializeTupleStruct for SeqSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

/// Serializer for map entries. Keys go through the field-name compressor
/// and must be strings.
#[derive(Debug)]
pub struct MapSerializer<'a, W> {
    se: &'a mut Serializer<W>,
    eof_terminated: bool,
}

impl<'a, W: Write + 'a> ser::SerializeMap for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        key.serialize(MapKeySerializer { se: &mut *self.se })
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.se)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        if self.eof_terminated {
            self.se.writer.write_all(&[head::EOF])?;
        }
        Ok(())
    }
}

/// Serializer for struct fields
#[derive(Debug)]
pub struct StructSerializer<'a, W> {
    se: &'a mut Serializer<W>,
}

impl<'a, W: Write + 'a> ser::SerializeStruct for StructSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.se.write_field_name(key)?;
        value.serialize(&mut *self.se)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

/// Serializer for the payload of a tuple or struct variant
#[derive(Debug)]
pub struct VariantSerializer<'a, W> {
    se: &'a mut Serializer<W>,
}

impl<'a, W: Write + 'a> ser::SerializeTupleVariant for VariantSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.se)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<'a, W: Write + 'a> ser::SerializeStructVariant for VariantSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.se.write_field_name(key)?;
        value.serialize(&mut *self.se)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

struct MapKeySerializer<'a, W> {
    se: &'a mut Serializer<W>,
}

impl<'a, W: Write + 'a> ser::Serializer for MapKeySerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = ser::Impossible<(), Error>;
    type SerializeTupleStruct = ser::Impossible<(), Error>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.se.write_field_name(v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0u8; 4];
        self.se.write_field_name(v.encode_utf8(&mut buf))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.se.write_field_name(variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::KeyMustBeString)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::KeyMustBeString)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Error::KeyMustBeString)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use serde::ser::{SerializeMap, SerializeSeq, Serializer as _};
    use serde::Serialize;

    use super::{to_vec, Serializer};
    use crate::error::Error;

    #[test]
    fn fixed_values() {
        assert_eq!(to_vec(&false).unwrap(), [0x02]);
        assert_eq!(to_vec(&true).unwrap(), [0x03]);
        assert_eq!(to_vec(&()).unwrap(), [0x00]);
        assert_eq!(to_vec(&Option::<i32>::None).unwrap(), [0x00]);
        assert_eq!(to_vec(&Some(true)).unwrap(), [0x03]);
    }

    #[test]
    fn small_integers() {
        assert_eq!(to_vec(&1).unwrap(), [0x40]);
        assert_eq!(to_vec(&7).unwrap(), [0x46]);
        assert_eq!(to_vec(&24).unwrap(), [0x57]);
        assert_eq!(to_vec(&0).unwrap(), [0x60]);
        assert_eq!(to_vec(&-1).unwrap(), [0x61]);
        assert_eq!(to_vec(&-23).unwrap(), [0x77]);
    }

    #[test]
    fn external_integers() {
        assert_eq!(to_vec(&25).unwrap(), [0x58, 0x00]);
        assert_eq!(to_vec(&127).unwrap(), [0x58, 0x66]);
        assert_eq!(to_vec(&128).unwrap(), [0x58, 0x67]);
        assert_eq!(to_vec(&0xff).unwrap(), [0x58, 0xe6]);
        assert_eq!(to_vec(&0x100).unwrap(), [0x58, 0xe7]);
        assert_eq!(to_vec(&0x200).unwrap(), [0x59, 0xe7, 0x01]);
        assert_eq!(to_vec(&-24).unwrap(), [0x78, 0x00]);
        assert_eq!(to_vec(&-0xff).unwrap(), [0x78, 0xe7]);
        assert_eq!(
            to_vec(&i64::MAX).unwrap(),
            [0x5f, 0xe6, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]
        );
        assert_eq!(
            to_vec(&i64::MIN).unwrap(),
            [0x7f, 0xe8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]
        );
        assert_eq!(
            to_vec(&u64::MAX).unwrap(),
            [0x5f, 0xe6, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn integer_byte_lengths() {
        // one byte inline between -23 and 24, then 1 + ceil(bits/8)
        for v in -23i64..=24 {
            assert_eq!(to_vec(&v).unwrap().len(), 1, "value {}", v);
        }
        assert_eq!(to_vec(&25i64).unwrap().len(), 2);
        assert_eq!(to_vec(&-24i64).unwrap().len(), 2);
        assert_eq!(to_vec(&280i64).unwrap().len(), 2); // magnitude 0xff
        assert_eq!(to_vec(&281i64).unwrap().len(), 3); // magnitude 0x100
        assert_eq!(to_vec(&(24 + (1i64 << 16))).unwrap().len(), 3);
    }

    #[test]
    fn floats() {
        assert_eq!(
            to_vec(&1.5f64).unwrap(),
            [0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x3f]
        );
        assert_eq!(to_vec(&1.5f32).unwrap(), [0x05, 0x00, 0x00, 0xc0, 0x3f]);
        let nan = f64::from_bits(0x7ff8_0000_0000_1234);
        let buf = to_vec(&nan).unwrap();
        assert_eq!(buf[0], 0x06);
        assert_eq!(u64::from_le_bytes(buf[1..].try_into().unwrap()), nan.to_bits());
    }

    #[test]
    fn strings() {
        assert_eq!(to_vec(&"").unwrap(), [0xc0]);
        assert_eq!(to_vec(&"a").unwrap(), [0xc1, 0x61]);
        assert_eq!(to_vec(&'a').unwrap(), [0xc1, 0x61]);

        let buf = to_vec(&"x".repeat(59)).unwrap();
        assert_eq!(buf[0], 0xfb);
        assert_eq!(buf.len(), 60);

        let buf = to_vec(&"y".repeat(60)).unwrap();
        assert_eq!(&buf[..2], [0xfc, 0x01]);
        assert_eq!(buf.len(), 62);
    }

    #[test]
    fn bytes() {
        use serde_bytes::ByteBuf;

        assert_eq!(to_vec(&ByteBuf::from(vec![])).unwrap(), [0x80]);

        let buf = to_vec(&ByteBuf::from(vec![0u8; 60])).unwrap();
        assert_eq!(&buf[..2], [0xbc, 0x01]);
        assert_eq!(buf.len(), 62);

        let buf = to_vec(&ByteBuf::from(vec![0u8; 315])).unwrap();
        assert_eq!(&buf[..3], [0xbd, 0x00, 0x01]);
        assert_eq!(buf.len(), 318);
    }

    #[test]
    fn arrays() {
        assert_eq!(to_vec(&[1]).unwrap(), [0x21, 0x40]);
        assert_eq!(to_vec(&[2, 2]).unwrap(), [0x22, 0x41, 0x41]);
        assert_eq!(to_vec(&Vec::<i32>::new()).unwrap(), [0x20]);

        let buf = to_vec(&vec![1i32; 11]).unwrap();
        assert_eq!(&buf[..2], [0x2b, 0x01]);
        assert_eq!(buf.len(), 2 + 11);
    }

    #[test]
    fn eof_terminated_array() {
        let mut buf = Vec::new();
        let mut se = Serializer::new(&mut buf);
        let mut seq = (&mut se).serialize_seq(None).unwrap();
        seq.serialize_element(&1).unwrap();
        SerializeSeq::end(seq).unwrap();
        assert_eq!(buf, [0x2f, 0x40, 0x01]);
    }

    #[test]
    fn eof_terminated_map() {
        let mut buf = Vec::new();
        let mut se = Serializer::new(&mut buf);
        let mut map = (&mut se).serialize_map(None).unwrap();
        map.serialize_entry("a", &1).unwrap();
        SerializeMap::end(map).unwrap();
        assert_eq!(buf, [0x3f, 0x81, 0x61, 0x40, 0x01]);
    }

    #[test]
    fn simple_map() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("a", 1);
        assert_eq!(to_vec(&map).unwrap(), [0x31, 0x81, 0x61, 0x40]);
    }

    #[test]
    fn non_string_keys_are_rejected() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(1, 2);
        assert!(matches!(to_vec(&map), Err(Error::KeyMustBeString)));
    }

    #[test]
    fn derived_struct() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let buf = to_vec(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(buf, [0x32, 0x81, 0x78, 0x40, 0x81, 0x79, 0x41]);
    }

    #[test]
    fn repeated_struct_keys_collapse() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        let buf = to_vec(&points).unwrap();
        // second struct refers to the table instead of spelling its keys
        assert_eq!(
            buf,
            [
                0x22, // array of two
                0x32, 0x81, 0x78, 0x40, 0x81, 0x79, 0x41, // {"x": 1, "y": 2}
                0x32, 0xa0, 0x42, 0xa1, 0x43, // {x: 3, y: 4} via indices
            ]
        );
    }

    #[test]
    fn field_name_state_sequence() {
        use crate::value::Value;
        use crate::primitives::OrderedMap;

        let first: OrderedMap<String, Value> = [
            ("aaaaa".to_string(), Value::Int(0)),
            ("bbbbb".to_string(), Value::Int(0)),
        ]
        .into_iter()
        .collect();
        let second: OrderedMap<String, Value> = [
            ("aaaaa".to_string(), Value::Int(0)),
            ("aaabb".to_string(), Value::Int(0)),
            ("aaacc".to_string(), Value::Int(0)),
        ]
        .into_iter()
        .collect();
        let doc = Value::Array(vec![Value::Map(first), Value::Map(second)]);

        let buf = to_vec(&doc).unwrap();
        assert_eq!(
            buf,
            [
                0x22, // array of two
                0x32, // first map
                0x85, 0x61, 0x61, 0x61, 0x61, 0x61, 0x60, // "aaaaa": 0
                0x85, 0x62, 0x62, 0x62, 0x62, 0x62, 0x60, // "bbbbb": 0
                0x33, // second map
                0xa0, 0x60, // indexed "aaaaa": 0
                0xc2, 0x03, 0x62, 0x62, 0x60, // prefix "aaa" + "bb": 0
                0xc2, 0x03, 0x63, 0x63, 0x60, // prefix "aaa" + "cc": 0
            ]
        );
    }

    #[test]
    fn enums() {
        #[derive(Serialize)]
        enum Shape {
            Point,
            Circle(u32),
            Segment(u32, u32),
            Rect { w: u32, h: u32 },
        }

        assert_eq!(to_vec(&Shape::Point).unwrap(), [0xc5, b'P', b'o', b'i', b'n', b't']);
        assert_eq!(
            to_vec(&Shape::Circle(3)).unwrap(),
            [0x31, 0x86, b'C', b'i', b'r', b'c', b'l', b'e', 0x42]
        );
        assert_eq!(
            to_vec(&Shape::Segment(1, 2)).unwrap(),
            [0x31, 0x87, b'S', b'e', b'g', b'm', b'e', b'n', b't', 0x22, 0x40, 0x41]
        );
        assert_eq!(
            to_vec(&Shape::Rect { w: 1, h: 2 }).unwrap(),
            [0x31, 0x84, b'R', b'e', b'c', b't', 0x32, 0x81, b'w', 0x40, 0x81, b'h', 0x41]
        );
    }

    #[test]
    fn initial_field_names() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
        }

        let mut buf = Vec::new();
        let mut se = Serializer::with_initial_field_names(&mut buf, ["id"]);
        Row { id: 1 }.serialize(&mut se).unwrap();
        assert_eq!(buf, [0x31, 0xa0, 0x40]);
    }

    #[test]
    fn bignum_integers() {
        use crate::primitives::BigInt;

        assert_eq!(
            to_vec(&BigInt::from(300i64)).unwrap(),
            [0x07, 0x00, 0x82, 0x01, 0x2c]
        );
        assert_eq!(to_vec(&BigInt::from(-1i64)).unwrap(), [0x07, 0x01, 0x81, 0xff]);
    }

    #[test]
    fn bignum_decimals() {
        use crate::primitives::{BigDecimal, BigInt};

        let dec = BigDecimal::new(BigInt::from(1234i64), 2);
        assert_eq!(to_vec(&dec).unwrap(), [0x07, 0x02, 0x04, 0x82, 0x04, 0xd2]);

        let neg_scale = BigDecimal::new(BigInt::from(5i64), -3);
        assert_eq!(to_vec(&neg_scale).unwrap(), [0x07, 0x02, 0x05, 0x81, 0x05]);
    }
}
