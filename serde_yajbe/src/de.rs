//! Deserializer implementation

use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

use crate::{
    constants::{BIG_DECIMAL, BIG_INT},
    error::Error,
    field::FieldNameDecoder,
    head::{self, Head},
    primitives::{BigDecimal, BigInt, BigNum},
    read::{IoReader, Read, SliceReader},
    varint::read_uint_le,
};

/// Deserialize an instance of type T from an IO stream. The stream is left
/// positioned after the document, so concatenated documents can be read
/// with repeated calls.
pub fn from_reader<T: de::DeserializeOwned>(reader: impl std::io::Read) -> Result<T, Error> {
    let reader = IoReader::new(reader);
    let mut de = Deserializer::new(reader);
    T::deserialize(&mut de)
}

/// Deserialize an instance of type T from a byte slice
pub fn from_slice<'de, T: de::Deserialize<'de>>(slice: &'de [u8]) -> Result<T, Error> {
    let reader = SliceReader::new(slice);
    let mut de = Deserializer::new(reader);
    T::deserialize(&mut de)
}

/// A structure that deserializes YAJBE encoded values into Rust types.
///
/// Like the serializer, one `Deserializer` corresponds to one document:
/// the field-name table filled while reading earlier map keys resolves the
/// indexed and delta forms of later ones.
#[derive(Debug)]
pub struct Deserializer<R> {
    reader: R,
    field_names: FieldNameDecoder,
}

impl<'de, R: Read<'de>> Deserializer<R> {
    /// Creates a new YAJBE deserializer
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            field_names: FieldNameDecoder::new(),
        }
    }

    /// Creates a deserializer whose field-name table is seeded with
    /// `names`, matching an encoder seeded the same way.
    pub fn with_initial_field_names<'n, I>(reader: R, names: I) -> Self
    where
        I: IntoIterator<Item = &'n str>,
    {
        Self {
            reader,
            field_names: FieldNameDecoder::with_initial(names),
        }
    }

    fn read_field_name(&mut self) -> Result<String, Error> {
        self.field_names.decode(&mut self.reader)
    }

    fn read_sized_len(&mut self, width: u8) -> Result<usize, Error> {
        let m = read_uint_le(&mut self.reader, width)?;
        let len = m + 59;
        usize::try_from(len).map_err(|_| Error::LengthOverflow(len))
    }

    fn read_count(&mut self, width: u8) -> Result<usize, Error> {
        let m = read_uint_le(&mut self.reader, width)?;
        let count = m + 10;
        usize::try_from(count).map_err(|_| Error::LengthOverflow(count))
    }

    #[inline]
    fn parse_signed(&mut self) -> Result<i64, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::PosIntInline(w) => Ok(w as i64 + 1),
            Head::PosIntExt(width) => {
                let m = read_uint_le(&mut self.reader, width)?;
                let v = m.checked_add(25).ok_or(Error::IntegerOverflow)?;
                i64::try_from(v).map_err(|_| Error::IntegerOverflow)
            }
            Head::NegIntInline(w) => Ok(-(w as i64)),
            Head::NegIntExt(width) => {
                let m = read_uint_le(&mut self.reader, width)?;
                let magnitude = m.checked_add(24).ok_or(Error::IntegerOverflow)?;
                if magnitude > 1u64 << 63 {
                    return Err(Error::IntegerOverflow);
                }
                Ok((magnitude as i64).wrapping_neg())
            }
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    #[inline]
    fn parse_unsigned(&mut self) -> Result<u64, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::PosIntInline(w) => Ok(w as u64 + 1),
            Head::PosIntExt(width) => {
                let m = read_uint_le(&mut self.reader, width)?;
                m.checked_add(25).ok_or(Error::IntegerOverflow)
            }
            Head::NegIntInline(0) => Ok(0),
            Head::NegIntInline(_) | Head::NegIntExt(_) => Err(Error::IntegerOverflow),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn parse_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_le_bytes(self.reader.read_const_bytes()?))
    }

    fn parse_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_le_bytes(self.reader.read_const_bytes()?))
    }

    fn parse_f16(&mut self) -> Result<f32, Error> {
        let bits = u16::from_le_bytes(self.reader.read_const_bytes()?);
        Ok(f32_from_f16_bits(bits))
    }

    fn parse_str_len(&mut self) -> Result<usize, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::StrInline(n) => Ok(n as usize),
            Head::StrExt(width) => self.read_sized_len(width),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn parse_bytes_len(&mut self) -> Result<usize, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::BytesInline(n) => Ok(n as usize),
            Head::BytesExt(width) => self.read_sized_len(width),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    // Expects the BigNum head to be consumed already.
    //
    // flags byte: bit 0 sign, bit 1 kind, bits 2..3 scale width - 1; the
    // sign bit repeats what the two's-complement magnitude already says.
    fn parse_bignum(&mut self) -> Result<BigNum, Error> {
        let flags = self.reader.next()?;
        if flags & 0xf0 != 0 {
            return Err(Error::InvalidHead(flags));
        }
        if flags & 0b10 == 0 {
            if flags & 0b1100 != 0 {
                return Err(Error::InvalidHead(flags));
            }
            let len = self.parse_bytes_len()?;
            let magnitude = self.reader.read_bytes(len)?;
            Ok(BigNum::Int(BigInt::from_be_bytes(magnitude)))
        } else {
            let width = ((flags >> 2) & 0b11) + 1;
            let zigzag = read_uint_le(&mut self.reader, width)? as u32;
            let scale = ((zigzag >> 1) as i32) ^ -((zigzag & 1) as i32);
            let len = self.parse_bytes_len()?;
            let magnitude = self.reader.read_bytes(len)?;
            Ok(BigNum::Decimal(BigDecimal::new(
                BigInt::from_be_bytes(magnitude),
                scale,
            )))
        }
    }

    fn parse_array_count(&mut self) -> Result<Option<usize>, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::ArrayInline(n) => Ok(Some(n as usize)),
            Head::ArrayExt(width) => Ok(Some(self.read_count(width)?)),
            Head::ArrayEof => Ok(None),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn parse_map_count(&mut self) -> Result<Option<usize>, Error> {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::MapInline(n) => Ok(Some(n as usize)),
            Head::MapExt(width) => Ok(Some(self.read_count(width)?)),
            Head::MapEof => Ok(None),
            _ => Err(Error::InvalidHead(byte)),
        }
    }
}

impl<'de, 'a, R: Read<'de>> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let byte = self.reader.peek()?;
        match Head::from_u8(byte) {
            Head::Null => {
                self.reader.next()?;
                visitor.visit_unit()
            }
            Head::False => {
                self.reader.next()?;
                visitor.visit_bool(false)
            }
            Head::True => {
                self.reader.next()?;
                visitor.visit_bool(true)
            }
            Head::PosIntInline(_) | Head::NegIntInline(_) | Head::NegIntExt(_) => {
                visitor.visit_i64(self.parse_signed()?)
            }
            Head::PosIntExt(_) => {
                // surface the widest type the value fits
                let v = self.parse_unsigned()?;
                match i64::try_from(v) {
                    Ok(v) => visitor.visit_i64(v),
                    Err(_) => visitor.visit_u64(v),
                }
            }
            Head::Float16 => {
                self.reader.next()?;
                visitor.visit_f32(self.parse_f16()?)
            }
            Head::Float32 => {
                self.reader.next()?;
                visitor.visit_f32(self.parse_f32()?)
            }
            Head::Float64 => {
                self.reader.next()?;
                visitor.visit_f64(self.parse_f64()?)
            }
            Head::BigNum => {
                self.reader.next()?;
                let num = self.parse_bignum()?;
                visitor.visit_enum(BigNumAccess::new(num))
            }
            Head::StrInline(_) | Head::StrExt(_) => self.deserialize_str(visitor),
            Head::BytesInline(_) | Head::BytesExt(_) => self.deserialize_byte_buf(visitor),
            Head::ArrayInline(_) | Head::ArrayExt(_) | Head::ArrayEof => {
                self.deserialize_seq(visitor)
            }
            Head::MapInline(_) | Head::MapExt(_) | Head::MapEof => self.deserialize_map(visitor),
            Head::Eof | Head::Reserved => Err(Error::InvalidHead(byte)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::True => visitor.visit_bool(true),
            Head::False => visitor.visit_bool(false),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.parse_signed()?)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.parse_signed()?)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.parse_signed()?)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i64(self.parse_signed()?)
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.parse_unsigned()?)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.parse_unsigned()?)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.parse_unsigned()?)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u64(self.parse_unsigned()?)
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let byte = self.reader.peek()?;
        match Head::from_u8(byte) {
            Head::Float16 => {
                self.reader.next()?;
                visitor.visit_f32(self.parse_f16()?)
            }
            Head::Float32 => {
                self.reader.next()?;
                visitor.visit_f32(self.parse_f32()?)
            }
            Head::Float64 => {
                self.reader.next()?;
                visitor.visit_f64(self.parse_f64()?)
            }
            // integers widen, matching the JSON number model
            Head::PosIntInline(_) | Head::NegIntInline(_) | Head::NegIntExt(_) => {
                visitor.visit_f64(self.parse_signed()? as f64)
            }
            Head::PosIntExt(_) => visitor.visit_f64(self.parse_unsigned()? as f64),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let len = self.parse_str_len()?;
        self.reader.forward_read_str(len, visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let len = self.parse_bytes_len()?;
        self.reader.forward_read_bytes(len, visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        if self.reader.peek()? == head::NULL {
            self.reader.next()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let byte = self.reader.next()?;
        match Head::from_u8(byte) {
            Head::Null => visitor.visit_unit(),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match name {
            BIG_INT => {
                let byte = self.reader.next()?;
                if Head::from_u8(byte) != Head::BigNum {
                    return Err(Error::InvalidHead(byte));
                }
                match self.parse_bignum()? {
                    BigNum::Int(big) => visitor.visit_byte_buf(big.into_inner()),
                    BigNum::Decimal(_) => Err(de::Error::invalid_type(
                        de::Unexpected::Other("BigNum decimal"),
                        &"BigNum integer",
                    )),
                }
            }
            BIG_DECIMAL => {
                let byte = self.reader.next()?;
                if Head::from_u8(byte) != Head::BigNum {
                    return Err(Error::InvalidHead(byte));
                }
                let dec = match self.parse_bignum()? {
                    BigNum::Decimal(dec) => dec,
                    // an integer payload is a decimal with scale zero
                    BigNum::Int(big) => BigDecimal::new(big, 0),
                };
                visitor.visit_byte_buf(dec.to_packed())
            }
            _ => visitor.visit_newtype_struct(self),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let remaining = self.parse_array_count()?;
        visitor.visit_seq(ArrayAccess {
            de: self,
            remaining,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let remaining = self.parse_map_count()?;
        visitor.visit_map(MapAccess {
            de: self,
            remaining,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let byte = self.reader.peek()?;
        match Head::from_u8(byte) {
            Head::StrInline(_) | Head::StrExt(_) => {
                visitor.visit_enum(UnitVariantAccess { de: self })
            }
            Head::MapInline(1) => {
                self.reader.next()?;
                visitor.visit_enum(VariantAccess {
                    de: self,
                    eof_terminated: false,
                })
            }
            Head::MapExt(_) => {
                let count = self.parse_map_count()?;
                if count != Some(1) {
                    return Err(de::Error::invalid_length(
                        count.unwrap_or(0),
                        &"a single-entry map",
                    ));
                }
                visitor.visit_enum(VariantAccess {
                    de: self,
                    eof_terminated: false,
                })
            }
            Head::MapEof => {
                self.reader.next()?;
                visitor.visit_enum(VariantAccess {
                    de: self,
                    eof_terminated: true,
                })
            }
            Head::MapInline(n) => Err(de::Error::invalid_length(
                n as usize,
                &"a single-entry map",
            )),
            _ => Err(Error::InvalidHead(byte)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Access to the children of an array, either counted or EOF-terminated
#[derive(Debug)]
pub struct ArrayAccess<'a, R> {
    de: &'a mut Deserializer<R>,
    remaining: Option<usize>,
}

impl<'a, 'de, R: Read<'de>> de::SeqAccess<'de> for ArrayAccess<'a, R> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match &mut self.remaining {
            Some(0) => Ok(None),
            Some(n) => {
                *n -= 1;
                seed.deserialize(&mut *self.de).map(Some)
            }
            None => {
                if self.de.reader.peek()? == head::EOF {
                    self.de.reader.next()?;
                    self.remaining = Some(0);
                    Ok(None)
                } else {
                    seed.deserialize(&mut *self.de).map(Some)
                }
            }
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

/// Access to the entries of a map, either counted or EOF-terminated. Keys
/// resolve through the document's field-name table.
#[derive(Debug)]
pub struct MapAccess<'a, R> {
    de: &'a mut Deserializer<R>,
    remaining: Option<usize>,
}

impl<'a, 'de, R: Read<'de>> de::MapAccess<'de> for MapAccess<'a, R> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match &mut self.remaining {
            Some(0) => Ok(None),
            Some(n) => {
                *n -= 1;
                seed.deserialize(FieldKeyDeserializer { de: &mut *self.de })
                    .map(Some)
            }
            None => {
                if self.de.reader.peek()? == head::EOF {
                    self.de.reader.next()?;
                    self.remaining = Some(0);
                    Ok(None)
                } else {
                    seed.deserialize(FieldKeyDeserializer { de: &mut *self.de })
                        .map(Some)
                }
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

// Map keys come out of the field-name compressor, not the value codec.
struct FieldKeyDeserializer<'a, R> {
    de: &'a mut Deserializer<R>,
}

impl<'a, 'de, R: Read<'de>> de::Deserializer<'de> for FieldKeyDeserializer<'a, R> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let name = self.de.read_field_name()?;
        visitor.visit_string(name)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct UnitVariantAccess<'a, R> {
    de: &'a mut Deserializer<R>,
}

impl<'a, 'de, R: Read<'de>> de::EnumAccess<'de> for UnitVariantAccess<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'a, 'de, R: Read<'de>> de::VariantAccess<'de> for UnitVariantAccess<'a, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(de::Error::invalid_type(
            de::Unexpected::UnitVariant,
            &"newtype variant",
        ))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            de::Unexpected::UnitVariant,
            &"tuple variant",
        ))
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            de::Unexpected::UnitVariant,
            &"struct variant",
        ))
    }
}

struct VariantAccess<'a, R> {
    de: &'a mut Deserializer<R>,
    eof_terminated: bool,
}

impl<'a, 'de, R: Read<'de>> VariantAccess<'a, R> {
    fn end_map(&mut self) -> Result<(), Error> {
        if self.eof_terminated {
            let byte = self.de.reader.next()?;
            if byte != head::EOF {
                return Err(Error::InvalidHead(byte));
            }
        }
        Ok(())
    }
}

impl<'a, 'de, R: Read<'de>> de::EnumAccess<'de> for VariantAccess<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = self.de.read_field_name()?;
        let variant = seed.deserialize(IntoDeserializer::<Error>::into_deserializer(name))?;
        Ok((variant, self))
    }
}

impl<'a, 'de, R: Read<'de>> de::VariantAccess<'de> for VariantAccess<'a, R> {
    type Error = Error;

    fn unit_variant(mut self) -> Result<(), Self::Error> {
        <() as de::Deserialize>::deserialize(&mut *self.de)?;
        self.end_map()
    }

    fn newtype_variant_seed<T>(mut self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        let value = seed.deserialize(&mut *self.de)?;
        self.end_map()?;
        Ok(value)
    }

    fn tuple_variant<V>(mut self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = de::Deserializer::deserialize_seq(&mut *self.de, visitor)?;
        self.end_map()?;
        Ok(value)
    }

    fn struct_variant<V>(
        mut self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = de::Deserializer::deserialize_map(&mut *self.de, visitor)?;
        self.end_map()?;
        Ok(value)
    }
}

/// Drives a decoded BigNum payload through the serde enum machinery, the
/// only spot in the data model where a self-describing visitor can receive
/// a type serde has no native hook for.
pub(crate) struct BigNumAccess {
    num: BigNum,
}

impl BigNumAccess {
    pub(crate) fn new(num: BigNum) -> Self {
        Self { num }
    }
}

impl<'de> de::EnumAccess<'de> for BigNumAccess {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = match &self.num {
            BigNum::Int(_) => BIG_INT,
            BigNum::Decimal(_) => BIG_DECIMAL,
        };
        let value = seed.deserialize(IntoDeserializer::<Error>::into_deserializer(name))?;
        Ok((value, self))
    }
}

impl<'de> de::VariantAccess<'de> for BigNumAccess {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Err(de::Error::invalid_type(
            de::Unexpected::NewtypeVariant,
            &"unit variant",
        ))
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.num {
            BigNum::Int(big) => seed.deserialize(de::value::BytesDeserializer::new(big.as_bytes())),
            BigNum::Decimal(dec) => {
                let packed = dec.to_packed();
                seed.deserialize(de::value::BytesDeserializer::new(&packed))
            }
        }
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            de::Unexpected::NewtypeVariant,
            &"tuple variant",
        ))
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(de::Error::invalid_type(
            de::Unexpected::NewtypeVariant,
            &"struct variant",
        ))
    }
}

// binary16 -> binary32 widening; exact for every half-precision value
fn f32_from_f16_bits(bits: u16) -> f32 {
    let sign = ((bits & 0x8000) as u32) << 16;
    let exp = ((bits >> 10) & 0x1f) as u32;
    let frac = (bits & 0x03ff) as u32;
    let rest = match (exp, frac) {
        (0, 0) => 0,
        (0, _) => {
            // subnormal: shift the fraction up to a normal binary32
            let mut exp = -14i32;
            let mut frac = frac;
            while frac & 0x0400 == 0 {
                frac <<= 1;
                exp -= 1;
            }
            (((exp + 127) as u32) << 23) | ((frac & 0x03ff) << 13)
        }
        (31, _) => (255 << 23) | (frac << 13),
        _ => ((exp + 112) << 23) | (frac << 13),
    };
    f32::from_bits(sign | rest)
}
