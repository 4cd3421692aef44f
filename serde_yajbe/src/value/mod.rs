//! Value type for untyped YAJBE documents.

use ordered_float::OrderedFloat;
use serde_bytes::ByteBuf;

use crate::primitives::{BigDecimal, BigInt, OrderedMap};

pub(crate) mod de;
pub(crate) mod ser;

/// An untyped YAJBE value, one variant per wire kind.
///
/// Floats keep the width they were encoded with and compare through
/// [`OrderedFloat`], so a decoded document equals the value it was encoded
/// from even when NaN is involved. Maps preserve insertion order, which is
/// the order entries are written to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// The absent value
    #[default]
    Null,

    /// True or false
    Bool(bool),

    /// A signed integer.
    ///
    /// The wire format can carry positive values slightly beyond `i64`;
    /// decoding such a document into a `Value` fails rather than wrapping.
    Int(i64),

    /// IEEE 754 binary32
    Float(OrderedFloat<f32>),

    /// IEEE 754 binary64
    Double(OrderedFloat<f64>),

    /// Arbitrary-precision integer
    BigInt(BigInt),

    /// Arbitrary-precision decimal
    BigDecimal(BigDecimal),

    /// Opaque octet string
    Binary(ByteBuf),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// String-keyed map in insertion order
    Map(OrderedMap<String, Value>),
}

macro_rules! impl_from_for_value {
    ($variant:ident, $variant_ty:ty) => {
        impl From<$variant_ty> for Value {
            fn from(val: $variant_ty) -> Self {
                Self::$variant(val)
            }
        }
    };

    ($($variant:ident, $variant_ty:ty),*) => {
        $(impl_from_for_value!($variant, $variant_ty);)*
    }
}

impl_from_for_value! {
    Bool, bool,
    Int, i64,
    Float, OrderedFloat<f32>,
    Double, OrderedFloat<f64>,
    BigInt, BigInt,
    BigDecimal, BigDecimal,
    Binary, ByteBuf,
    String, String,
    Array, Vec<Value>,
    Map, OrderedMap<String, Value>
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Self::Float(OrderedFloat::from(val))
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Self::Double(OrderedFloat::from(val))
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Self::String(val.to_string())
    }
}

macro_rules! impl_from_int_for_value {
    ($($int_ty:ty),*) => {
        $(
            impl From<$int_ty> for Value {
                fn from(val: $int_ty) -> Self {
                    Self::Int(val as i64)
                }
            }
        )*
    }
}

impl_from_int_for_value!(i8, i16, i32, u8, u16, u32);

macro_rules! impl_try_from_for_value_variant {
    ($variant:ident, $variant_ty:ty) => {
        impl TryFrom<Value> for $variant_ty {
            type Error = Value;

            fn try_from(val: Value) -> Result<Self, Self::Error> {
                match val {
                    Value::$variant(inner) => Ok(inner),
                    _ => Err(val),
                }
            }
        }
    };

    ($($variant:ident, $variant_ty:ty),*) => {
        $(impl_try_from_for_value_variant!($variant, $variant_ty);)*
    }
}

impl_try_from_for_value_variant! {
    Bool, bool,
    Int, i64,
    BigInt, BigInt,
    BigDecimal, BigDecimal,
    Binary, ByteBuf,
    String, String,
    Array, Vec<Value>,
    Map, OrderedMap<String, Value>
}

impl TryFrom<Value> for f32 {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(val) => Ok(val.0),
            _ => Err(value),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(val) => Ok(val.0 as f64),
            Value::Double(val) => Ok(val.0),
            _ => Err(value),
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Value::Int(v)
                } else if let Some(v) = n.as_u64() {
                    // beyond i64; keep it exact
                    Value::BigInt(BigInt::from(v))
                } else {
                    Value::Double(OrderedFloat(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => Value::Map(
                o.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::OrderedFloat;
    use serde_bytes::ByteBuf;

    use crate::de::{from_reader, from_slice};
    use crate::primitives::{BigDecimal, BigInt, OrderedMap};
    use crate::ser::to_vec;

    use super::Value;

    fn assert_round_trip(expected: Value) {
        let buf = to_vec(&expected).unwrap();
        let decoded: Value = from_slice(&buf).unwrap();
        assert_eq!(decoded, expected);
        let decoded: Value = from_reader(buf.as_slice()).unwrap();
        assert_eq!(decoded, expected);
        // re-encoding a decoded document reproduces it byte for byte
        assert_eq!(to_vec(&decoded).unwrap(), buf);
    }

    #[test]
    fn scalars_round_trip() {
        assert_round_trip(Value::Null);
        assert_round_trip(Value::Bool(true));
        assert_round_trip(Value::Bool(false));
        for v in [0i64, 1, -1, 23, 24, 25, -23, -24, 127, 128, 0xff, i64::MAX, i64::MIN] {
            assert_round_trip(Value::Int(v));
        }
        assert_round_trip(Value::Float(OrderedFloat(1.5)));
        assert_round_trip(Value::Double(OrderedFloat(1.5)));
        assert_round_trip(Value::Double(OrderedFloat(f64::INFINITY)));
        assert_round_trip(Value::Double(OrderedFloat(f64::NEG_INFINITY)));
        assert_round_trip(Value::String(String::new()));
        assert_round_trip(Value::String("x".repeat(60)));
        assert_round_trip(Value::Binary(ByteBuf::from(vec![0u8; 315])));
    }

    #[test]
    fn nan_payload_bits_survive() {
        let bits = 0x7ff8_dead_beef_0001u64;
        let value = Value::Double(OrderedFloat(f64::from_bits(bits)));
        let buf = to_vec(&value).unwrap();
        let decoded: Value = from_slice(&buf).unwrap();
        match decoded {
            Value::Double(v) => assert_eq!(v.0.to_bits(), bits),
            other => panic!("expected a double, got {:?}", other),
        }
    }

    #[test]
    fn float_width_survives() {
        let value = Value::Float(OrderedFloat(1.5f32));
        let buf = to_vec(&value).unwrap();
        assert_eq!(buf[0], 0x05);
        assert_eq!(from_slice::<Value>(&buf).unwrap(), value);
    }

    #[test]
    fn containers_round_trip() {
        assert_round_trip(Value::Array(vec![]));
        assert_round_trip(Value::Array(vec![
            Value::Int(1),
            Value::String("two".into()),
            Value::Array(vec![Value::Null]),
        ]));
        assert_round_trip(Value::Array(vec![Value::Int(1); 11]));
        assert_round_trip(Value::Map(OrderedMap::new()));

        let map: OrderedMap<String, Value> = [
            ("zz".to_string(), Value::Int(1)),
            ("aa".to_string(), Value::Bool(true)),
            (
                "nested".to_string(),
                Value::Map(
                    [("zz".to_string(), Value::Null)].into_iter().collect(),
                ),
            ),
        ]
        .into_iter()
        .collect();
        assert_round_trip(Value::Map(map));
    }

    #[test]
    fn map_order_is_preserved() {
        let map: OrderedMap<String, Value> = [
            ("b".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Int(2)),
        ]
        .into_iter()
        .collect();
        let buf = to_vec(&Value::Map(map)).unwrap();
        let decoded: Value = from_slice(&buf).unwrap();
        match decoded {
            Value::Map(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, ["b", "a"]);
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn bignums_round_trip() {
        assert_round_trip(Value::BigInt(BigInt::from(0i64)));
        assert_round_trip(Value::BigInt(BigInt::from(i64::MAX)));
        assert_round_trip(Value::BigInt(BigInt::from_be_bytes(vec![0x01; 20])));
        assert_round_trip(Value::BigDecimal(BigDecimal::new(BigInt::from(1234i64), 2)));
        assert_round_trip(Value::BigDecimal(BigDecimal::new(
            BigInt::from(-5i64),
            -1000,
        )));
    }

    #[test]
    fn canonical_vectors() {
        // decode then re-encode reproduces the input bytes
        let vectors: &[&[u8]] = &[
            &[0x00],
            &[0x02],
            &[0x03],
            &[0x40],
            &[0x57],
            &[0x58, 0x00],
            &[0x58, 0x66],
            &[0x60],
            &[0x61],
            &[0x78, 0x00],
            &[0x78, 0xe7],
            &[0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x3f],
            &[0xc0],
            &[0xc1, 0x61],
            &[0x21, 0x40],
            &[0x22, 0x41, 0x41],
            &[0x31, 0x81, 0x61, 0x40],
        ];
        for bytes in vectors {
            let decoded: Value = from_slice(bytes).unwrap();
            assert_eq!(&to_vec(&decoded).unwrap(), bytes, "vector {:02x?}", bytes);
        }
    }

    #[test]
    fn positive_beyond_i64_is_rejected() {
        let buf = to_vec(&u64::MAX).unwrap();
        assert!(from_slice::<Value>(&buf).is_err());
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(7i32), Value::Int(7));
        assert_eq!(Value::from("s"), Value::String("s".to_string()));
        assert_eq!(bool::try_from(Value::Bool(true)).unwrap(), true);
        assert!(bool::try_from(Value::Int(1)).is_err());
        assert_eq!(f64::try_from(Value::Double(OrderedFloat(0.5))).unwrap(), 0.5);
    }

    #[cfg(feature = "json")]
    #[test]
    fn from_json_value() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"null": null, "flag": true, "n": 3, "pi": 3.5, "items": ["a", {"k": -1}]}"#,
        )
        .unwrap();
        let value = Value::from(json);

        // serde_json's default object iterates keys alphabetically
        let expected: OrderedMap<String, Value> = [
            ("flag".to_string(), Value::Bool(true)),
            (
                "items".to_string(),
                Value::Array(vec![
                    Value::String("a".to_string()),
                    Value::Map([("k".to_string(), Value::Int(-1))].into_iter().collect()),
                ]),
            ),
            ("n".to_string(), Value::Int(3)),
            ("null".to_string(), Value::Null),
            ("pi".to_string(), Value::Double(OrderedFloat(3.5))),
        ]
        .into_iter()
        .collect();
        assert_eq!(value, Value::Map(expected));

        let json_big: serde_json::Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(
            Value::from(json_big),
            Value::BigInt(crate::primitives::BigInt::from(u64::MAX))
        );
    }
}
