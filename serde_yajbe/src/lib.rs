#![deny(missing_docs, missing_debug_implementations)]

//! A serde implementation of the YAJBE binary data format.
//!
//! YAJBE is a compact, self-describing binary format that keeps JSON's data
//! model — null, booleans, integers, floats, byte strings, UTF-8 strings,
//! arrays and string-keyed maps — while dropping JSON's text overhead.
//! Every value starts with a single head byte that fuses the type tag with
//! a small inline payload, and map keys are compressed against the keys
//! already written in the same document, so documents full of repeated or
//! lexically similar field names shrink well without a schema.
//!
//! # Serializing and deserializing data structures
//!
//! Any type that implements `serde::Serialize` and `serde::Deserialize`
//! works with the convenience functions:
//!
//! - [`to_vec`] / [`to_writer`] for serialization
//! - [`from_slice`] / [`from_reader`] for deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Event {
//!     name: String,
//!     count: u32,
//! }
//!
//! let event = Event { name: "clicks".to_string(), count: 3 };
//! let buf = serde_yajbe::to_vec(&event).unwrap();
//! let back: Event = serde_yajbe::from_slice(&buf).unwrap();
//! assert_eq!(back, event);
//! ```
//!
//! # Untyped values
//!
//! Documents with no matching Rust type decode into [`Value`], and any
//! serializable type converts to and from a [`Value`] with [`to_value`]
//! and [`from_value`]:
//!
//! ```rust
//! use serde_yajbe::Value;
//!
//! let buf = serde_yajbe::to_vec(&vec![1i64, 2, 3]).unwrap();
//! let value: Value = serde_yajbe::from_slice(&buf).unwrap();
//! assert_eq!(value, Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
//! ```
//!
//! # Field name compression
//!
//! Within one document the encoder keeps a table of the map keys it has
//! written; a key seen before costs at most three bytes, and a key similar
//! to the previous one is delta-encoded against it. Both sides rebuild the
//! table implicitly, so there is nothing to configure. When encoder and
//! decoder agree on a dictionary of well-known keys out of band, the table
//! can be pre-seeded on both sides:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_yajbe::{de, read, ser};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Row { id: u32 }
//!
//! let mut buf = Vec::new();
//! let mut serializer = ser::Serializer::with_initial_field_names(&mut buf, ["id"]);
//! Row { id: 1 }.serialize(&mut serializer).unwrap();
//!
//! let reader = read::SliceReader::new(&buf);
//! let mut deserializer = de::Deserializer::with_initial_field_names(reader, ["id"]);
//! let row = Row::deserialize(&mut deserializer).unwrap();
//! assert_eq!(row.id, 1);
//! ```
//!
//! # Streams
//!
//! A document is exactly one value and consumes exactly its own bytes, so
//! documents can be concatenated on a stream and read back with repeated
//! [`from_reader`] calls. Encoders that do not know a container's length up
//! front emit the EOF-terminated container form; see
//! [`serde::Serializer::serialize_seq`] with a `None` length.
//!
//! # Feature flags
//!
//! - `"json"`: conversion from `serde_json::Value` to [`Value`].

// Public mods
pub mod de;
pub mod error;
pub mod head;
pub mod primitives;
pub mod read;
pub mod ser;
pub mod value;

// Private mods
mod constants;
mod field;
mod util;
mod varint;

pub use de::{from_reader, from_slice, Deserializer};
pub use error::Error;
pub use ser::{to_vec, to_writer, Serializer};
pub use value::{de::from_value, ser::to_value, Value};
