//! Primitive type definitions

mod bignum;
pub use bignum::{BigDecimal, BigInt};
pub(crate) use bignum::BigNum;

mod map;
pub use map::OrderedMap;
