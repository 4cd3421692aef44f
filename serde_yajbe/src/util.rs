/// Newtype wrappers that receive a dedicated wire encoding instead of the
/// plain Bytes form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NewType {
    #[default]
    None,
    BigInt,
    BigDecimal,
}
