// Magic newtype names that let the arbitrary-precision carriers tunnel
// through the serde data model.
pub(crate) const BIG_INT: &str = "YAJBE_BIG_INT";
pub(crate) const BIG_DECIMAL: &str = "YAJBE_BIG_DECIMAL";
