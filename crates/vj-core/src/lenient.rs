//! Forgiving field readers for stored and shared preset JSON. A `null` or
//! mistyped field falls back instead of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any JSON number as `f32`. Everything else reads as NaN, which the
/// record's `sanitized` pass replaces with the field default.
pub(crate) fn f32_or_nan<'de, D: Deserializer<'de>>(d: D) -> Result<f32, D::Error> {
    Ok(Value::deserialize(d)?
        .as_f64()
        .map_or(f32::NAN, |v| v as f32))
}

pub(crate) fn bool_or_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(d)?.as_bool().unwrap_or(true))
}

pub(crate) fn bool_or_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(d)?.as_bool().unwrap_or(false))
}

pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Catalog index from any finite JSON number, rounded, negatives at 0.
/// `None` when the value is not a number.
pub(crate) fn catalog_index<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(Value::deserialize(d)?
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, f64::from(u32::MAX)) as u32))
}
