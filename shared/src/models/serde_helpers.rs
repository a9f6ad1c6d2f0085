//! Serde helpers for PATCH payloads

use serde::{Deserialize, Deserializer};

/// Tri-state field: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`
///
/// Use with `#[serde(default, deserialize_with = "serde_helpers::nullable")]`;
/// `default` supplies the absent case.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
