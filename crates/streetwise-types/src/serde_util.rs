//! Serde helpers shared by catalog and snapshot types.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be `null` in the source, substituting the
/// type's default.
///
/// Pair with `#[serde(default)]` so an absent key behaves the same way as an
/// explicit `null`. Catalog files routinely omit numeric fields that do not
/// apply to an action, and those must read as zero.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
