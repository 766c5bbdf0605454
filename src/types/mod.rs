pub mod conversation;
pub mod error;
pub mod intent;
pub mod profile;
pub mod question;

use serde::{Deserialize, Deserializer};

/// 反序列化时把 `null` 当作缺省值
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
