use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Record;

/// One field of a partial update.
///
/// `Keep` leaves the stored value alone. For nullable fields use
/// `Patch<Option<T>>`: `Set(None)` clears the field, which is not the same
/// thing as `Keep`.
///
/// On the wire an absent key is `Keep` (pair with `#[serde(default)]`) and
/// any present value, `null` included, is `Set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Keep => None,
            Patch::Set(v) => Some(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Keep => Patch::Keep,
            Patch::Set(v) => Patch::Set(f(v)),
        }
    }

    /// Overwrites `target` when set.
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Set(v) = self {
            *target = v;
        }
    }

    /// Writes the value under `key` when set; `Keep` leaves the key out.
    pub fn write(self, record: &mut Record, key: &str)
    where
        T: Serialize,
    {
        if let Patch::Set(v) = self {
            let value = serde_json::to_value(v).unwrap_or(Value::Null);
            record.insert(key.to_string(), value);
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Keep,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Set)
    }
}
