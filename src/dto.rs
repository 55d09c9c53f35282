//! Deserializers for form-shaped request bodies.
//!
//! Form inputs arrive as strings, with `""` meaning "not filled in", and
//! numeric inputs may arrive either as numbers or as strings.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// A string or number, trimmed; blank and `null` read as `None`.
pub fn form_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<FormValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(FormValue::Text(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(FormValue::Int(n)) => Some(n.to_string()),
        Some(FormValue::Float(f)) => Some(f.to_string()),
        Some(FormValue::Bool(b)) => Some(b.to_string()),
        None => None,
    })
}

/// A `yyyy-MM-dd` date; blank and `null` read as `None`.
pub fn form_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    match form_text(deserializer)? {
        None => Ok(None),
        Some(text) => crate::store::dates::parse_date(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date {text:?}, expected yyyy-MM-dd"))),
    }
}

/// A checkbox: `true`/`false`, `"true"`/`"on"`, `null` and blank read as `false`.
pub fn form_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<FormValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(FormValue::Bool(b)) => b,
        Some(FormValue::Text(s)) => matches!(s.trim(), "true" | "on" | "1"),
        Some(FormValue::Int(n)) => n != 0,
        Some(FormValue::Float(f)) => f != 0.0,
        None => false,
    })
}

/// Body returned by delete endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Deleted {
    pub id: i64,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self { id, deleted: true }
    }
}
