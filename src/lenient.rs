//! Deserializers for dashboard form payloads, where numbers arrive as the raw
//! text of an input box (`"8.50"`, `""`) as often as JSON numbers.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// A number or numeric string. Blank, null and unparseable text read as 0.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_number(deserializer)?.unwrap_or(0.0))
}

/// Like [`number`], but blank and null stay `None`.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(number) => Ok(number.as_f64().filter(|value| value.is_finite())),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            Ok(Some(
                text.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .unwrap_or(0.0),
            ))
        }
        other => Err(de::Error::custom(format!(
            "expected a number or numeric string, got {}",
            other
        ))),
    }
}

/// Any scalar as text; numbers keep their JSON spelling.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
