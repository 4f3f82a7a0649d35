//! Serde helpers for decimal fields.
//!
//! The backend serializes decimal columns (hours, balances) as strings such as
//! `"1.50"`, while computed fields arrive as JSON numbers. Both shapes are
//! accepted on input.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid decimal '{}'", s))),
    }
}
