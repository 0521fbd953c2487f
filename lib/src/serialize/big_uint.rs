//! Decimal-string serde for [`BigUint`], so key components and ciphertexts
//! survive JSON transport without precision loss.
//!
//! Use with `#[serde(with = "crate::serialize::big_uint")]`.

use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value.to_str_radix(10).serialize(serializer)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrUint {
    String(String),
    Uint(u64),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    let su: StringOrUint = Deserialize::deserialize(deserializer)?;
    match su {
        StringOrUint::String(s) => BigUint::parse_bytes(s.trim().as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal integer: {:?}", s))),
        StringOrUint::Uint(u) => Ok(BigUint::from(u)),
    }
}
