//! Serde helpers encoding `U256` amounts as decimal strings.
//!
//! Config files and snapshots carry amounts far beyond `u64`, so they are
//! written as strings. Plain integers are still accepted on input for small
//! values.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserializer, Serializer, de};

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl de::Visitor<'_> for Visitor {
        type Value = U256;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a u256 encoded as a decimal string")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse(s).map_err(|err| {
                de::Error::custom(format!("failed to decode {s:?} as decimal u256: {err}"))
            })
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(U256::from(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v)
                .map(U256::from)
                .map_err(|_| de::Error::custom(format!("negative amount {v}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

/// Same encoding for a list of amounts.
pub mod vec {
    use alloy_primitives::U256;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Decimal(#[serde(with = "super")] U256);

    pub fn serialize<S>(values: &[U256], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|v| Decimal(*v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Decimal>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|Decimal(v)| v).collect())
    }
}

/// Parse a decimal amount, ignoring `_` digit separators.
pub fn parse(s: &str) -> Result<U256, String> {
    let digits: String = s.trim().chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("not a decimal integer".to_string());
    }
    U256::from_str_radix(&digits, 10).map_err(|err| err.to_string())
}

/// Render a fixed-point amount with `decimals` fractional digits.
///
/// `format_units(1_337_000, 6) == "1.337000"`.
pub fn format_units(amount: U256, decimals: usize) -> String {
    let str_amount = amount.to_string();
    if decimals == 0 {
        str_amount
    } else if str_amount.len() <= decimals {
        format!("0.{str_amount:0>decimals$}")
    } else {
        let split = str_amount.len() - decimals;
        format!("{}.{}", &str_amount[..split], &str_amount[split..])
    }
}
