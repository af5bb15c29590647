// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wire format for agent timestamps (`yyyy-MM-dd HH:mm:ss`, local time).
//!
//! Use with `#[serde(with = "timestamp")]` or, for nullable columns,
//! `#[serde(default, with = "timestamp::optional")]`.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds, matching what the wire
/// format can carry.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
}

pub mod optional {
    use super::FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => NaiveDateTime::parse_from_str(&raw, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
