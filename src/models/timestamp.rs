//! Serde adapters that put the naive UTC timestamps stored by SQLite on the
//! wire as RFC 3339 strings with an explicit `Z`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    ts.and_utc().serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    DateTime::<Utc>::deserialize(deserializer).map(|dt| dt.naive_utc())
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        ts.map(|t| t.and_utc()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(|dt| dt.map(|dt| dt.naive_utc()))
    }
}
