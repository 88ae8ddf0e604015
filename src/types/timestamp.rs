// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Local;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;
use crate::types::date::Date;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The date of this timestamp in the local timezone. Hosts use this to
    /// pick a default day token.
    pub fn local_date(self) -> Date {
        let ts = self.0.with_timezone(&Local);
        Date::new(ts.date_naive())
    }

    pub fn parse(s: &str) -> Fallible<Self> {
        match DateTime::parse_from_rfc3339(s.trim()) {
            Ok(ts) => Ok(Self(ts.with_timezone(&Utc))),
            Err(_) => invalid(format!("invalid timestamp: {s}")),
        }
    }

    /// Fractional days elapsed from `earlier` to `self`.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        let delta = self.0 - earlier.0;
        delta.num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    #[cfg(test)]
    pub fn plus_days(self, days: f64) -> Self {
        let millis = (days * MILLIS_PER_DAY).round() as i64;
        Self(self.0 + chrono::Duration::milliseconds(millis))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        Timestamp::parse(&string).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_since() -> Fallible<()> {
        let a = Timestamp::parse("2026-03-01T00:00:00Z")?;
        let b = Timestamp::parse("2026-03-15T12:00:00Z")?;
        assert_eq!(b.days_since(a), 14.5);
        assert_eq!(a.days_since(b), -14.5);
        Ok(())
    }

    #[test]
    fn test_plus_days() -> Fallible<()> {
        let a = Timestamp::parse("2026-03-01T00:00:00Z")?;
        assert_eq!(a.plus_days(14.0), Timestamp::parse("2026-03-15T00:00:00Z")?);
        assert_eq!(a.plus_days(-0.5), Timestamp::parse("2026-02-28T12:00:00Z")?);
        Ok(())
    }

    #[test]
    fn test_serde_uses_rfc3339() -> Fallible<()> {
        let ts: Timestamp = serde_json::from_str("\"2026-03-01T09:30:00+02:00\"")?;
        assert_eq!(serde_json::to_string(&ts)?, "\"2026-03-01T07:30:00+00:00\"");
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("noon").is_err());
    }
}
