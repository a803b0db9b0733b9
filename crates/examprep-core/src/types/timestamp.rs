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

use std::fmt::Formatter;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Visitor;

use crate::clock::TimeZonePolicy;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// An instant in time. Stored as milliseconds since the Unix epoch, which is
/// what the browser's `Date.now()` produces.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_millis(millis: i64) -> Fallible<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| ErrorReport::new(format!("timestamp out of range: {millis}")))
    }

    pub fn from_rfc3339(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ErrorReport::new(format!("invalid timestamp '{s}': {e}")))?;
        Ok(Self(ts.with_timezone(&Utc)))
    }

    pub fn into_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The timestamp `days` whole days later, saturating at the end of the
    /// representable range.
    pub fn plus_days(self, days: u32) -> Self {
        let later = TimeDelta::try_days(days as i64)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(later)
    }

    pub fn plus_seconds(self, seconds: u32) -> Self {
        let later = self
            .0
            .checked_add_signed(TimeDelta::seconds(seconds as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(later)
    }

    /// Whole seconds elapsed from `earlier` to `self`, or zero if `earlier`
    /// is in the future.
    pub fn seconds_since(self, earlier: Timestamp) -> u64 {
        let delta = self.0 - earlier.0;
        delta.num_seconds().max(0) as u64
    }

    /// The calendar day this instant falls on under the given policy.
    pub fn local_date(self, tz: TimeZonePolicy) -> Date {
        tz.date_of(self.0)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.into_millis())
    }
}

/// Accepts epoch milliseconds (integer or float, as JavaScript numbers may
/// arrive) and RFC 3339 strings (what `Date.toISOString()` writes).
impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "epoch milliseconds or an RFC 3339 timestamp")
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Timestamp, E> {
        Timestamp::from_millis(v).map_err(|e| E::custom(e.message()))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Timestamp, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Timestamp, E> {
        if !v.is_finite() {
            return Err(E::custom("timestamp is not a finite number"));
        }
        self.visit_i64(v.round() as i64)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Timestamp, E> {
        Timestamp::from_rfc3339(v).map_err(|e| E::custom(e.message()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn test_millis_roundtrip() -> Fallible<()> {
        let ts = Timestamp::from_millis(1_700_000_000_123)?;
        assert_eq!(ts.into_millis(), 1_700_000_000_123);
        Ok(())
    }

    #[test]
    fn test_plus_days() -> Fallible<()> {
        let ts = Timestamp::from_millis(0)?;
        assert_eq!(ts.plus_days(7).into_millis(), 7 * MILLIS_PER_DAY);
        Ok(())
    }

    #[test]
    fn test_seconds_since() -> Fallible<()> {
        let a = Timestamp::from_millis(1_000)?;
        let b = Timestamp::from_millis(62_500)?;
        assert_eq!(b.seconds_since(a), 61);
        assert_eq!(a.seconds_since(b), 0);
        Ok(())
    }

    #[test]
    fn test_deserialize_number_and_string() -> Fallible<()> {
        let a: Timestamp = serde_json::from_str("1700000000000")?;
        let b: Timestamp = serde_json::from_str("1700000000000.0")?;
        let c: Timestamp = serde_json::from_str("\"2023-11-14T22:13:20.000Z\"")?;
        assert_eq!(a, b);
        assert_eq!(a, c);
        Ok(())
    }

    #[test]
    fn test_serialize_as_millis() -> Fallible<()> {
        let ts = Timestamp::from_millis(42)?;
        assert_eq!(serde_json::to_string(&ts)?, "42");
        Ok(())
    }

    #[test]
    fn test_local_date_fixed_offset() -> Fallible<()> {
        // 2023-11-14T22:13:20Z is already the 15th in UTC+03:00.
        let ts = Timestamp::from_millis(1_700_000_000_000)?;
        let utc = ts.local_date(TimeZonePolicy::utc());
        let plus3 = ts.local_date(TimeZonePolicy::Fixed(
            FixedOffset::east_opt(3 * 3600).unwrap(),
        ));
        assert_eq!(utc.to_string(), "2023-11-14");
        assert_eq!(plus3.to_string(), "2023-11-15");
        Ok(())
    }
}
