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

use std::cell::Cell;
use std::fmt::Display;
use std::fmt::Formatter;
use std::rc::Rc;
use std::str::FromStr;

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Offset;
use chrono::Utc;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[cfg(feature = "clock")]
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "clock")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance_seconds(&self, seconds: u32) {
        self.now.set(self.now.get().plus_seconds(seconds));
    }

    pub fn advance_days(&self, days: u32) {
        self.now.set(self.now.get().plus_days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Which timezone decides where one calendar day ends and the next begins.
///
/// Streaks and the activity calendar are counted in calendar days. With
/// `Local`, each instant is converted using the host's UTC offset in effect
/// at that instant, so a study session at 23:30 the night before a DST change
/// still counts for that night. With `Fixed`, one offset is used for every
/// instant regardless of DST.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeZonePolicy {
    #[cfg(feature = "clock")]
    Local,
    Fixed(FixedOffset),
}

impl TimeZonePolicy {
    pub fn utc() -> Self {
        TimeZonePolicy::Fixed(Utc.fix())
    }

    pub fn date_of(self, ts: DateTime<Utc>) -> Date {
        match self {
            #[cfg(feature = "clock")]
            TimeZonePolicy::Local => Date::new(ts.with_timezone(&chrono::Local).date_naive()),
            TimeZonePolicy::Fixed(offset) => Date::new(ts.with_timezone(&offset).date_naive()),
        }
    }
}

impl Default for TimeZonePolicy {
    #[cfg(feature = "clock")]
    fn default() -> Self {
        TimeZonePolicy::Local
    }

    #[cfg(not(feature = "clock"))]
    fn default() -> Self {
        TimeZonePolicy::utc()
    }
}

/// Parses `local`, `utc`, or an offset of the form `+HH:MM` / `-HH:MM`.
impl FromStr for TimeZonePolicy {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Fallible<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return local_policy();
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(TimeZonePolicy::utc());
        }
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return fail(format!("invalid timezone: {s}")),
        };
        let Some((hours, minutes)) = rest.split_once(':') else {
            return fail(format!("invalid timezone: {s}"));
        };
        let hours: i32 = hours
            .parse()
            .map_err(|_| ErrorReport::new(format!("invalid timezone: {s}")))?;
        let minutes: i32 = minutes
            .parse()
            .map_err(|_| ErrorReport::new(format!("invalid timezone: {s}")))?;
        if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
            return fail(format!("invalid timezone: {s}"));
        }
        let seconds = sign * (hours * 3600 + minutes * 60);
        match FixedOffset::east_opt(seconds) {
            Some(offset) => Ok(TimeZonePolicy::Fixed(offset)),
            None => fail(format!("invalid timezone: {s}")),
        }
    }
}

#[cfg(feature = "clock")]
fn local_policy() -> Fallible<TimeZonePolicy> {
    Ok(TimeZonePolicy::Local)
}

#[cfg(not(feature = "clock"))]
fn local_policy() -> Fallible<TimeZonePolicy> {
    fail("the local timezone requires the `clock` feature")
}

impl TryFrom<String> for TimeZonePolicy {
    type Error = ErrorReport;

    fn try_from(value: String) -> Fallible<Self> {
        value.parse()
    }
}

impl Display for TimeZonePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "clock")]
            TimeZonePolicy::Local => write!(f, "local"),
            TimeZonePolicy::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}
