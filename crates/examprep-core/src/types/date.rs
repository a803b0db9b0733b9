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

use chrono::Datelike;
use chrono::NaiveDate;
use serde::Serialize;
use serde::Serializer;

/// A calendar day, as seen in the configured timezone.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day. `None` only at the very start of the
    /// representable range.
    pub fn yesterday(self) -> Option<Date> {
        self.0.pred_opt().map(Date)
    }

    /// The date `days` days before this one, saturating at the minimum
    /// representable date.
    pub fn days_before(self, days: u32) -> Date {
        let date = self
            .0
            .checked_sub_days(chrono::Days::new(days as u64))
            .unwrap_or(NaiveDate::MIN);
        Date(date)
    }

    /// Short weekday name, e.g. `Mon`.
    pub fn weekday_name(self) -> String {
        self.0.weekday().to_string()
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
