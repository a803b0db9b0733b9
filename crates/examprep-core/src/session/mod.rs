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

//! Quiz and flashcard sessions.
//!
//! Both are sequencers over a fixed, non-empty list of items: `NotStarted`,
//! then `InProgress` at some index, then `Completed`. The index can only
//! ever point at an existing item.

pub mod flashcards;
pub mod quiz;

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::review_state::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    NotStarted,
    InProgress { index: usize },
    Completed,
}

/// Cursor over `len` items.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Cursor {
    state: SessionState,
    len: usize,
}

impl Cursor {
    pub(crate) fn new(len: usize, what: &str) -> Fallible<Self> {
        if len == 0 {
            return fail(format!("cannot start a {what} session with no items."));
        }
        Ok(Self {
            state: SessionState::NotStarted,
            len,
        })
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { index } => Some(index),
            _ => None,
        }
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub(crate) fn start(&mut self) -> Fallible<()> {
        match self.state {
            SessionState::NotStarted => {
                self.state = SessionState::InProgress { index: 0 };
                Ok(())
            }
            SessionState::InProgress { .. } => fail("session already started."),
            SessionState::Completed => fail("session already completed."),
        }
    }

    /// The current index, or an error unless the session is in progress.
    pub(crate) fn active(&self) -> Fallible<usize> {
        match self.state {
            SessionState::InProgress { index } => Ok(index),
            SessionState::NotStarted => fail("session has not started."),
            SessionState::Completed => fail("session already completed."),
        }
    }

    /// Step forward. Returns false at the last item, which stays current.
    pub(crate) fn next(&mut self) -> Fallible<bool> {
        let index = self.active()?;
        if index + 1 < self.len {
            self.state = SessionState::InProgress { index: index + 1 };
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Step back. Returns false at the first item.
    pub(crate) fn previous(&mut self) -> Fallible<bool> {
        let index = self.active()?;
        if index > 0 {
            self.state = SessionState::InProgress { index: index - 1 };
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn complete(&mut self) {
        self.state = SessionState::Completed;
    }
}

/// Which cards a flashcard review includes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    #[default]
    All,
    /// Cards whose next review is at or before now. Cards never rated are
    /// due.
    Due,
    /// Cards never rated.
    New,
}

impl ReviewFilter {
    pub fn matches(&self, state: Option<&ReviewState>, now: Timestamp) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Due => state.is_none_or(|s| s.is_due(now)),
            ReviewFilter::New => state.is_none_or(|s| s.is_new()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewFilter::All => "all",
            ReviewFilter::Due => "due",
            ReviewFilter::New => "new",
        }
    }
}

impl FromStr for ReviewFilter {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ReviewFilter::All),
            "due" => Ok(ReviewFilter::Due),
            "new" => Ok(ReviewFilter::New),
            _ => fail(format!("Invalid review filter: {s}")),
        }
    }
}

impl Display for ReviewFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
