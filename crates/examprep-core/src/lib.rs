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

//! examprep-core: Core library for the examprep study aid.
//!
//! This library provides host-independent types and algorithms for:
//! - Scheduling flashcard reviews (a simplified SM-2 variant)
//! - Tracking quiz results, category progress and study streaks
//! - Estimating the likelihood of passing the exam
//! - Driving quiz and flashcard sessions
//! - Persisting everything to a namespaced key-value store

pub mod clock;
pub mod config;
pub mod error;
pub mod prediction;
pub mod progress;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use clock::Clock;
pub use config::Config;
pub use error::{ErrorReport, Fallible, fail};
pub use progress::Tracker;
pub use scheduler::{Rating, Schedule, next_interval};
pub use session::flashcards::FlashcardSession;
pub use session::quiz::QuizSession;
pub use store::{Backend, MemoryBackend, Store};
pub use types::date::Date;
pub use types::progress::ProgressRecord;
pub use types::quiz_result::{QuizMode, QuizResult};
pub use types::review_state::ReviewState;
pub use types::timestamp::Timestamp;
