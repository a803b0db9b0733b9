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

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::rng::permutation;

/// How hard a question or card is, as tagged by the content author.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// A multiple-choice question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    #[serde(alias = "correctAnswer")]
    pub correct_option: usize,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Question {
    pub fn validate(&self) -> Fallible<()> {
        if self.options.is_empty() {
            return fail(format!("question {} has no options", self.id));
        }
        if self.correct_option >= self.options.len() {
            return fail(format!(
                "question {} marks option {} as correct, but has only {} options",
                self.id,
                self.correct_option,
                self.options.len()
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }

    /// Shuffle the answer options, keeping track of the correct one.
    pub fn shuffle_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let order = permutation(self.options.len(), rng);
        let options = order.iter().map(|&i| self.options[i].clone()).collect();
        if let Some(position) = order.iter().position(|&i| i == self.correct_option) {
            self.correct_option = position;
        }
        self.options = options;
    }
}

/// A two-sided flashcard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub category_name: Option<String>,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A content category of the exam, e.g. `cardiovascular`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// How many practice questions make the category "complete".
    #[serde(default)]
    pub target_practice_questions: u32,
    /// Share of the real exam drawn from this category.
    #[serde(default)]
    pub exam_percentage: u32,
}
