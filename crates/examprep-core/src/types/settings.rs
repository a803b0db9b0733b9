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

use serde::Deserialize;
use serde::Serialize;

use crate::config::UiConfig;

/// User-adjustable display preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: String,
    pub animations_enabled: bool,
    pub sound_enabled: bool,
    pub show_jokes: bool,
}

impl Settings {
    pub fn from_config(ui: &UiConfig) -> Self {
        Self {
            theme: ui.theme.clone(),
            animations_enabled: ui.animations_enabled,
            sound_enabled: ui.sound_enabled,
            show_jokes: ui.show_jokes,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}
