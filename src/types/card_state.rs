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

use crate::config::Config;
use crate::error::Fallible;
use crate::model::Difficulty;
use crate::model::Stability;
use crate::model::check_difficulty;
use crate::model::check_stability;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// The memory state of one card.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CardState {
    /// Stability, in days.
    pub stability: Stability,
    /// The long-term difficulty. Only LTM events change it.
    pub difficulty: Difficulty,
    /// The difficulty the next LTM event will use. Reset to `difficulty` by
    /// every LTM event; same-day practice can move it.
    pub effective_difficulty: Difficulty,
    /// When the card was last reviewed under LTM rules. `None` for a card
    /// that has never been reviewed.
    pub last_ltm_timestamp: Option<Timestamp>,
    /// The day token of the most recent event of any kind.
    pub last_review_day: Option<Date>,
    /// STM successes on `last_review_day`.
    pub stm_success_count_today: u32,
    /// Again and Hard outcomes on `last_review_day`.
    pub struggles_today: u32,
    /// Total number of events, LTM and STM.
    pub review_count: u32,
}

impl CardState {
    /// The state of a card that has never been presented.
    pub fn new_card(config: &Config) -> Self {
        Self {
            stability: config.initial_stability,
            difficulty: config.initial_difficulty,
            effective_difficulty: config.initial_difficulty,
            last_ltm_timestamp: None,
            last_review_day: None,
            stm_success_count_today: 0,
            struggles_today: 0,
            review_count: 0,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_ltm_timestamp.is_none()
    }

    /// Whether the card has had any event on `today`.
    pub fn seen_on(&self, today: Date) -> bool {
        self.last_review_day == Some(today)
    }

    /// This state as seen on `today`: the daily counters belong to
    /// `last_review_day` and read as zero on any other day.
    pub fn on_day(&self, today: Date) -> CardState {
        let mut state = self.clone();
        if !self.seen_on(today) {
            state.stm_success_count_today = 0;
            state.struggles_today = 0;
        }
        state
    }

    pub fn validate(&self) -> Fallible<()> {
        check_stability(self.stability)?;
        check_difficulty(self.difficulty)?;
        check_difficulty(self.effective_difficulty)?;
        Ok(())
    }
}
