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
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;
use crate::model::Difficulty;
use crate::model::Stability;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::grade::FeedbackGrade;
use crate::types::timestamp::Timestamp;

/// One entry of the card state feed exchanged with whoever persists state.
/// On input most fields may be absent; on output every field is filled in.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardRecord {
    pub content_key: String,
    pub exercise_type: String,
    #[serde(default)]
    pub stability: Option<Stability>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub effective_difficulty: Option<Difficulty>,
    #[serde(default)]
    pub last_ltm_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub last_review_day: Option<Date>,
    #[serde(default)]
    pub stm_success_count_today: u32,
    #[serde(default)]
    pub struggles_today: u32,
    #[serde(default)]
    pub review_count: u32,
}

impl CardRecord {
    /// A record for a card with no history.
    pub fn new_card(content_key: impl Into<String>, exercise_type: impl Into<String>) -> Self {
        Self {
            content_key: content_key.into(),
            exercise_type: exercise_type.into(),
            stability: None,
            difficulty: None,
            effective_difficulty: None,
            last_ltm_timestamp: None,
            last_review_day: None,
            stm_success_count_today: 0,
            struggles_today: 0,
            review_count: 0,
        }
    }

    /// Split into identity and state. A record without an LTM timestamp is
    /// a new card; missing numbers fall back to the configured defaults.
    pub fn into_parts(self, config: &Config) -> Fallible<(Card, CardState)> {
        let card = Card::new(self.content_key, self.exercise_type)?;
        let defaults = CardState::new_card(config);
        let stability = match (self.stability, self.last_ltm_timestamp) {
            (Some(s), _) => s,
            (None, None) => defaults.stability,
            (None, Some(_)) => {
                return invalid(format!(
                    "card {card} has a long-term review timestamp but no stability."
                ));
            }
        };
        let difficulty = self.difficulty.unwrap_or(defaults.difficulty);
        let effective_difficulty = self.effective_difficulty.unwrap_or(difficulty);
        let state = CardState {
            stability,
            difficulty,
            effective_difficulty,
            last_ltm_timestamp: self.last_ltm_timestamp,
            last_review_day: self.last_review_day,
            stm_success_count_today: self.stm_success_count_today,
            struggles_today: self.struggles_today,
            review_count: self.review_count,
        };
        state
            .validate()
            .map_err(|e| ErrorReport::with_kind(e.kind(), format!("card {card}: {}", e.message())))?;
        Ok((card, state))
    }

    pub fn from_parts(card: &Card, state: &CardState) -> Self {
        Self {
            content_key: card.content_key().to_string(),
            exercise_type: card.exercise_type().to_string(),
            stability: Some(state.stability),
            difficulty: Some(state.difficulty),
            effective_difficulty: Some(state.effective_difficulty),
            last_ltm_timestamp: state.last_ltm_timestamp,
            last_review_day: state.last_review_day,
            stm_success_count_today: state.stm_success_count_today,
            struggles_today: state.struggles_today,
            review_count: state.review_count,
        }
    }
}

/// A feedback submission from the presentation layer.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Feedback {
    pub card: Card,
    pub grade: FeedbackGrade,
    pub timestamp: Timestamp,
    pub latency_ms: Option<u64>,
}

impl Feedback {
    pub fn new(card: Card, grade: FeedbackGrade, timestamp: Timestamp) -> Self {
        Self {
            card,
            grade,
            timestamp,
            latency_ms: None,
        }
    }

    pub fn with_latency(self, latency_ms: u64) -> Self {
        Self {
            latency_ms: Some(latency_ms),
            ..self
        }
    }
}
