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

//! Long-term memory updates. An LTM event is the only kind of event that
//! changes stability or the long-term difficulty.

use crate::config::Config;
use crate::error::Fallible;
use crate::error::invalid;
use crate::model::Difficulty;
use crate::model::MAX_DIFFICULTY;
use crate::model::MIN_DIFFICULTY;
use crate::model::Retrievability;
use crate::model::Stability;
use crate::model::check_difficulty;
use crate::model::check_retrievability;
use crate::model::learning_damping;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::grade::FeedbackGrade;
use crate::types::timestamp::Timestamp;

/// The difficulty a card would have after an LTM event with the given grade.
///
/// Pure: the short-term engine calls this with `Hard` to find how far
/// same-day practice may move the effective difficulty.
pub fn next_difficulty(
    config: &Config,
    difficulty: Difficulty,
    retrievability: Retrievability,
    grade: FeedbackGrade,
) -> Fallible<Difficulty> {
    check_difficulty(difficulty)?;
    check_retrievability(retrievability)?;
    // A failure is surprising when recall was likely, a success when it
    // was not.
    let surprise = if grade.is_success() {
        1.0 - retrievability
    } else {
        retrievability
    };
    let shifted = difficulty + config.eta * surprise * config.difficulty_shift.get(grade);
    Ok(shifted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
}

/// The difficulty a Hard-graded LTM success would produce right now.
pub fn difficulty_floor(
    config: &Config,
    difficulty: Difficulty,
    retrievability: Retrievability,
) -> Fallible<Difficulty> {
    next_difficulty(config, difficulty, retrievability, FeedbackGrade::Hard)
}

/// Stability after an LTM event on a card with an LTM baseline.
pub fn next_stability(
    config: &Config,
    state: &CardState,
    retrievability: Retrievability,
    grade: FeedbackGrade,
) -> Fallible<Stability> {
    check_retrievability(retrievability)?;
    let s = state.stability;
    match config.base_gain.get(grade) {
        Some(gain) => {
            let damping = learning_damping(state.effective_difficulty, config.alpha)?;
            let delta = config.k * s * gain * (1.0 - retrievability) * damping;
            Ok(s + delta)
        }
        None => Ok((s * (1.0 - config.k_fail * retrievability)).max(config.s_min)),
    }
}

/// Stability after the very first review of a card. There is no forgetting
/// curve to read R from yet, so a success is credited from the grade alone,
/// and a failure is treated as one at R = 1.
fn first_review_stability(config: &Config, state: &CardState, grade: FeedbackGrade) -> Stability {
    let s = state.stability;
    match config.base_gain.get(grade) {
        Some(gain) => s.max(config.s_min * gain * config.first_review_factor),
        None => (s * (1.0 - config.k_fail)).max(config.s_min),
    }
}

/// Apply an LTM event.
///
/// `retrievability` is R immediately before the event. It must be `None`
/// exactly when the card has never had an LTM event.
pub fn apply_ltm(
    config: &Config,
    state: &CardState,
    grade: FeedbackGrade,
    retrievability: Option<Retrievability>,
    now: Timestamp,
    today: Date,
) -> Fallible<CardState> {
    state.validate()?;
    let (stability, r) = match (retrievability, state.is_new()) {
        (Some(r), false) => (next_stability(config, state, r, grade)?, r),
        (None, true) => (first_review_stability(config, state, grade), 1.0),
        (Some(_), true) => {
            return invalid("retrievability is undefined for a card with no long-term review.");
        }
        (None, false) => {
            return invalid("retrievability is required for a card with a long-term review.");
        }
    };
    let difficulty = next_difficulty(config, state.difficulty, r, grade)?;
    let today_state = state.on_day(today);
    Ok(CardState {
        stability,
        difficulty,
        effective_difficulty: difficulty,
        last_ltm_timestamp: Some(now),
        last_review_day: Some(today),
        stm_success_count_today: 0,
        struggles_today: today_state.struggles_today + u32::from(grade.is_struggle()),
        review_count: state.review_count + 1,
    })
}
