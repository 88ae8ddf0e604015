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

//! Short-term memory updates: same-day practice after the day's LTM event.
//! These only move the effective difficulty, and only as far as the
//! difficulty a Hard-graded LTM success would have produced.

use crate::config::Config;
use crate::error::Fallible;
use crate::error::invalid;
use crate::ltm::difficulty_floor;
use crate::model::Difficulty;
use crate::model::Retrievability;
use crate::model::check_retrievability;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::grade::FeedbackGrade;

/// Fraction of the remaining gap closed by the `m`-th success of the day
/// (1-based).
pub fn step_size(m: u32) -> f64 {
    0.5 / (f64::from(m) + 1.0)
}

/// Move `effective` toward `floor` by the step for the `m`-th success.
pub fn approach_floor(effective: Difficulty, floor: Difficulty, m: u32) -> Difficulty {
    floor + (effective - floor) * (1.0 - step_size(m))
}

/// Apply an STM event. `retrievability` is R at the time of the event.
pub fn apply_stm(
    config: &Config,
    state: &CardState,
    grade: FeedbackGrade,
    retrievability: Retrievability,
    today: Date,
) -> Fallible<CardState> {
    state.validate()?;
    check_retrievability(retrievability)?;
    if state.is_new() {
        return invalid("a card with no long-term review cannot have a short-term event.");
    }
    let mut next = state.on_day(today);
    if grade.is_success() {
        let m = next.stm_success_count_today + 1;
        let floor = difficulty_floor(config, state.difficulty, retrievability)?;
        next.effective_difficulty = approach_floor(next.effective_difficulty, floor, m);
        next.stm_success_count_today = m;
    }
    if grade.is_struggle() {
        next.struggles_today += 1;
    }
    next.last_review_day = Some(today);
    next.review_count += 1;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::Timestamp;

    fn today() -> Fallible<Date> {
        Date::parse("2026-03-15")
    }

    fn practiced(difficulty: f64, effective_difficulty: f64) -> Fallible<CardState> {
        Ok(CardState {
            stability: 4.0,
            difficulty,
            effective_difficulty,
            last_ltm_timestamp: Some(Timestamp::parse("2026-03-15T08:00:00Z")?),
            last_review_day: Some(today()?),
            review_count: 5,
            ..CardState::new_card(&Config::default())
        })
    }

    #[test]
    fn test_step_size_diminishes() {
        assert_eq!(step_size(1), 0.25);
        assert!(step_size(2) < step_size(1));
        for m in 1..50 {
            assert!(step_size(m) > 0.0 && step_size(m) <= 0.5);
        }
    }

    #[test]
    fn test_success_sequence_approaches_floor_without_crossing() -> Fallible<()> {
        let config = Config::default();
        let r = 0.6;
        // Effective difficulty starts above the floor.
        let mut state = practiced(5.0, 8.0)?;
        let floor = difficulty_floor(&config, state.difficulty, r)?;
        assert!(floor < 8.0);
        let mut previous_gap = state.effective_difficulty - floor;
        for m in 1..=6 {
            let before = state.effective_difficulty;
            state = apply_stm(&config, &state, FeedbackGrade::Medium, r, today()?)?;
            let after = state.effective_difficulty;
            assert!(after < before && after > floor, "step {m}");
            assert_eq!(state.stm_success_count_today, m);
            let gap = after - floor;
            // Each step closes a smaller share of the remaining gap.
            assert!((gap / previous_gap - (1.0 - step_size(m))).abs() < 1e-9);
            previous_gap = gap;
        }
        Ok(())
    }

    #[test]
    fn test_effective_difficulty_below_floor_rises_toward_it() -> Fallible<()> {
        let config = Config::default();
        let state = practiced(5.0, 5.0)?;
        let floor = difficulty_floor(&config, 5.0, 0.5)?;
        assert!(floor > 5.0);
        let after = apply_stm(&config, &state, FeedbackGrade::Easy, 0.5, today()?)?;
        assert!(after.effective_difficulty > 5.0 && after.effective_difficulty < floor);
        Ok(())
    }

    #[test]
    fn test_at_floor_stays_at_floor() -> Fallible<()> {
        let config = Config::default();
        // With R = 1 the floor equals D.
        let state = practiced(5.0, 5.0)?;
        let after = apply_stm(&config, &state, FeedbackGrade::Medium, 1.0, today()?)?;
        assert_eq!(after.effective_difficulty, 5.0);
        Ok(())
    }

    #[test]
    fn test_stm_never_touches_stability_or_difficulty() -> Fallible<()> {
        let config = Config::default();
        let state = practiced(6.0, 7.5)?;
        for grade in FeedbackGrade::ALL {
            let after = apply_stm(&config, &state, grade, 0.8, today()?)?;
            assert_eq!(after.stability, state.stability);
            assert_eq!(after.difficulty, state.difficulty);
            assert_eq!(after.last_ltm_timestamp, state.last_ltm_timestamp);
        }
        Ok(())
    }

    #[test]
    fn test_failure_only_advances_counters() -> Fallible<()> {
        let config = Config::default();
        let state = practiced(6.0, 7.5)?;
        let after = apply_stm(&config, &state, FeedbackGrade::Again, 0.8, today()?)?;
        assert_eq!(after.effective_difficulty, 7.5);
        assert_eq!(after.stm_success_count_today, 0);
        assert_eq!(after.struggles_today, 1);
        assert_eq!(after.review_count, 6);
        Ok(())
    }

    #[test]
    fn test_hard_counts_as_success_and_struggle() -> Fallible<()> {
        let config = Config::default();
        let state = practiced(5.0, 8.0)?;
        let after = apply_stm(&config, &state, FeedbackGrade::Hard, 0.6, today()?)?;
        assert_eq!(after.stm_success_count_today, 1);
        assert_eq!(after.struggles_today, 1);
        assert!(after.effective_difficulty < 8.0);
        Ok(())
    }

    #[test]
    fn test_counter_resets_on_a_new_day() -> Fallible<()> {
        let config = Config::default();
        let state = CardState {
            stm_success_count_today: 4,
            struggles_today: 2,
            ..practiced(5.0, 8.0)?
        };
        let tomorrow = Date::parse("2026-03-16")?;
        let after = apply_stm(&config, &state, FeedbackGrade::Medium, 0.6, tomorrow)?;
        assert_eq!(after.stm_success_count_today, 1);
        assert_eq!(after.struggles_today, 0);
        assert_eq!(after.last_review_day, Some(tomorrow));
        Ok(())
    }

    #[test]
    fn test_new_card_is_rejected() -> Fallible<()> {
        let config = Config::default();
        let state = CardState::new_card(&config);
        assert!(apply_stm(&config, &state, FeedbackGrade::Medium, 1.0, today()?).is_err());
        Ok(())
    }
}
