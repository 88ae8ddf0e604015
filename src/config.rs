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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::error::misconfigured;
use crate::model::MAX_DIFFICULTY;
use crate::model::MIN_DIFFICULTY;
use crate::types::grade::FeedbackGrade;
use crate::types::grade::GainTable;
use crate::types::grade::ShiftTable;

/// The scheduler's parameter set. Every field can be overridden from TOML;
/// missing fields take their defaults.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Retrievability at or below which a reviewed card is due.
    pub r_target: f64,
    /// Lower bound on stability, in days.
    pub s_min: f64,
    /// Stability learning rate on success.
    pub k: f64,
    /// Stability penalty rate on failure.
    pub k_fail: f64,
    /// How strongly difficulty damps stability growth.
    pub alpha: f64,
    /// Difficulty adaptation rate.
    pub eta: f64,
    pub base_gain: GainTable,
    pub difficulty_shift: ShiftTable,
    /// Stability given to a card that has never been reviewed.
    pub initial_stability: f64,
    /// Difficulty given to a card that has never been reviewed.
    pub initial_difficulty: f64,
    /// Multiplier on `s_min * base_gain` for a new card's first success.
    pub first_review_factor: f64,
    /// Maximum number of new cards introduced per day.
    pub new_cards_per_day: usize,
    /// Minimum time since the last LTM event for a review to count as LTM.
    pub min_ltm_spacing_hours: f64,
    /// Maximum number of cards in an assembled queue. `None` is unlimited.
    pub session_size: Option<usize>,
    /// Put cards graded Again or Hard at the back of the session queue.
    pub requeue_struggles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            r_target: 0.70,
            s_min: 0.5,
            k: 1.2,
            k_fail: 0.6,
            alpha: 0.15,
            eta: 0.8,
            base_gain: GainTable::default(),
            difficulty_shift: ShiftTable::default(),
            initial_stability: 0.5,
            initial_difficulty: 5.0,
            first_review_factor: 2.0,
            new_cards_per_day: 20,
            min_ltm_spacing_hours: 8.0,
            session_size: Some(20),
            requeue_struggles: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("configuration file does not exist.");
        }
        let content = read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Check the parameter set. Called once at startup: the update rules
    /// assume a valid configuration and do not re-check it.
    pub fn validate(&self) -> Fallible<()> {
        let scalars = [
            ("r_target", self.r_target),
            ("s_min", self.s_min),
            ("k", self.k),
            ("k_fail", self.k_fail),
            ("alpha", self.alpha),
            ("eta", self.eta),
            ("initial_stability", self.initial_stability),
            ("initial_difficulty", self.initial_difficulty),
            ("first_review_factor", self.first_review_factor),
            ("min_ltm_spacing_hours", self.min_ltm_spacing_hours),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return misconfigured(format!("{name} must be a finite number."));
            }
        }
        if self.r_target <= 0.0 || self.r_target >= 1.0 {
            return misconfigured("r_target must lie strictly between 0 and 1.");
        }
        if self.s_min <= 0.0 {
            return misconfigured("s_min must be positive.");
        }
        if self.k <= 0.0 {
            return misconfigured("k must be positive.");
        }
        if !(0.0..=1.0).contains(&self.k_fail) {
            return misconfigured("k_fail must lie in [0, 1].");
        }
        if self.alpha < 0.0 {
            return misconfigured("alpha must not be negative.");
        }
        if self.eta < 0.0 {
            return misconfigured("eta must not be negative.");
        }
        self.validate_gains()?;
        self.validate_shifts()?;
        if self.initial_stability < self.s_min {
            return misconfigured("initial_stability must be at least s_min.");
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.initial_difficulty) {
            return misconfigured("initial_difficulty must lie in [1, 10].");
        }
        if self.first_review_factor <= 0.0 {
            return misconfigured("first_review_factor must be positive.");
        }
        if self.min_ltm_spacing_hours < 0.0 {
            return misconfigured("min_ltm_spacing_hours must not be negative.");
        }
        if self.session_size == Some(0) {
            return misconfigured("session_size must be positive when set.");
        }
        Ok(())
    }

    fn validate_gains(&self) -> Fallible<()> {
        let GainTable { hard, medium, easy } = self.base_gain;
        if [hard, medium, easy].iter().any(|g| !g.is_finite() || *g <= 0.0) {
            return misconfigured("base_gain entries must be positive.");
        }
        if !(hard < medium && medium < easy) {
            return misconfigured("base_gain must increase from hard to medium to easy.");
        }
        Ok(())
    }

    fn validate_shifts(&self) -> Fallible<()> {
        let shift = self.difficulty_shift;
        for grade in FeedbackGrade::ALL {
            let u = shift.get(grade);
            if !u.is_finite() {
                return misconfigured(format!("difficulty_shift.{grade} must be finite."));
            }
            if grade.is_struggle() && u <= 0.0 {
                return misconfigured(format!("difficulty_shift.{grade} must be positive."));
            }
            if !grade.is_struggle() && u >= 0.0 {
                return misconfigured(format!("difficulty_shift.{grade} must be negative."));
            }
        }
        let magnitudes = FeedbackGrade::ALL.map(|g| shift.get(g).abs());
        let [again, hard, medium, easy] = magnitudes;
        if again < hard.max(medium).max(easy) {
            return misconfigured("difficulty_shift.again must have the largest magnitude.");
        }
        if medium > again.min(hard).min(easy) {
            return misconfigured("difficulty_shift.medium must have the smallest magnitude.");
        }
        Ok(())
    }
}
