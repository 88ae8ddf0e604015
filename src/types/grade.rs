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
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;

/// The learner's verdict on one recall attempt, ordered by recall quality.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackGrade {
    Again,
    Hard,
    Medium,
    Easy,
}

impl FeedbackGrade {
    pub const ALL: [FeedbackGrade; 4] = [
        FeedbackGrade::Again,
        FeedbackGrade::Hard,
        FeedbackGrade::Medium,
        FeedbackGrade::Easy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackGrade::Again => "again",
            FeedbackGrade::Hard => "hard",
            FeedbackGrade::Medium => "medium",
            FeedbackGrade::Easy => "easy",
        }
    }

    /// Grades on the 1-4 scale hosts usually show on buttons.
    pub fn from_number(n: u8) -> Fallible<Self> {
        match n {
            1 => Ok(FeedbackGrade::Again),
            2 => Ok(FeedbackGrade::Hard),
            3 => Ok(FeedbackGrade::Medium),
            4 => Ok(FeedbackGrade::Easy),
            _ => invalid(format!("unknown grade: {n}")),
        }
    }

    pub fn is_success(self) -> bool {
        self != FeedbackGrade::Again
    }

    /// Again and Hard mark a card for same-day repair practice.
    pub fn is_struggle(self) -> bool {
        matches!(self, FeedbackGrade::Again | FeedbackGrade::Hard)
    }
}

impl Display for FeedbackGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackGrade {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return FeedbackGrade::from_number(n);
        }
        match s.to_ascii_lowercase().as_str() {
            "again" => Ok(FeedbackGrade::Again),
            "hard" => Ok(FeedbackGrade::Hard),
            "medium" => Ok(FeedbackGrade::Medium),
            "easy" => Ok(FeedbackGrade::Easy),
            _ => invalid(format!("unknown grade: {s}")),
        }
    }
}

/// Stability gain multiplier for each successful grade. Again has no entry:
/// failures go through a separate rule.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GainTable {
    pub hard: f64,
    pub medium: f64,
    pub easy: f64,
}

impl GainTable {
    pub fn get(&self, grade: FeedbackGrade) -> Option<f64> {
        match grade {
            FeedbackGrade::Again => None,
            FeedbackGrade::Hard => Some(self.hard),
            FeedbackGrade::Medium => Some(self.medium),
            FeedbackGrade::Easy => Some(self.easy),
        }
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self {
            hard: 0.5,
            medium: 1.0,
            easy: 1.8,
        }
    }
}

/// Signed direction of the difficulty change for each grade.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShiftTable {
    pub again: f64,
    pub hard: f64,
    pub medium: f64,
    pub easy: f64,
}

impl ShiftTable {
    pub fn get(&self, grade: FeedbackGrade) -> f64 {
        match grade {
            FeedbackGrade::Again => self.again,
            FeedbackGrade::Hard => self.hard,
            FeedbackGrade::Medium => self.medium,
            FeedbackGrade::Easy => self.easy,
        }
    }
}

impl Default for ShiftTable {
    fn default() -> Self {
        Self {
            again: 1.0,
            hard: 0.35,
            medium: -0.2,
            easy: -0.6,
        }
    }
}
