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

use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::invalid;
use crate::ltm::apply_ltm;
use crate::model::Retrievability;
use crate::model::elapsed_days;
use crate::model::retrievability;
use crate::stm::apply_stm;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::grade::FeedbackGrade;
use crate::types::record::Feedback;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EventKind {
    Ltm,
    Stm,
}

impl EventKind {
    pub fn is_ltm(self) -> bool {
        self == EventKind::Ltm
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Ltm => write!(f, "LTM"),
            EventKind::Stm => write!(f, "STM"),
        }
    }
}

/// Decide whether a review at `now` on day `today` counts as LTM or STM.
///
/// A card without an LTM baseline always gets an LTM event. Otherwise any
/// repeat on the same day is STM, and the first review of a day is LTM
/// only if enough time has passed since the last LTM event.
pub fn classify(
    config: &Config,
    state: &CardState,
    now: Timestamp,
    today: Date,
) -> Fallible<EventKind> {
    let last_ltm = match state.last_ltm_timestamp {
        Some(ts) => ts,
        None => return Ok(EventKind::Ltm),
    };
    let elapsed = elapsed_days(last_ltm, now)?;
    if state.seen_on(today) {
        return Ok(EventKind::Stm);
    }
    if elapsed * 24.0 > config.min_ltm_spacing_hours {
        Ok(EventKind::Ltm)
    } else {
        Ok(EventKind::Stm)
    }
}

/// The record of one applied feedback submission. Events read back from a
/// log can be replayed.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub card: Card,
    pub timestamp: Timestamp,
    pub day: Date,
    pub grade: FeedbackGrade,
    pub is_ltm_event: bool,
    pub state_before: CardState,
    pub state_after: CardState,
    /// R immediately before the review. Absent for a card's first review.
    pub retrievability_before: Option<Retrievability>,
    pub latency_ms: Option<u64>,
}

impl ReviewEvent {
    pub fn kind(&self) -> EventKind {
        if self.is_ltm_event {
            EventKind::Ltm
        } else {
            EventKind::Stm
        }
    }

    /// Re-run the update on `state_before`. Returns the state it produces,
    /// which for an event produced by [`process_review`] with the same
    /// configuration is `state_after`.
    pub fn replay(&self, config: &Config) -> Fallible<CardState> {
        let feedback = Feedback {
            card: self.card.clone(),
            grade: self.grade,
            timestamp: self.timestamp,
            latency_ms: self.latency_ms,
        };
        let (state, _) = process_review(config, &self.card, &self.state_before, &feedback, self.day)?;
        Ok(state)
    }
}

/// Apply one feedback submission to a card's state. Pure: the caller decides
/// what to do with the new state and the event.
pub fn process_review(
    config: &Config,
    card: &Card,
    state_before: &CardState,
    feedback: &Feedback,
    today: Date,
) -> Fallible<(CardState, ReviewEvent)> {
    if feedback.card != *card {
        return invalid(format!(
            "feedback for {} submitted against {card}.",
            feedback.card
        ));
    }
    config.validate()?;
    state_before.validate()?;
    let now = feedback.timestamp;
    let kind = classify(config, state_before, now, today)?;
    let r = match state_before.last_ltm_timestamp {
        Some(ts) => Some(retrievability(
            state_before.stability,
            elapsed_days(ts, now)?,
        )?),
        None => None,
    };
    let state_after = match (kind, r) {
        (EventKind::Ltm, r) => apply_ltm(config, state_before, feedback.grade, r, now, today)?,
        (EventKind::Stm, Some(r)) => apply_stm(config, state_before, feedback.grade, r, today)?,
        (EventKind::Stm, None) => {
            return invalid(format!("{card} has no long-term baseline for a short-term event."));
        }
    };
    log::debug!(
        "{} {} {} S={:.2}d D={:.2} Deff={:.2}",
        card.hash().short(),
        feedback.grade.as_str(),
        kind,
        state_after.stability,
        state_after.difficulty,
        state_after.effective_difficulty
    );
    let event = ReviewEvent {
        card: card.clone(),
        timestamp: now,
        day: today,
        grade: feedback.grade,
        is_ltm_event: kind.is_ltm(),
        state_before: state_before.clone(),
        state_after: state_after.clone(),
        retrievability_before: r,
        latency_ms: feedback.latency_ms,
    };
    Ok((state_after, event))
}
