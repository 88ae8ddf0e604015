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

use std::collections::VecDeque;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::invalid;
use crate::model::elapsed_days;
use crate::model::retrievability;
use crate::pool::PoolBuilder;
use crate::pool::PoolItem;
use crate::pool::PoolStatus;
use crate::registry::CardRegistry;
use crate::review::ReviewEvent;
use crate::review::process_review;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::record::Feedback;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Idle,
    Active,
    Completed,
}

/// One study session over a registry. Feedback is applied to the registry
/// as it arrives, so stopping early keeps everything done so far.
pub struct Session {
    config: Config,
    registry: CardRegistry,
    today: Date,
    state: SessionState,
    queue: VecDeque<PoolItem>,
    events: Vec<ReviewEvent>,
    new_cards_introduced: usize,
    stopped: bool,
}

/// What a session hands back to its host.
#[derive(Debug)]
pub struct SessionSummary {
    pub registry: CardRegistry,
    /// Events in the order they were applied.
    pub events: Vec<ReviewEvent>,
    pub new_cards_introduced: usize,
    pub ltm_events: usize,
    pub stm_events: usize,
    /// Whether the session ended on a stop rather than an empty queue.
    pub stopped: bool,
}

impl Session {
    /// Fails with a configuration error if `config` is invalid.
    pub fn new(config: Config, registry: CardRegistry, today: Date) -> Fallible<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            today,
            state: SessionState::Idle,
            queue: VecDeque::new(),
            events: Vec::new(),
            new_cards_introduced: 0,
            stopped: false,
        })
    }

    /// Build the queue and begin serving cards. `new_cards_seen_today` is
    /// the number of cards already introduced today in earlier sessions.
    pub fn start(&mut self, now: Timestamp, new_cards_seen_today: usize) -> Fallible<()> {
        if self.state != SessionState::Idle {
            return invalid("session has already been started.");
        }
        let pools = PoolBuilder::new(&self.config, now, self.today)?
            .with_new_seen_today(new_cards_seen_today)
            .build(&self.registry)?;
        self.queue = pools.into_queue(self.config.session_size);
        log::debug!("Session started with {} cards.", self.queue.len());
        self.state = if self.queue.is_empty() {
            log::debug!("Session completed");
            SessionState::Completed
        } else {
            SessionState::Active
        };
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The card being presented.
    pub fn current(&self) -> Option<&PoolItem> {
        match self.state {
            SessionState::Active => self.queue.front(),
            _ => None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    pub fn events(&self) -> &[ReviewEvent] {
        &self.events
    }

    /// Apply feedback for the card being presented. On error the session is
    /// left as it was.
    pub fn submit(&mut self, feedback: Feedback) -> Fallible<ReviewEvent> {
        if self.state != SessionState::Active {
            return invalid("session is not active.");
        }
        let item = match self.queue.front() {
            Some(item) => item.clone(),
            None => return invalid("session queue is empty."),
        };
        if feedback.card != item.card {
            return invalid(format!(
                "feedback for {} does not match the presented card {}.",
                feedback.card, item.card
            ));
        }
        let state_before = self.registry.get(&item.card)?.clone();
        let (state_after, event) =
            process_review(&self.config, &item.card, &state_before, &feedback, self.today)?;
        let requeue_r = current_retrievability(&state_after, feedback.timestamp)?;
        self.registry.apply(&item.card, state_after)?;
        self.queue.pop_front();

        if item.status == PoolStatus::New {
            self.new_cards_introduced += 1;
        }

        // Cards graded `Again` or `Hard` are put at the back of the queue.
        let grade = feedback.grade;
        if self.config.requeue_struggles
            && grade.is_struggle()
            && !self.queue.iter().any(|i| i.card == item.card)
        {
            self.queue.push_back(PoolItem {
                card: item.card,
                status: PoolStatus::Stm,
                retrievability: requeue_r,
            });
        }

        self.events.push(event.clone());

        // Was this the last card?
        if self.queue.is_empty() {
            log::debug!("Session completed");
            self.state = SessionState::Completed;
        }
        Ok(event)
    }

    /// Stop before the next card is served.
    pub fn stop(&mut self) {
        if self.state != SessionState::Completed {
            log::debug!("Session stopped with {} cards left", self.queue.len());
            self.stopped = true;
            self.state = SessionState::Completed;
        }
    }

    pub fn finish(self) -> SessionSummary {
        let ltm_events = self.events.iter().filter(|e| e.is_ltm_event).count();
        let stm_events = self.events.len() - ltm_events;
        SessionSummary {
            registry: self.registry,
            events: self.events,
            new_cards_introduced: self.new_cards_introduced,
            ltm_events,
            stm_events,
            stopped: self.stopped,
        }
    }
}

fn current_retrievability(state: &CardState, now: Timestamp) -> Fallible<Option<f64>> {
    match state.last_ltm_timestamp {
        Some(ts) => Ok(Some(retrievability(state.stability, elapsed_days(ts, now)?)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::card::Card;
    use crate::types::grade::FeedbackGrade;

    fn now() -> Timestamp {
        Timestamp::parse("2026-03-15T09:00:00Z").unwrap()
    }

    fn today() -> Date {
        Date::parse("2026-03-15").unwrap()
    }

    fn card(key: &str) -> Card {
        Card::new(key, "translation").unwrap()
    }

    fn due_card_state() -> CardState {
        CardState {
            stability: 10.0,
            difficulty: 5.0,
            effective_difficulty: 5.0,
            last_ltm_timestamp: Some(now().plus_days(-14.0)),
            last_review_day: Some(Date::parse("2026-03-01").unwrap()),
            review_count: 4,
            ..CardState::new_card(&Config::default())
        }
    }

    fn registry(config: &Config) -> Fallible<CardRegistry> {
        let mut registry = CardRegistry::new();
        registry.insert(card("neu"), CardState::new_card(config))?;
        registry.insert(card("alt"), due_card_state())?;
        Ok(registry)
    }

    /// Answer the presented card with `grade`, `minutes` after `now()`.
    fn answer(session: &mut Session, grade: FeedbackGrade, minutes: f64) -> Fallible<ReviewEvent> {
        let card = match session.current() {
            Some(item) => item.card.clone(),
            None => return invalid("nothing presented"),
        };
        let ts = now().plus_days(minutes / 1440.0);
        session.submit(Feedback::new(card, grade, ts))
    }

    #[test]
    fn test_end_to_end_session() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current().is_none());
        session.start(now(), 0)?;
        assert_eq!(session.state(), SessionState::Active);

        // The due card comes before the new one.
        let first = session.current().map(|i| (i.card.clone(), i.status));
        assert_eq!(first, Some((card("alt"), PoolStatus::Ltm)));
        let event = answer(&mut session, FeedbackGrade::Medium, 0.0)?;
        assert!(event.is_ltm_event);
        assert!((event.state_after.stability - 15.65).abs() < 0.01);

        let event = answer(&mut session, FeedbackGrade::Easy, 1.0)?;
        assert_eq!(event.card, card("neu"));
        assert_eq!(session.state(), SessionState::Completed);

        let summary = session.finish();
        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.ltm_events, 2);
        assert_eq!(summary.stm_events, 0);
        assert_eq!(summary.new_cards_introduced, 1);
        assert!(!summary.stopped);
        // The last submission returns the same event the summary records.
        assert_eq!(summary.events.last(), Some(&event));
        let state = summary.registry.get(&card("alt"))?;
        assert!((state.stability - 15.65).abs() < 0.01);
        assert!(!summary.registry.get(&card("neu"))?.is_new());
        Ok(())
    }

    #[test]
    fn test_struggles_are_requeued_as_stm() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 0)?;
        let event = answer(&mut session, FeedbackGrade::Again, 0.0)?;
        assert!(event.is_ltm_event);
        assert!((event.state_after.stability - 8.52).abs() < 0.01);
        assert_eq!(session.remaining(), 2);

        answer(&mut session, FeedbackGrade::Hard, 1.0)?;
        assert_eq!(session.remaining(), 2);

        let item = session.current().map(|i| (i.card.clone(), i.status));
        assert_eq!(item, Some((card("alt"), PoolStatus::Stm)));
        let event = answer(&mut session, FeedbackGrade::Medium, 2.0)?;
        assert!(!event.is_ltm_event);
        assert_eq!(event.state_after.stability, event.state_before.stability);
        assert_eq!(event.state_after.stm_success_count_today, 1);

        let event = answer(&mut session, FeedbackGrade::Easy, 3.0)?;
        assert_eq!(event.card, card("neu"));
        assert!(!event.is_ltm_event);
        assert_eq!(session.state(), SessionState::Completed);

        let summary = session.finish();
        assert_eq!(summary.ltm_events, 2);
        assert_eq!(summary.stm_events, 2);
        assert_eq!(summary.new_cards_introduced, 1);
        Ok(())
    }

    #[test]
    fn test_requeue_can_be_disabled() -> Fallible<()> {
        let config = Config {
            requeue_struggles: false,
            ..Config::default()
        };
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 0)?;
        answer(&mut session, FeedbackGrade::Again, 0.0)?;
        assert_eq!(session.remaining(), 1);
        Ok(())
    }

    #[test]
    fn test_mismatched_feedback_leaves_session_unchanged() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 0)?;
        let err = session
            .submit(Feedback::new(card("neu"), FeedbackGrade::Easy, now()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(session.remaining(), 2);
        assert!(session.events().is_empty());
        assert_eq!(session.registry().get(&card("alt"))?, &due_card_state());
        Ok(())
    }

    #[test]
    fn test_stop_keeps_applied_updates() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 0)?;
        answer(&mut session, FeedbackGrade::Easy, 0.0)?;
        session.stop();
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.current().is_none());
        assert!(
            session
                .submit(Feedback::new(card("neu"), FeedbackGrade::Easy, now()))
                .is_err()
        );
        let summary = session.finish();
        assert!(summary.stopped);
        assert_eq!(summary.events.len(), 1);
        assert!(summary.registry.get(&card("alt"))?.stability > 10.0);
        assert!(summary.registry.get(&card("neu"))?.is_new());
        Ok(())
    }

    #[test]
    fn test_lifecycle_errors() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        assert!(
            session
                .submit(Feedback::new(card("alt"), FeedbackGrade::Easy, now()))
                .is_err()
        );
        session.start(now(), 0)?;
        assert!(session.start(now(), 0).is_err());
        Ok(())
    }

    #[test]
    fn test_session_size_and_new_card_cap() -> Fallible<()> {
        let config = Config {
            session_size: Some(1),
            ..Config::default()
        };
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 0)?;
        assert_eq!(session.remaining(), 1);

        let config = Config {
            new_cards_per_day: 5,
            ..Config::default()
        };
        let mut session = Session::new(config.clone(), registry(&config)?, today())?;
        session.start(now(), 5)?;
        assert_eq!(session.remaining(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Fallible<()> {
        let config = Config {
            r_target: 1.5,
            eta: -1.0,
            k_fail: 5.0,
            ..Config::default()
        };
        let result = Session::new(config.clone(), registry(&Config::default())?, today());
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Configuration));
        Ok(())
    }

    #[test]
    fn test_nothing_to_study_completes_at_once() -> Fallible<()> {
        let config = Config::default();
        let mut session = Session::new(config, CardRegistry::new(), today())?;
        session.start(now(), 0)?;
        assert_eq!(session.state(), SessionState::Completed);
        let summary = session.finish();
        assert!(summary.events.is_empty());
        assert!(!summary.stopped);
        Ok(())
    }
}
