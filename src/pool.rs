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

//! Partitioning of the registry into the pools a session draws from.
//!
//! The queue serves due cards before same-day repair, and repair before new
//! material.

use std::collections::VecDeque;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::config::Config;
use crate::error::Fallible;
use crate::model::Retrievability;
use crate::model::elapsed_days;
use crate::model::retrievability;
use crate::registry::CardRegistry;
use crate::types::card::Card;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Ltm,
    Stm,
    New,
}

impl Display for PoolStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolStatus::Ltm => write!(f, "ltm"),
            PoolStatus::Stm => write!(f, "stm"),
            PoolStatus::New => write!(f, "new"),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PoolItem {
    pub card: Card,
    pub status: PoolStatus,
    /// R when the pools were built. Absent for new cards.
    pub retrievability: Option<Retrievability>,
}

#[derive(Clone, Default, Debug)]
pub struct Pools {
    /// Due cards, most at risk first.
    pub ltm: Vec<PoolItem>,
    /// Cards that struggled earlier today and are not due.
    pub stm: Vec<PoolItem>,
    /// Never-reviewed cards, in registry order, up to the daily cap.
    pub new: Vec<PoolItem>,
    /// Never-reviewed cards left out by the cap.
    new_deferred: usize,
    /// Reviewed cards that are neither due nor struggling.
    known: usize,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct PoolStats {
    pub ltm_count: usize,
    pub stm_count: usize,
    pub new_count: usize,
    pub new_deferred_count: usize,
    pub known_count: usize,
    pub total_count: usize,
}

impl Pools {
    pub fn stats(&self) -> PoolStats {
        let ltm_count = self.ltm.len();
        let stm_count = self.stm.len();
        let new_count = self.new.len();
        PoolStats {
            ltm_count,
            stm_count,
            new_count,
            new_deferred_count: self.new_deferred,
            known_count: self.known,
            total_count: ltm_count + stm_count + new_count + self.new_deferred + self.known,
        }
    }

    /// The study queue: the whole LTM pool, then STM, then New, cut to
    /// `session_size` if one is given.
    pub fn into_queue(self, session_size: Option<usize>) -> VecDeque<PoolItem> {
        let mut queue: VecDeque<PoolItem> = self
            .ltm
            .into_iter()
            .chain(self.stm)
            .chain(self.new)
            .collect();
        if let Some(size) = session_size {
            queue.truncate(size);
        }
        queue
    }
}

pub struct PoolBuilder<'a> {
    config: &'a Config,
    now: Timestamp,
    today: Date,
    new_seen_today: usize,
}

impl<'a> PoolBuilder<'a> {
    /// Fails with a configuration error if `config` is invalid.
    pub fn new(config: &'a Config, now: Timestamp, today: Date) -> Fallible<Self> {
        config.validate()?;
        Ok(Self {
            config,
            now,
            today,
            new_seen_today: 0,
        })
    }

    /// Number of new cards already introduced today, which counts against
    /// the daily cap.
    pub fn with_new_seen_today(self, new_seen_today: usize) -> Self {
        Self {
            new_seen_today,
            ..self
        }
    }

    pub fn build(&self, registry: &CardRegistry) -> Fallible<Pools> {
        let mut ltm: Vec<(PoolItem, Timestamp)> = Vec::new();
        let mut stm: Vec<PoolItem> = Vec::new();
        let mut new: Vec<PoolItem> = Vec::new();
        let mut known = 0;
        let new_capacity = self
            .config
            .new_cards_per_day
            .saturating_sub(self.new_seen_today);
        let mut new_deferred = 0;

        for (card, state) in registry.iter() {
            let state = state.on_day(self.today);
            let last_ltm = match state.last_ltm_timestamp {
                Some(ts) => ts,
                None => {
                    if new.len() < new_capacity {
                        new.push(PoolItem {
                            card: card.clone(),
                            status: PoolStatus::New,
                            retrievability: None,
                        });
                    } else {
                        new_deferred += 1;
                    }
                    continue;
                }
            };
            let r = retrievability(state.stability, elapsed_days(last_ltm, self.now)?)?;
            if r <= self.config.r_target {
                let item = PoolItem {
                    card: card.clone(),
                    status: PoolStatus::Ltm,
                    retrievability: Some(r),
                };
                ltm.push((item, last_ltm));
            } else if state.struggles_today > 0 {
                stm.push(PoolItem {
                    card: card.clone(),
                    status: PoolStatus::Stm,
                    retrievability: Some(r),
                });
            } else {
                known += 1;
            }
        }

        ltm.sort_by(|(a, a_ts), (b, b_ts)| {
            by_retrievability(a, b)
                .then_with(|| a_ts.cmp(b_ts))
                .then_with(|| a.card.cmp(&b.card))
        });
        stm.sort_by(|a, b| by_retrievability(a, b).then_with(|| a.card.cmp(&b.card)));

        let pools = Pools {
            ltm: ltm.into_iter().map(|(item, _)| item).collect(),
            stm,
            new,
            new_deferred,
            known,
        };
        let stats = pools.stats();
        log::debug!(
            "Pools for {}: ltm={} stm={} new={} (deferred {}) known={}",
            self.today,
            stats.ltm_count,
            stats.stm_count,
            stats.new_count,
            stats.new_deferred_count,
            stats.known_count
        );
        Ok(pools)
    }
}

fn by_retrievability(a: &PoolItem, b: &PoolItem) -> std::cmp::Ordering {
    let a = a.retrievability.unwrap_or(1.0);
    let b = b.retrievability.unwrap_or(1.0);
    a.total_cmp(&b)
}
