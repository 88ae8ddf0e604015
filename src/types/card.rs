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

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;
use crate::types::card_hash::CardHash;

/// An independently scheduled unit of knowledge. The same content drilled
/// through two exercise types gives two cards with unrelated trajectories.
///
/// Deserialising rebuilds the hash from the identity; a serialised `hash`
/// field is ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "CardIdentity")]
pub struct Card {
    /// The content key, e.g. a lemma.
    content_key: String,
    /// The exercise type, e.g. `translation` or `cloze`.
    exercise_type: String,
    /// The cached hash of the identity.
    hash: CardHash,
}

impl Card {
    pub fn new(content_key: impl Into<String>, exercise_type: impl Into<String>) -> Fallible<Self> {
        let content_key = content_key.into().trim().to_string();
        let exercise_type = exercise_type.into().trim().to_string();
        if content_key.is_empty() {
            return invalid("card content key is empty.");
        }
        if exercise_type.is_empty() {
            return invalid(format!(
                "card '{content_key}' has an empty exercise type."
            ));
        }
        let hash = CardHash::of_identity(&content_key, &exercise_type);
        Ok(Self {
            content_key,
            exercise_type,
            hash,
        })
    }

    pub fn content_key(&self) -> &str {
        &self.content_key
    }

    pub fn exercise_type(&self) -> &str {
        &self.exercise_type
    }

    pub fn hash(&self) -> CardHash {
        self.hash
    }
}

#[derive(Deserialize)]
struct CardIdentity {
    content_key: String,
    exercise_type: String,
}

impl TryFrom<CardIdentity> for Card {
    type Error = ErrorReport;

    fn try_from(value: CardIdentity) -> Fallible<Self> {
        Card::new(value.content_key, value.exercise_type)
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Card {}

impl std::hash::Hash for Card {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.content_key
            .cmp(&other.content_key)
            .then_with(|| self.exercise_type.cmp(&other.exercise_type))
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.content_key, self.exercise_type)
    }
}
