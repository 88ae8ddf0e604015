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

use std::collections::HashMap;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::invalid;
use crate::error::not_found;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::record::CardRecord;

/// The cards of one scheduling run and their memory states. Built from
/// records supplied by the caller and handed back when the run ends; it
/// does not persist anything itself.
///
/// Insertion order is preserved, since it is the order in which new cards
/// are introduced.
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    entries: Vec<(Card, CardState)>,
    index: HashMap<Card, usize>,
}

impl CardRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CardRecord>, config: &Config) -> Fallible<Self> {
        let mut registry = Self::new();
        for record in records {
            let (card, state) = record.into_parts(config)?;
            registry.insert(card, state)?;
        }
        log::debug!("Registry built with {} cards.", registry.len());
        Ok(registry)
    }

    /// Inserts a card. If the card is already in the registry, returns an
    /// error.
    pub fn insert(&mut self, card: Card, state: CardState) -> Fallible<()> {
        if self.index.contains_key(&card) {
            return invalid(format!("duplicate card: {card}"));
        }
        state.validate()?;
        self.index.insert(card.clone(), self.entries.len());
        self.entries.push((card, state));
        Ok(())
    }

    /// Retrieves a card's state. If the card is not in the registry, returns
    /// an error.
    pub fn get(&self, card: &Card) -> Fallible<&CardState> {
        match self.index.get(card) {
            Some(&i) => Ok(&self.entries[i].1),
            None => not_found(format!("card not in registry: {card}")),
        }
    }

    /// Retrieves a card's state, treating an unknown card as new.
    pub fn get_or_new(&self, card: &Card, config: &Config) -> CardState {
        match self.index.get(card) {
            Some(&i) => self.entries[i].1.clone(),
            None => CardState::new_card(config),
        }
    }

    /// Replaces a card's state. If the card is not in the registry, returns
    /// an error and leaves the registry unchanged.
    pub fn apply(&mut self, card: &Card, state: CardState) -> Fallible<()> {
        state.validate()?;
        match self.index.get(card) {
            Some(&i) => {
                self.entries[i].1 = state;
                Ok(())
            }
            None => not_found(format!("card not in registry: {card}")),
        }
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.index.contains_key(card)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the cards in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Card, &CardState)> {
        self.entries.iter().map(|(card, state)| (card, state))
    }

    /// The current state of every card, as records.
    pub fn to_records(&self) -> Vec<CardRecord> {
        self.iter()
            .map(|(card, state)| CardRecord::from_parts(card, state))
            .collect()
    }
}
