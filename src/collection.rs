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

use std::fs::OpenOptions;
use std::fs::read_to_string;
use std::fs::write;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::registry::CardRegistry;
use crate::review::ReviewEvent;
use crate::types::record::CardRecord;

/// The host's view of a card file: where it lives, the configuration it is
/// scheduled under, and the registry built from it.
pub struct Collection {
    pub cards_path: PathBuf,
    pub config: Config,
    pub registry: CardRegistry,
}

impl Collection {
    pub fn load(cards_path: &Path, config_path: Option<&Path>) -> Fallible<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let registry = {
            log::debug!("Loading cards...");
            let start = Instant::now();
            let records = read_records(cards_path)?;
            let registry = CardRegistry::from_records(records, &config)?;
            let duration = start.elapsed().as_millis();
            log::debug!("Cards loaded in {duration}ms.");
            registry
        };
        Ok(Self {
            cards_path: cards_path.to_path_buf(),
            config,
            registry,
        })
    }

    /// Write a registry back to the card file.
    pub fn save(&self, registry: &CardRegistry) -> Fallible<()> {
        let json = serde_json::to_string_pretty(&registry.to_records())?;
        write(&self.cards_path, format!("{json}\n"))?;
        log::debug!("Saved {} cards to {:?}.", registry.len(), self.cards_path);
        Ok(())
    }

    /// The default events file: next to the card file.
    pub fn default_events_path(&self) -> PathBuf {
        self.cards_path.with_extension("events.jsonl")
    }
}

pub fn read_records(path: &Path) -> Fallible<Vec<CardRecord>> {
    if !path.exists() {
        return fail("card file does not exist.");
    }
    let content = read_to_string(path)?;
    let records: Vec<CardRecord> = serde_json::from_str(&content)?;
    Ok(records)
}

/// Append events to a JSON lines file, creating it if needed.
pub fn append_events(path: &Path, events: &[ReviewEvent]) -> Fallible<()> {
    if events.is_empty() {
        return Ok(());
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for event in events {
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
    }
    log::debug!("Appended {} events to {:?}.", events.len(), path);
    Ok(())
}
