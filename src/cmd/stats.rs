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
use std::path::Path;

use clap::ValueEnum;

use crate::cmd::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::pool::PoolBuilder;
use crate::pool::PoolStats;

#[derive(ValueEnum, Clone, Copy)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(
    cards: &Path,
    config: Option<&Path>,
    clock: Clock,
    format: StatsFormat,
) -> Fallible<()> {
    let coll = Collection::load(cards, config)?;
    let stats = PoolBuilder::new(&coll.config, clock.now, clock.today)?
        .build(&coll.registry)?
        .stats();
    match format {
        StatsFormat::Text => {
            print!("{}", render_text(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{stats_json}");
        }
    }
    Ok(())
}

fn render_text(stats: &PoolStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Due:    {}\n", stats.ltm_count));
    out.push_str(&format!("Repair: {}\n", stats.stm_count));
    out.push_str(&format!(
        "New:    {} ({} deferred)\n",
        stats.new_count, stats.new_deferred_count
    ));
    out.push_str(&format!("Known:  {}\n", stats.known_count));
    out.push_str(&format!("Total:  {}\n", stats.total_count));
    out
}
